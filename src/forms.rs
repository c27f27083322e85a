//! Client-side form validation.
//!
//! Each form validates into the request payload it submits, or into a map
//! of per-field messages. Server-side validation failures (the envelope's
//! `errors.details`) are merged into the same map so a field shows the
//! server's exact wording next to it, independent of the client-side
//! check.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::models::{LoginRequest, NewPost, NewStock, NewWarehouse, RegisterRequest, UpdateStock};

/// Per-field validation messages, keyed by wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: &str, message: &str) {
        self.fields.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fold in the server's own per-field messages. The server wording
    /// wins over the client-side message for the same field.
    pub fn merge_server(&mut self, details: &BTreeMap<String, String>) {
        for (field, message) in details {
            self.fields.insert(field.clone(), message.clone());
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, message) in &self.fields {
            writeln!(f, "  {}: {}", field, message)?;
        }
        Ok(())
    }
}

/// Minimal email shape check: one `@`, a non-empty local part, a dotted
/// domain, no whitespace.
fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn parse_date(field: &str, value: &str, errors: &mut FieldErrors) -> Option<i64> {
    if value.trim().is_empty() {
        errors.insert(field, &format!("{} is required", field.replace('_', " ")));
        return None;
    }
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            Some(midnight.and_utc().timestamp_millis())
        }
        Err(_) => {
            errors.insert(
                field,
                &format!("{} must be a date (YYYY-MM-DD)", field.replace('_', " ")),
            );
            None
        }
    }
}

fn parse_amount(field: &str, value: &str, required_message: &str, errors: &mut FieldErrors) -> Option<i64> {
    if value.trim().is_empty() {
        errors.insert(field, required_message);
        return None;
    }
    match value.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.insert(field, &format!("{} must be a whole number", field.replace('_', " ")));
            None
        }
    }
}

// ===== Sign in =====

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        if !is_valid_email(self.email.trim()) {
            errors.insert("email", "Please input valid email format");
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(LoginRequest {
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
        })
    }
}

// ===== Sign up =====

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        if !is_valid_email(self.email.trim()) {
            errors.insert("email", "Your email format is invalid");
        }
        if self.password.chars().count() < 8 {
            errors.insert("password", "Password should have minimun 8 characters ");
        }
        if self.password_confirmation.is_empty() {
            errors.insert("passwordConfirmation", "Password confirmation is required");
        } else if self.password != self.password_confirmation {
            errors.insert("passwordConfirmation", "Your password is not match");
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(RegisterRequest {
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
        })
    }
}

// ===== Stock create/update =====

#[derive(Debug, Clone, Default)]
pub struct StockForm {
    pub name: String,
    pub supplier: String,
    pub quantity: String,
    pub cost_price: String,
    pub purchase_date: String,
    pub stock_due_date: String,
}

impl StockForm {
    fn validate_fields(&self) -> Result<(i64, i64, i64, i64), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.name.trim().is_empty() {
            errors.insert("name", "name is required");
        }
        if self.supplier.trim().is_empty() {
            errors.insert("supplier", "supplier is required");
        }
        let quantity = parse_amount("quantity", &self.quantity, "total stock is required", &mut errors);
        let cost_price = parse_amount("cost_price", &self.cost_price, "cost price is required", &mut errors);
        let purchase_date = parse_date("purchase_date", &self.purchase_date, &mut errors);
        let stock_due_date = parse_date("stock_due_date", &self.stock_due_date, &mut errors);

        match (quantity, cost_price, purchase_date, stock_due_date) {
            (Some(q), Some(c), Some(p), Some(d)) if errors.is_empty() => Ok((q, c, p, d)),
            _ => Err(errors),
        }
    }

    pub fn validate_new(&self, warehouse_id: i64) -> Result<NewStock, FieldErrors> {
        let (quantity, cost_price, purchase_date, stock_due_date) = self.validate_fields()?;
        Ok(NewStock {
            name: self.name.trim().to_string(),
            supplier: self.supplier.trim().to_string(),
            quantity,
            cost_price,
            purchase_date,
            stock_due_date,
            warehouse_id,
            created_at: chrono::Utc::now(),
        })
    }

    pub fn validate_update(&self, warehouse_id: i64) -> Result<UpdateStock, FieldErrors> {
        let (quantity, cost_price, purchase_date, stock_due_date) = self.validate_fields()?;
        Ok(UpdateStock {
            name: self.name.trim().to_string(),
            supplier: self.supplier.trim().to_string(),
            quantity,
            cost_price,
            purchase_date,
            stock_due_date,
            warehouse_id,
        })
    }
}

// ===== Warehouse =====

#[derive(Debug, Clone, Default)]
pub struct WarehouseForm {
    pub name: String,
    pub address: String,
}

impl WarehouseForm {
    pub fn validate(&self) -> Result<NewWarehouse, FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.name.trim().is_empty() {
            errors.insert("name", "Warehouse name is required");
        }
        if self.address.trim().is_empty() {
            errors.insert("address", "Warehouse address is required");
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewWarehouse {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
        })
    }
}

// ===== Post =====

#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub content: String,
}

impl PostForm {
    pub fn validate(&self, hobby_id: i64) -> Result<NewPost, FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.content.trim().is_empty() {
            errors.insert("content", "content is required");
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewPost {
            content: self.content.trim().to_string(),
            hobby_id,
        })
    }
}
