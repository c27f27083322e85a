use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{format_currency, format_date};

/// A stock record as served by the API. Dates are epoch milliseconds;
/// `amount` is the server-computed quantity times cost price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
    pub amount: i64,
}

impl Stock {
    pub fn display_purchase_date(&self) -> String {
        format_date(self.purchase_date)
    }

    pub fn display_due_date(&self) -> String {
        format_date(self.stock_due_date)
    }

    pub fn display_cost_price(&self) -> String {
        format_currency(self.cost_price)
    }

    pub fn display_amount(&self) -> String {
        format_currency(self.amount)
    }
}

/// Body of `POST /stocks`.
#[derive(Debug, Clone, Serialize)]
pub struct NewStock {
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
    pub warehouse_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Body of `PUT /stocks/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateStock {
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
    pub warehouse_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stock() {
        let json = r#"{"id":3,"name":"Rice 5kg","supplier":"CV Tani","quantity":40,
            "cost_price":65000,"purchase_date":1704067200000,"stock_due_date":1711929600000,"amount":2600000}"#;
        let stock: Stock = serde_json::from_str(json).expect("parse stock");
        assert_eq!(stock.quantity, 40);
        assert_eq!(stock.amount, 2600000);
        assert_eq!(stock.display_cost_price(), "Rp 65.000,00");
        assert_eq!(stock.display_purchase_date(), "Senin, 1 Januari 2024");
    }
}
