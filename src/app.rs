//! Application state management for stockdesk.
//!
//! The `App` struct is the explicit context object shared by every command
//! handler: configuration, the session store, the API client and the
//! router. Session mutation happens only through the sign-in, sign-up,
//! refresh and sign-out entry points; everything else reads.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{CredentialStore, SessionStore};
use crate::config::Config;
use crate::models::{
    Hobby, HobbyDetail, LoginRequest, RegisterRequest, Warehouse, WarehouseStocksPayload,
};
use crate::reports;
use crate::routes::{Navigation, Route, Router};

pub struct App {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub router: Router,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let base_url = std::env::var("STOCKDESK_API_URL")
            .unwrap_or_else(|_| config.api_base_url.clone());
        debug!(base_url = %base_url, "API base URL configured");

        let session = Arc::new(SessionStore::new());
        let api = ApiClient::new(&base_url, Arc::clone(&session))
            .context("Failed to create API client")?;

        Ok(Self {
            config,
            session,
            api,
            router: Router::new(),
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_signed_in()
    }

    /// Sign in with validated credentials. On success the session is
    /// populated, the account is remembered, and the router resolves the
    /// post-sign-in destination.
    pub async fn sign_in(&mut self, request: &LoginRequest) -> Result<Route, ApiError> {
        let user = self.api.login(request).await?;

        if let Err(e) = CredentialStore::store(&request.email, &request.password) {
            warn!(error = %e, "Failed to store credentials");
        }

        self.config.last_email = Some(request.email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!(username = %user.username, "Sign-in successful");
        Ok(self.router.complete_sign_in())
    }

    /// Register a new account; the server signs the account in as part of
    /// registration. Lands on the home view, as the original flow did.
    pub async fn sign_up(&mut self, request: &RegisterRequest) -> Result<Route, ApiError> {
        let user = self.api.register(request).await?;

        self.config.last_email = Some(request.email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!(username = %user.username, "Registration successful");
        self.router.navigate(Route::Home, &self.session.get());
        Ok(Route::Home)
    }

    /// Try to sign in without prompting: environment credentials first,
    /// then the keychain entry for the last account. Returns true when a
    /// session was established.
    pub async fn try_auto_sign_in(&mut self) -> bool {
        let email = std::env::var("STOCKDESK_EMAIL")
            .ok()
            .or_else(|| self.config.last_email.clone());
        let Some(email) = email else {
            return false;
        };

        let password = match std::env::var("STOCKDESK_PASSWORD") {
            Ok(p) => p,
            Err(_) => match CredentialStore::get_password(&email) {
                Ok(p) => p,
                Err(e) => {
                    debug!(error = %e, "No stored credentials for auto sign-in");
                    return false;
                }
            },
        };

        let request = LoginRequest {
            email: email.to_lowercase(),
            password,
        };
        match self.sign_in(&request).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Auto sign-in failed");
                false
            }
        }
    }

    /// Clear the local identity. The service exposes no logout endpoint;
    /// the cookie goes stale on its own and the guard blocks from here on.
    pub fn sign_out(&mut self) {
        self.session.clear();
        self.router.navigate(Route::Home, &self.session.get());
        info!("Signed out");
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, to: Route) -> Navigation {
        let session = self.session.get();
        let navigation = self.router.navigate(to, &session);
        if let Navigation::RedirectToSignIn { ref from } = navigation {
            debug!(from = %from.path(), "Guard refused navigation");
        }
        navigation
    }

    // =========================================================================
    // Confirmed mutations
    // =========================================================================

    /// Delete a stock and refetch the warehouse list only after the server
    /// confirms. No optimistic removal.
    pub async fn delete_stock_confirmed(
        &self,
        stock_id: i64,
        warehouse_id: i64,
    ) -> Result<WarehouseStocksPayload, ApiError> {
        self.api.delete_stock(stock_id).await?;
        self.api.warehouse_stocks(warehouse_id).await
    }

    /// Delete a post and refetch its hobby after confirmation.
    pub async fn delete_post_confirmed(
        &self,
        post_id: i64,
        hobby_id: i64,
    ) -> Result<HobbyDetail, ApiError> {
        self.api.delete_post(post_id).await?;
        self.api.hobby(hobby_id).await
    }

    // =========================================================================
    // Aggregate views and reports
    // =========================================================================

    /// Fetch the warehouse and hobby lists in parallel for the overview.
    pub async fn overview(&self) -> Result<(Vec<Warehouse>, Vec<Hobby>), ApiError> {
        let (warehouses, hobbies) = tokio::join!(self.api.warehouses(), self.api.hobbies());
        Ok((warehouses?, hobbies?))
    }

    /// Build and save the single-warehouse stock report; returns the path.
    pub async fn save_stock_report(&self, warehouse_id: i64) -> Result<PathBuf> {
        let payload = self.api.warehouse_stocks(warehouse_id).await?;
        let generated_at = chrono::Utc::now().timestamp_millis();
        let report = reports::stock_report(&payload.warehouse, &payload.stocks, generated_at);

        let path = PathBuf::from(reports::report_file_name(generated_at));
        std::fs::write(&path, report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Stock report saved");
        Ok(path)
    }

    /// Build and save the cross-warehouse report; returns the path.
    pub async fn save_warehouses_report(&self) -> Result<PathBuf> {
        let payload = self.api.all_stocks().await?;
        let generated_at = chrono::Utc::now().timestamp_millis();
        let report = reports::warehouses_report(&payload.warehouses, generated_at);

        let path = PathBuf::from("warehouses.txt");
        std::fs::write(&path, report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Cross-warehouse report saved");
        Ok(path)
    }
}

/// Map an API error onto the message shown to the user.
pub fn user_message(error: &ApiError) -> String {
    match error {
        ApiError::SessionExpired => "Session expired. Please sign in again.".to_string(),
        ApiError::Network(e) if e.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        ApiError::Network(_) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        ApiError::Status { status: 401, .. } => "Invalid email or password".to_string(),
        ApiError::Status { message, .. } => message.clone(),
        ApiError::Validation { .. } => "Please correct the fields below".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;

    fn signed_in_session() -> Session {
        Session {
            user_id: 7,
            user_profile_id: 12,
            username: "andi".to_string(),
            email: "andi@example.com".to_string(),
        }
    }

    fn test_app() -> App {
        let session = Arc::new(SessionStore::new());
        let api = ApiClient::new("http://localhost:8080/api/v1", Arc::clone(&session))
            .expect("build client");
        App {
            config: Config::default(),
            session,
            api,
            router: Router::new(),
        }
    }

    #[test]
    fn test_guarded_navigation_then_sign_out() {
        let mut app = test_app();
        assert!(!app.is_authenticated());

        // Guard refuses and remembers the destination
        let nav = app.navigate(Route::Warehouses);
        assert_eq!(
            nav,
            Navigation::RedirectToSignIn {
                from: Route::Warehouses
            }
        );

        // Simulate the session a successful login would set
        app.session.set(signed_in_session());
        assert_eq!(app.router.complete_sign_in(), Route::Warehouses);

        app.sign_out();
        assert!(!app.is_authenticated());
        assert_eq!(app.router.current(), Route::Home);
    }

    #[test]
    fn test_user_message_mapping() {
        assert_eq!(
            user_message(&ApiError::SessionExpired),
            "Session expired. Please sign in again."
        );
        assert_eq!(
            user_message(&ApiError::Status {
                status: 401,
                message: "unauthorized".to_string()
            }),
            "Invalid email or password"
        );
        assert_eq!(
            user_message(&ApiError::Status {
                status: 404,
                message: "warehouse not found".to_string()
            }),
            "warehouse not found"
        );
        assert_eq!(
            user_message(&ApiError::Validation {
                details: Default::default()
            }),
            "Please correct the fields below"
        );
    }
}
