//! Utility functions shared across the application.

pub mod format;

pub use format::{format_currency, format_date};
