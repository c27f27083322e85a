//! Display formatting for currency and dates.
//!
//! The service reports prices in Indonesian rupiah and dates as Unix epoch
//! milliseconds; these helpers render both the way the service's own
//! reports do (`id` locale).

use chrono::{DateTime, Datelike, Utc};

const WEEKDAYS: [&str; 7] = [
    "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu",
];

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Format a rupiah amount: `15000` becomes `Rp 15.000,00`.
pub fn format_currency(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    // Group digits in threes from the right, separated by periods
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("-Rp {},00", grouped)
    } else {
        format!("Rp {},00", grouped)
    }
}

/// Format an epoch-milliseconds timestamp as a full Indonesian date,
/// e.g. `Senin, 1 Januari 2024`.
pub fn format_date(epoch_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms) {
        Some(dt) => {
            let weekday = WEEKDAYS[dt.weekday().num_days_from_monday() as usize];
            let month = MONTHS[dt.month0() as usize];
            format!("{}, {} {} {}", weekday, dt.day(), month, dt.year())
        }
        None => epoch_ms.to_string(),
    }
}
