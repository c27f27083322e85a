//! Stock reports with per-warehouse spending totals.
//!
//! The service's reports are tables of stocks with a total-spent figure
//! per warehouse. Rendering here is plain text; the table columns and the
//! headline lines match the service's own exports.

use crate::models::{Stock, Warehouse, WarehouseWithStocks};
use crate::utils::{format_currency, format_date};

const COLUMNS: [&str; 8] = [
    "ID",
    "Name",
    "Supplier",
    "Purchase Date",
    "Stock Due Date",
    "Quantity",
    "Cost Price",
    "Amount",
];

/// Total spent across a set of stocks: the sum of their amounts.
pub fn total_spent(stocks: &[Stock]) -> i64 {
    stocks.iter().map(|s| s.amount).sum()
}

fn stock_row(stock: &Stock) -> [String; 8] {
    [
        stock.id.to_string(),
        stock.name.clone(),
        stock.supplier.clone(),
        stock.display_purchase_date(),
        stock.display_due_date(),
        stock.quantity.to_string(),
        stock.display_cost_price(),
        format_currency(stock.quantity * stock.cost_price),
    ]
}

/// Render the stock table with header, fitted column widths and a total
/// row at the bottom.
fn render_table(stocks: &[Stock]) -> String {
    let rows: Vec<[String; 8]> = stocks.iter().map(stock_row).collect();

    let mut widths: [usize; 8] = [0; 8];
    for (i, column) in COLUMNS.iter().enumerate() {
        widths[i] = column.len();
    }
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let render_line = |cells: &[String; 8]| -> String {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(&format!("{:<width$}", cell, width = widths[i]));
        }
        line.trim_end().to_string()
    };

    let header: [String; 8] = COLUMNS.map(String::from);
    let mut out = String::new();
    out.push_str(&render_line(&header));
    out.push('\n');
    for row in &rows {
        out.push_str(&render_line(row));
        out.push('\n');
    }
    out.push_str(&format!("Total  {}\n", format_currency(total_spent(stocks))));
    out
}

/// Report for a single warehouse's stocks.
pub fn stock_report(warehouse: &Warehouse, stocks: &[Stock], generated_at_ms: i64) -> String {
    let mut out = String::new();
    out.push_str(&format!("Stocks Report at {} Warehouse\n", warehouse.name));
    out.push_str(&format!("Generated at {}\n", format_date(generated_at_ms)));
    out.push_str(&format!(
        "Total spent in this warehouse {}\n\n",
        format_currency(total_spent(stocks))
    ));
    out.push_str(&render_table(stocks));
    out
}

/// Report across all warehouses, one section and total per warehouse.
pub fn warehouses_report(warehouses: &[WarehouseWithStocks], generated_at_ms: i64) -> String {
    let mut out = String::new();
    out.push_str(&format!("Generated at {}\n\n", format_date(generated_at_ms)));
    for warehouse in warehouses {
        out.push_str(&format!("Warehouse: {}\n", warehouse.name));
        out.push_str(&format!(
            "Total spent in {} is {}\n",
            warehouse.name,
            format_currency(total_spent(&warehouse.stocks))
        ));
        out.push_str(&render_table(&warehouse.stocks));
        out.push('\n');
    }
    out
}

/// File name for a saved report, stamped with the generation date.
pub fn report_file_name(generated_at_ms: i64) -> String {
    format!("report-{}.txt", format_date(generated_at_ms))
}
