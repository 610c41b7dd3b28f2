//! clap value parsers for amounts, rates and dates.
//!
//! Flags accept plain decimals (`1000.50`, `15.5`) as well as the pt-BR text
//! the simulator screens use (`1.000,50`, `15,5%`). A comma marks the pt-BR
//! form; without one the value is read as a plain decimal.

use chrono::NaiveDate;
use loan_sim_core::locale;
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn parse_money_arg(text: &str) -> Result<Decimal, String> {
    if text.contains(',') || text.trim_start().starts_with("R$") {
        return locale::parse_money(text).map_err(|e| e.to_string());
    }
    Decimal::from_str(text.trim()).map_err(|e| format!("'{text}': {e}"))
}

pub fn parse_percent_arg(text: &str) -> Result<Decimal, String> {
    let body = text.trim().trim_end_matches('%').trim();
    if body.contains(',') {
        return locale::parse_percent(body).map_err(|e| e.to_string());
    }
    Decimal::from_str(body).map_err(|e| format!("'{text}': {e}"))
}

/// `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_date_arg(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .map_err(|_| format!("'{text}': expected YYYY-MM-DD or DD/MM/YYYY"))
}
