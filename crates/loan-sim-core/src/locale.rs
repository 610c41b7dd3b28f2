//! Brazilian-Portuguese number conventions used by the simulator's screens.
//!
//! Thousands are grouped with `.` and decimals follow `,`: `R$ 1.234,56`,
//! `15,50%`. Presentation layers call these to turn typed text into engine
//! inputs and engine outputs back into text.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::LoanSimError;
use crate::types::{round_cents, Money, Percent};
use crate::LoanSimResult;

const CURRENCY_PREFIX: &str = "R$";

/// Parse a money amount such as `"1.234,56"` or `"R$ 1.234,56"`.
pub fn parse_money(text: &str) -> LoanSimResult<Money> {
    let body = text.trim().trim_start_matches(CURRENCY_PREFIX).trim();
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(parse_error(text, "expected digits with '.' grouping and ',' decimals"));
    }
    if body.matches(',').count() > 1 {
        return Err(parse_error(text, "more than one decimal comma"));
    }

    let normalized = body.replace('.', "").replace(',', ".");
    let value = Decimal::from_str(&normalized).map_err(|e| parse_error(text, &e.to_string()))?;
    Ok(if negative { -value } else { value })
}

/// Parse a percentage such as `"15,5"`, `"15,50 %"` or `"15"`.
pub fn parse_percent(text: &str) -> LoanSimResult<Percent> {
    let body = text.trim().trim_end_matches('%').trim();
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == ',') {
        return Err(parse_error(text, "expected digits with an optional ',' decimal"));
    }
    if body.matches(',').count() > 1 {
        return Err(parse_error(text, "more than one decimal comma"));
    }
    Decimal::from_str(&body.replace(',', ".")).map_err(|e| parse_error(text, &e.to_string()))
}

/// `R$ 1.234,56`, rounded to cents.
pub fn format_money(amount: Money) -> String {
    let rounded = round_cents(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{CURRENCY_PREFIX} {}", group_decimal(rounded.abs()))
}

/// `15,00%`, two decimal places.
pub fn format_percent(pct: Percent) -> String {
    format!("{}%", group_decimal(pct.round_dp(2)))
}

fn group_decimal(value: Decimal) -> String {
    let fixed = format!("{:.2}", value);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }
    format!("{grouped},{frac_part}")
}

fn parse_error(input: &str, reason: &str) -> LoanSimError {
    LoanSimError::Parse {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_money("R$ 1.234.567,8").unwrap(), dec!(1234567.8));
        assert_eq!(parse_money("1000").unwrap(), dec!(1000));
        assert_eq!(parse_money("0,05").unwrap(), dec!(0.05));
        assert_eq!(parse_money("-1.000,00").unwrap(), dec!(-1000));
    }

    #[test]
    fn test_parse_money_rejects_garbage() {
        assert!(parse_money("").is_err());
        assert!(parse_money("12a").is_err());
        assert!(parse_money("1,2,3").is_err());
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("15,5").unwrap(), dec!(15.5));
        assert_eq!(parse_percent("11,80 %").unwrap(), dec!(11.80));
        assert_eq!(parse_percent("20").unwrap(), dec!(20));
        assert!(parse_percent("15.5").is_err());
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_money(dec!(2488.32)), "R$ 2.488,32");
        assert_eq!(format_money(dec!(1000000)), "R$ 1.000.000,00");
        assert_eq!(format_money(dec!(0.004)), "R$ 0,00");
        assert_eq!(format_money(dec!(-12.345)), "-R$ 12,35");
        assert_eq!(format_money(dec!(999.999)), "R$ 1.000,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(15)), "15,00%");
        assert_eq!(format_percent(dec!(14.755)), "14,76%");
    }
}
