use loan_sim_core::locale::{format_money, format_percent};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use super::{rows, scalar_text};

/// Payload fields holding amounts of money.
const MONEY_KEYS: [&str; 6] = [
    "principal",
    "installment_amount",
    "installment_amount_rounded",
    "total_payable",
    "total_interest",
    "amount",
];

/// Print output as tables, with amounts and rates in pt-BR notation.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_envelope(result, map),
            None => print_fields(map),
        },
        Value::Array(arr) => print_rows(arr),
        other => println!("{}", scalar_text(other)),
    }
}

fn print_envelope(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(fields) => print_fields(fields),
        other => println!("{}", scalar_text(other)),
    }
    if let Some(installments) = rows(result) {
        println!("\nInstallments:");
        print_rows(installments);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {methodology}");
    }
}

/// Scalar fields as a Field/Value table; nested lists are printed separately.
fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map.iter().filter(|(_, v)| !v.is_array()) {
        builder.push_record([key.clone(), display(key, val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in arr {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h).map(|v| display(h, v)).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn display(key: &str, value: &Value) -> String {
    let text = scalar_text(value);
    let Ok(number) = Decimal::from_str(&text) else {
        return text;
    };
    if MONEY_KEYS.contains(&key) {
        format_money(number)
    } else if key.ends_with("_pct") {
        format_percent(number)
    } else {
        text
    }
}
