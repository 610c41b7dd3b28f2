use serde_json::Value;

use super::{payload, scalar_text};

/// Fields worth printing on their own, most useful first.
const PRIORITY_KEYS: [&str; 4] = [
    "installment_amount_rounded",
    "message",
    "installment_amount",
    "status",
];

/// Print just the headline answer: the installment, or the rejection message.
pub fn print_minimal(value: &Value) {
    let result = payload(value);

    if let Value::Object(map) = result {
        let headline = PRIORITY_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .find(|v| !v.is_null());
        if let Some(val) = headline {
            println!("{}", scalar_text(val));
            return;
        }
    }

    // Rate band listings have no headline; one hint per line.
    if let Value::Array(rows) = result {
        for row in rows {
            match row.get("hint") {
                Some(hint) => println!("{}", scalar_text(hint)),
                None => println!("{}", scalar_text(row)),
            }
        }
        return;
    }

    println!("{}", scalar_text(result));
}
