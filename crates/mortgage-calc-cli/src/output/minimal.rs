use serde_json::Value;

/// Keys printed by `--output minimal`, most important first.
const PRIORITY_KEYS: [&str; 5] = [
    "monthly_payment",
    "total_paid",
    "description",
    "submitted",
    "message",
];

/// Print just the headline value: the monthly payment for calculations, the
/// notification text for a lead, one id per line for the program list.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        Value::Array(items) => {
            for item in items {
                match item.get("id") {
                    Some(id) => println!("{}", format_minimal(id)),
                    None => println!("{}", format_minimal(item)),
                }
            }
        }
        other => println!("{}", format_minimal(other)),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
