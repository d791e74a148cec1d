use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Simulation results reduce to the median annualized return and loan
/// schedules to the monthly payment; anything else falls back to its first
/// field.
pub fn print_minimal(value: &Value) {
    if let Some(p50) = value.pointer("/annualized_return/p50") {
        println!("{}", format_minimal(p50));
        return;
    }

    if let Value::Object(map) = value {
        if let Some(val) = map.get("monthly_payment") {
            println!("{}", format_minimal(val));
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(value));
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(format_minimal(&json!(7.25)), "7.25");
        assert_eq!(format_minimal(&json!("x")), "x");
        assert_eq!(format_minimal(&Value::Null), "null");
    }
}
