use property_risk_core::reporting::{format_currency, format_percentage};
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{is_simulation_result, DISTRIBUTION_FIELDS, STAT_FIELDS};

const SCENARIOS: [(&str, &str); 5] = [
    ("worst", "Worst"),
    ("pessimistic", "Pessimistic (P25)"),
    ("expected", "Expected (P50)"),
    ("optimistic", "Optimistic (P75)"),
    ("best", "Best"),
];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) if is_simulation_result(value) => print_simulation(map),
        Value::Object(map) => print_object(map),
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

// ---------------------------------------------------------------------------
// Simulation result
// ---------------------------------------------------------------------------

fn print_simulation(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    let mut header = vec!["Metric".to_string()];
    header.extend(STAT_FIELDS.iter().map(|s| s.to_string()));
    builder.push_record(header);
    for field in DISTRIBUTION_FIELDS {
        let Some(dist) = map.get(field) else { continue };
        let mut row = vec![field.to_string()];
        for stat in STAT_FIELDS {
            let n = number(dist.get(stat));
            row.push(if field == "annualized_return" {
                format_percentage(n)
            } else {
                format_currency(n)
            });
        }
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Object(risk)) = map.get("risk_metrics") {
        let mut builder = Builder::default();
        builder.push_record(["Risk metric", "Value"]);
        for (key, val) in risk {
            builder.push_record([key.clone(), format_risk(key, number(Some(val)))]);
        }
        println!("\n{}", Table::from(builder));
    }

    if let Some(scenarios) = map.get("scenarios") {
        let mut builder = Builder::default();
        builder.push_record([
            "Scenario",
            "Trial",
            "Total return",
            "Annualized",
            "Cash flow",
            "Final equity",
        ]);
        for (key, label) in SCENARIOS {
            let Some(s) = scenarios.get(key) else { continue };
            let outcome = s.get("outcome");
            let field = |name: &str| number(outcome.and_then(|o| o.get(name)));
            builder.push_record([
                label.to_string(),
                s.get("trial_index").map(Value::to_string).unwrap_or_default(),
                format_currency(field("total_return")),
                format_percentage(field("annualized_return")),
                format_currency(field("total_cash_flow")),
                format_currency(field("final_equity")),
            ]);
        }
        println!("\n{}", Table::from(builder));
    }

    print_warnings(map);

    if let Some(meta) = map.get("metadata") {
        println!(
            "\n{} trials, {} years, seed {}, {} ms",
            meta.get("simulations").map(Value::to_string).unwrap_or_default(),
            meta.get("years").map(Value::to_string).unwrap_or_default(),
            meta.get("seed").map(Value::to_string).unwrap_or_default(),
            meta.get("elapsed_ms").map(Value::to_string).unwrap_or_default(),
        );
    }
}

fn format_risk(key: &str, value: f64) -> String {
    match key {
        "max_drawdown" => format_currency(value),
        "sharpe_ratio" | "sortino_ratio" => format!("{value:.2}"),
        _ => format_percentage(value),
    }
}

fn print_warnings(map: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = map.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }
}

fn number(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// Generic documents (defaults, amortization)
// ---------------------------------------------------------------------------

/// Scalars go in a field/value table; arrays of objects get a table each.
fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.iter().all(Value::is_object) && !arr.is_empty() => {
                nested.push((key, arr));
            }
            _ => builder.push_record([key.as_str(), &format_value(val)]),
        }
    }
    println!("{}", Table::from(builder));

    for (key, arr) in nested {
        println!("\n{key}:");
        print_array_table(arr);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.2}"),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_risk_formatting() {
        assert_eq!(format_risk("max_drawdown", 1_234.4), "$1,234");
        assert_eq!(format_risk("sharpe_ratio", 0.8567), "0.86");
        assert_eq!(format_risk("value_at_risk_95", -2.5), "-2.50%");
    }

    #[test]
    fn test_format_value_rounds_floats_only() {
        assert_eq!(format_value(&json!(2022.6155)), "2022.62");
        assert_eq!(format_value(&json!(30)), "30");
    }

    #[test]
    fn test_missing_number_is_nan() {
        assert!(number(None).is_nan());
        assert_eq!(number(Some(&json!(3.5))), 3.5);
    }
}
