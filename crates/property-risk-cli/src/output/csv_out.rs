use serde_json::{Map, Value};
use std::io;

use super::{is_simulation_result, DISTRIBUTION_FIELDS, STAT_FIELDS};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let _ = write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match value {
        Value::Object(map) if is_simulation_result(value) => write_distributions(wtr, map),
        Value::Object(map) => {
            // Amortization schedules are one row per year
            if let Some(Value::Array(rows)) = map.get("years") {
                write_array_csv(wtr, rows)
            } else {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), &format_csv_value(val)])?;
                }
                Ok(())
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr),
        _ => wtr.write_record([&format_csv_value(value)]),
    }
}

/// One row per simulated metric, plus one per risk metric.
fn write_distributions<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
) -> csv::Result<()> {
    let mut header = vec!["metric"];
    header.extend(STAT_FIELDS);
    wtr.write_record(&header)?;

    for field in DISTRIBUTION_FIELDS {
        let Some(dist) = map.get(field) else { continue };
        let mut row = vec![field.to_string()];
        row.extend(
            STAT_FIELDS
                .iter()
                .map(|s| dist.get(*s).map(format_csv_value).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }

    if let Some(Value::Object(risk)) = map.get("risk_metrics") {
        for (key, val) in risk {
            let mut row = vec![String::new(); STAT_FIELDS.len() + 1];
            row[0] = key.clone();
            // Point values sit in the mean column
            row[1] = format_csv_value(val);
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    if arr.is_empty() {
        return Ok(());
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        wtr.write_record(&headers)?;

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                wtr.write_record(&row)?;
            }
        }
    } else {
        for item in arr {
            wtr.write_record([&format_csv_value(item)])?;
        }
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
