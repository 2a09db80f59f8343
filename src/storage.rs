use crate::table::{Column, Key, Table, parse_datetime};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Load a CSV with a header row. The first column becomes the index: datetimes when
/// every cell parses as one, numbers when every cell is numeric, labels otherwise.
/// A column is numeric when each non-empty cell parses as `f64`; empty cells are NaN.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        anyhow::bail!("{} has no header row", path.display());
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        for (i, col) in cells.iter_mut().enumerate() {
            col.push(record.get(i).unwrap_or_default().to_string());
        }
    }

    let index_cells = &cells[0];
    let keys: Vec<Key> = if !index_cells.is_empty()
        && index_cells.iter().all(|c| parse_datetime(c).is_some())
    {
        index_cells
            .iter()
            .filter_map(|c| parse_datetime(c).map(Key::Time))
            .collect()
    } else if !index_cells.is_empty() && index_cells.iter().all(|c| c.parse::<f64>().is_ok()) {
        index_cells
            .iter()
            .filter_map(|c| c.parse::<f64>().ok().map(Key::Number))
            .collect()
    } else {
        index_cells.iter().map(|c| Key::Label(c.clone())).collect()
    };

    let mut table = Table::new(keys).with_index_name(headers[0].clone());
    for (name, col) in headers.iter().zip(cells).skip(1) {
        table.insert(name.clone(), parse_column(col))?;
    }
    log::debug!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        headers.len() - 1,
        path.display()
    );
    Ok(table)
}

fn parse_column(cells: Vec<String>) -> Column {
    let numeric = cells
        .iter()
        .all(|c| c.is_empty() || c.parse::<f64>().is_ok());
    if numeric {
        Column::Numeric(
            cells
                .iter()
                .map(|c| c.parse::<f64>().unwrap_or(f64::NAN))
                .collect(),
        )
    } else {
        Column::Text(cells)
    }
}

/// Cells starting with a formula trigger are quoted for spreadsheet safety.
fn sanitize_cell(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

fn index_cell(key: &Key) -> String {
    match key {
        Key::Time(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        Key::Number(n) => n.to_string(),
        Key::Label(s) => sanitize_cell(s),
    }
}

/// Save a table as CSV with the index as the first column.
pub fn save_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let index_name = table.index().name.clone().unwrap_or_else(|| "index".into());
    let mut header = vec![index_name];
    header.extend(table.column_names().map(str::to_string));
    wtr.write_record(&header)?;

    for (row, key) in table.keys().iter().enumerate() {
        let mut record = vec![index_cell(key)];
        for name in table.column_names() {
            let cell = match table.column(name) {
                Some(Column::Numeric(v)) => match v.get(row) {
                    Some(n) if n.is_finite() => n.to_string(),
                    _ => String::new(),
                },
                Some(Column::Text(v)) => v.get(row).map(|s| sanitize_cell(s)).unwrap_or_default(),
                None => String::new(),
            };
            record.push(cell);
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a table as a pretty JSON array of row objects; NaN becomes `null`.
pub fn save_json<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let index_name = table.index().name.clone().unwrap_or_else(|| "index".into());
    let rows: Vec<Value> = table
        .keys()
        .iter()
        .enumerate()
        .map(|(row, key)| {
            let mut obj = Map::new();
            let k = match key {
                Key::Time(t) => Value::String(t.format("%Y-%m-%dT%H:%M:%S").to_string()),
                Key::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
                Key::Label(s) => Value::String(s.clone()),
            };
            obj.insert(index_name.clone(), k);
            for name in table.column_names() {
                let v = match table.column(name) {
                    Some(Column::Numeric(v)) => v
                        .get(row)
                        .and_then(|n| serde_json::Number::from_f64(*n))
                        .map_or(Value::Null, Value::Number),
                    Some(Column::Text(v)) => v.get(row).cloned().map_or(Value::Null, Value::String),
                    None => Value::Null,
                };
                obj.insert(name.to_string(), v);
            }
            Value::Object(obj)
        })
        .collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let table = Table::new(vec!["a".into(), "b".into()])
            .with_numeric("v", vec![1.5, f64::NAN])
            .unwrap()
            .with_text("note", vec!["=SUM(A1)".into(), "ok".into()])
            .unwrap();
        save_csv(&table, &csvp).unwrap();
        save_json(&table, &jsonp).unwrap();

        let csv_text = std::fs::read_to_string(&csvp).unwrap();
        assert!(csv_text.contains("'=SUM(A1)"));
        let json: Value = serde_json::from_str(&std::fs::read_to_string(&jsonp).unwrap()).unwrap();
        assert_eq!(json[1]["v"], Value::Null);
        assert_eq!(json[0]["index"], "a");
    }

    #[test]
    fn empty_cells_load_as_nan() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("in.csv");
        std::fs::write(&p, "date,a,b\n2024-01-01,1,x\n2024-01-02,,y\n").unwrap();
        let t = load_csv(&p).unwrap();
        assert!(t.index().is_datetime());
        assert!(t.numeric("a").unwrap()[1].is_nan());
        assert_eq!(t.text("b").unwrap(), ["x".to_string(), "y".to_string()]);
    }
}
