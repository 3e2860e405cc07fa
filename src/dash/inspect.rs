// Structure diagnostics for a workbook, ahead of a transformation run.

use log::warn;

use serde_json::json;
use serde_json::Value as JSValue;

use indicator_normalizer::{
    classify_columns, column_kind, is_missing, ClassifierConfig, ColumnKind, ColumnRole, Table,
};

use crate::dash::{io_xlsx, write_json, BDashResult};

pub fn run_inspect(input: String, out: Option<String>) -> BDashResult<()> {
    let config = ClassifierConfig::default();
    let mut workbook = io_xlsx::open(input.clone())?;
    let sheet_names = io_xlsx::sheet_names(&workbook);

    println!("Workbook {}: {} sheets", input, sheet_names.len());

    let mut analyses: Vec<JSValue> = Vec::new();
    for name in &sheet_names {
        match io_xlsx::read_sheet(&mut workbook, name) {
            Ok(table) => {
                let analysis = analyze_table(&table, &config);
                print_analysis(&table, &analysis);
                analyses.push(analysis);
            }
            Err(e) => {
                warn!("run_inspect: sheet {} unreadable: {}", name, e);
                println!("Sheet {}: unreadable ({})", name, e);
                analyses.push(json!({"sheet": name, "error": e.to_string()}));
            }
        }
    }

    if let Some(out_path) = out {
        let js = json!({"source_file": input, "sheets": analyses});
        write_json(std::path::Path::new(out_path.as_str()), &js)?;
        println!("Analysis written to {}", out_path);
    }
    Ok(())
}

fn kind_label(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Numeric => "numeric",
        ColumnKind::Text => "text",
        ColumnKind::Blank => "blank",
    }
}

fn role_label(role: ColumnRole) -> &'static str {
    match role {
        ColumnRole::Country => "country",
        ColumnRole::Year => "year",
        ColumnRole::Indicator => "indicator",
        ColumnRole::Value => "value",
        ColumnRole::Metadata => "metadata",
    }
}

fn analyze_table(table: &Table, config: &ClassifierConfig) -> JSValue {
    let roles = classify_columns(table, config);
    let columns: Vec<JSValue> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let missing = table.rows.iter().filter(|r| is_missing(&r[idx])).count();
            json!({
                "name": name,
                "kind": kind_label(column_kind(table, idx)),
                "role": role_label(roles.role_of(idx)),
                "missing": missing,
            })
        })
        .collect();
    json!({
        "sheet": table.name,
        "rows": table.rows.len(),
        "columns": columns,
    })
}

fn print_analysis(table: &Table, analysis: &JSValue) {
    println!(
        "Sheet {}: {} rows x {} columns",
        table.name,
        table.rows.len(),
        table.columns.len()
    );
    if let Some(columns) = analysis["columns"].as_array() {
        for c in columns {
            println!(
                "  - {} [{}] -> {} ({} missing)",
                c["name"].as_str().unwrap_or(""),
                c["kind"].as_str().unwrap_or(""),
                c["role"].as_str().unwrap_or(""),
                c["missing"]
            );
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use indicator_normalizer::CellValue;

    #[test]
    fn analysis_reports_kinds_roles_and_missing_counts() {
        let table = Table::new(
            "1".to_string(),
            vec!["Country".to_string(), "2020".to_string()],
            vec![
                vec![
                    CellValue::Text("Albania".to_string()),
                    CellValue::Float(10.5),
                ],
                vec![
                    CellValue::Text("Serbia".to_string()),
                    CellValue::Text("..".to_string()),
                ],
            ],
        );
        let js = analyze_table(&table, &ClassifierConfig::default());
        assert_eq!(js["sheet"], json!("1"));
        assert_eq!(js["rows"], json!(2));
        assert_eq!(js["columns"][0]["role"], json!("country"));
        assert_eq!(js["columns"][1]["role"], json!("value"));
        assert_eq!(js["columns"][1]["kind"], json!("numeric"));
        assert_eq!(js["columns"][1]["missing"], json!(1));
    }
}
