use log::{debug, info, warn};

use indicator_normalizer::*;

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod framework_reader;
pub mod inspect;
pub mod io_xlsx;
pub mod server;

use crate::dash::framework_reader::Framework;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no sheets"))]
    EmptyExcel { path: String },
    #[snafu(display("Sheet {sheet} is missing from the workbook"))]
    MissingSheet { sheet: String },
    #[snafu(display("Error reading sheet {sheet}"))]
    ReadingSheet {
        source: calamine::XlsxError,
        sheet: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Normalization failure"))]
    Normalizing { source: NormalizeErrors },
    #[snafu(display("Error writing output {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot build the server runtime"))]
    Runtime { source: std::io::Error },
    #[snafu(display("Cannot bind port {port}: already in use?"))]
    Binding {
        source: std::io::Error,
        port: u16,
    },
    #[snafu(display("Server failure"))]
    Serving { source: std::io::Error },
    #[snafu(display("The dataset {path} differs from the reference"))]
    CheckFailed { path: String },
    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;
pub type BDashResult<T> = Result<T, Box<DashError>>;

/// A sheet dropped from the run, with the reason.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetFailure {
    pub sheet: String,
    pub error: String,
}

/// Structured outcome of one transformation run, so callers can act on
/// counts instead of parsing console output.
#[derive(Debug, Clone)]
pub struct TransformReport {
    pub source_file: String,
    pub transformation_date: String,
    pub total_sheets: usize,
    pub sheets_processed: usize,
    pub failures: Vec<SheetFailure>,
    pub skipped_cells: usize,
    pub summary: DatasetSummary,
}

fn validate_framework(framework: &Framework) -> DashResult<()> {
    if framework.indicators.is_empty() {
        whatever!("The framework defines no indicators");
    }
    Ok(())
}

pub fn run_transform(
    input: String,
    framework_path: Option<String>,
    out_dir: String,
) -> BDashResult<TransformReport> {
    let framework = match framework_path {
        Some(p) => framework_reader::read_framework(p)?,
        None => framework_reader::builtin_framework(),
    };
    validate_framework(&framework)?;
    let config = framework.classifier_config();
    let cleaner = framework.name_cleaner();
    let meta = framework.meta_table();

    let mut workbook = io_xlsx::open(input.clone())?;
    let sheet_names = io_xlsx::sheet_names(&workbook);
    if sheet_names.is_empty() {
        return Err(Box::new(DashError::EmptyExcel { path: input }));
    }
    info!("run_transform: {}: {} sheets", input, sheet_names.len());

    let mut builder = Builder::new(&config)
        .and_then(|b| b.cleaner(&cleaner))
        .and_then(|b| b.meta_table(&meta))
        .context(NormalizingSnafu {})?;

    let mut sheets_processed: usize = 0;
    let mut failures: Vec<SheetFailure> = Vec::new();
    for name in &sheet_names {
        match add_sheet(&mut workbook, name, &mut builder) {
            Ok(stats) => {
                sheets_processed += 1;
                debug!(
                    "run_transform: sheet {}: {} records, {} skipped",
                    name, stats.records, stats.skipped
                );
            }
            Err(e) => {
                warn!("run_transform: sheet {} skipped: {}", name, e);
                failures.push(SheetFailure {
                    sheet: name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let report = TransformReport {
        source_file: input,
        transformation_date: chrono::Local::now().to_rfc3339(),
        total_sheets: sheet_names.len(),
        sheets_processed,
        failures,
        skipped_cells: builder.skipped(),
        summary: builder.summary(),
    };

    let out_path = Path::new(out_dir.as_str());
    let consolidated = write_outputs(out_path, &framework, &report, builder.records())?;

    println!("Transformation complete");
    println!("  Consolidated dataset: {}", consolidated.display());
    println!(
        "  Data points: {} ({} cells skipped)",
        report.summary.total_records, report.skipped_cells
    );
    println!(
        "  Sheets processed: {}/{}",
        report.sheets_processed, report.total_sheets
    );
    println!("  Countries: {}", report.summary.countries.len());
    println!("  Years: {}", report.summary.years.len());
    println!("  Indicators: {}", report.summary.indicators.len());
    println!("  Categories: {}", report.summary.categories.len());
    if !report.failures.is_empty() {
        println!("  Failed sheets:");
        for f in &report.failures {
            println!("    - {}: {}", f.sheet, f.error);
        }
    }

    Ok(report)
}

fn add_sheet(
    workbook: &mut io_xlsx::XlsxFile,
    name: &str,
    builder: &mut Builder,
) -> BDashResult<TableStats> {
    let table = io_xlsx::read_sheet(workbook, name)?;
    let stats = builder.add_table(&table).context(NormalizingSnafu {})?;
    Ok(stats)
}

// ******** JSON assembly ********

fn record_to_json(r: &IndicatorRecord) -> JSValue {
    json!({
        "indicator": r.indicator,
        "country": r.country,
        "year": r.year,
        "value": r.value,
        "category": r.category,
        "subcategory": r.subcategory,
        "layer": r.layer,
        "unit": r.unit,
        "sheet_source": r.sheet_source,
    })
}

fn dataset_to_json(
    framework: &Framework,
    report: &TransformReport,
    records: &[IndicatorRecord],
) -> JSValue {
    let data_points: Vec<JSValue> = records.iter().map(record_to_json).collect();
    json!({
        "metadata": {
            "title": framework.title,
            "description": framework.description,
            "transformation_date": report.transformation_date,
            "source_file": report.source_file,
            "total_data_points": report.summary.total_records,
            "countries": report.summary.countries,
            "years": report.summary.years,
            "indicators": report.summary.indicators,
            "categories": report.summary.categories,
        },
        "data_points": data_points,
    })
}

fn summary_to_json(report: &TransformReport) -> JSValue {
    let failed: Vec<JSValue> = report
        .failures
        .iter()
        .map(|f| json!({"sheet": f.sheet, "error": f.error}))
        .collect();
    json!({
        "transformation_date": report.transformation_date,
        "source_file": report.source_file,
        "total_sheets": report.total_sheets,
        "sheets_processed": report.sheets_processed,
        "sheets_failed": failed,
        "total_data_points": report.summary.total_records,
        "skipped_cells": report.skipped_cells,
        "countries": report.summary.countries,
        "years": report.summary.years,
        "indicators": report.summary.indicators,
        "categories": report.summary.categories,
    })
}

fn mapping_to_json(framework: &Framework) -> JSValue {
    let mut mapping: JSMap<String, JSValue> = JSMap::new();
    for e in framework.indicators.iter() {
        mapping.insert(
            e.id.clone(),
            json!({
                "id": e.id,
                "sheet": e.sheet,
                "name": e.name,
                "description": e.description,
                "unit": e.unit,
                "category": e.category,
                "subcategory": e.subcategory,
                "layer": e.layer,
            }),
        );
    }
    JSValue::Object(mapping)
}

pub(crate) fn write_json(path: &Path, js: &JSValue) -> BDashResult<()> {
    let pretty = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    fs::write(path, pretty).context(WritingOutputSnafu {
        path: path.display().to_string(),
    })?;
    Ok(())
}

/// Writes the three JSON documents of a run and returns the path of the
/// consolidated dataset.
pub fn write_outputs(
    out_dir: &Path,
    framework: &Framework,
    report: &TransformReport,
    records: &[IndicatorRecord],
) -> BDashResult<PathBuf> {
    fs::create_dir_all(out_dir).context(WritingOutputSnafu {
        path: out_dir.display().to_string(),
    })?;
    let consolidated = out_dir.join("consolidated_dataset.json");
    write_json(&consolidated, &dataset_to_json(framework, report, records))?;
    write_json(
        &out_dir.join("transformation_summary.json"),
        &summary_to_json(report),
    )?;
    write_json(
        &out_dir.join("indicator_mapping.json"),
        &mapping_to_json(framework),
    )?;
    Ok(consolidated)
}

// ******** Reference check ********

fn read_dataset(path: String) -> BDashResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_check(input: String, reference: String) -> BDashResult<()> {
    let generated = read_dataset(input.clone())?;
    let reference_js = read_dataset(reference)?;

    let pretty_generated = serde_json::to_string_pretty(&generated).context(ParsingJsonSnafu {})?;
    let pretty_reference =
        serde_json::to_string_pretty(&reference_js).context(ParsingJsonSnafu {})?;
    if pretty_reference != pretty_generated {
        warn!("Found differences with the reference dataset");
        print_diff(
            pretty_reference.as_str(),
            pretty_generated.as_ref(),
            "\n",
        );
        return Err(Box::new(DashError::CheckFailed { path: input }));
    }

    let count = |key: &str| -> usize {
        generated["metadata"][key]
            .as_array()
            .map(|a| a.len())
            .unwrap_or(0)
    };
    println!(
        "Datasets match: {} data points, {} countries, {} years",
        generated["data_points"]
            .as_array()
            .map(|a| a.len())
            .unwrap_or(0),
        count("countries"),
        count("years"),
    );
    Ok(())
}
