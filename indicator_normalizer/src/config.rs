// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A single spreadsheet cell, detached from any particular file format.
///
/// The host application converts whatever its spreadsheet reader produces
/// into this enum before handing a table to the normalizer.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Empty,
}

/// One named sheet: a header of column names and the data rows below it.
///
/// Rows are padded with empty cells (or truncated) to the header width at
/// construction, so every accessor can index by column safely.
#[derive(PartialEq, Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: String, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Table {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, CellValue::Empty);
                r
            })
            .collect();
        Table {
            name,
            columns,
            rows,
        }
    }
}

/// The apparent host type of a column, derived from its non-missing cells.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnKind {
    /// Every non-missing cell is an integer or a float.
    Numeric,
    /// At least one non-missing cell is textual.
    Text,
    /// No non-missing cell at all.
    Blank,
}

/// Role assigned to one column of a sheet.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnRole {
    Country,
    Year,
    Indicator,
    Value,
    Metadata,
}

/// The classifier's output: at most one country, year and indicator column,
/// any number of value columns, everything else metadata.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RoleAssignment {
    pub country: Option<usize>,
    pub year: Option<usize>,
    pub indicator: Option<usize>,
    pub values: Vec<usize>,
    pub metadata: Vec<usize>,
}

impl RoleAssignment {
    pub fn role_of(&self, idx: usize) -> ColumnRole {
        if self.country == Some(idx) {
            ColumnRole::Country
        } else if self.year == Some(idx) {
            ColumnRole::Year
        } else if self.indicator == Some(idx) {
            ColumnRole::Indicator
        } else if self.values.contains(&idx) {
            ColumnRole::Value
        } else {
            ColumnRole::Metadata
        }
    }
}

// ********* Configuration **********

/// Keyword sets and name filters driving column classification.
///
/// All matching is case-insensitive. The keyword sets are checked in the
/// order country, year, indicator; the first set containing a keyword that
/// occurs in the column name claims the column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ClassifierConfig {
    pub country_keywords: Vec<String>,
    pub year_keywords: Vec<String>,
    pub indicator_keywords: Vec<String>,
    /// Column names that never carry observations, compared whole.
    pub metadata_columns: Vec<String>,
    /// Prefixes of generated placeholder headers ("Unnamed: 3" and friends).
    pub placeholder_prefixes: Vec<String>,
    /// Inclusive range a header-derived year must fall into.
    pub min_header_year: i32,
    pub max_header_year: i32,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> ClassifierConfig {
        ClassifierConfig {
            country_keywords: owned(&["country", "nation", "territory", "economy"]),
            year_keywords: owned(&["year", "time", "period"]),
            indicator_keywords: owned(&["indicator", "variable", "measure", "metric"]),
            metadata_columns: owned(&[
                "economy",
                "code",
                "region",
                "income_group",
                "income group",
                "last_available_year",
                "partneriso3",
                "tradeflowname",
            ]),
            placeholder_prefixes: owned(&["unnamed", "column"]),
            min_header_year: 1900,
            max_header_year: 2030,
        }
    }
}

/// Ordered acronym restorations applied after title-casing an identifier.
///
/// The list is exhaustive configuration, not a heuristic: an acronym missing
/// here stays title-cased.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NameCleaner {
    pub replacements: Vec<(String, String)>,
}

impl Default for NameCleaner {
    fn default() -> NameCleaner {
        let pairs = [
            ("Gdp", "GDP"),
            ("Ipr", "IPR"),
            ("Gfcf", "GFCF"),
            ("Stem", "STEM"),
            ("Gerd", "GERD"),
            ("Ptdp", "PTDP"),
            ("Adtp", "ADTP"),
            ("Iso", "ISO"),
        ];
        NameCleaner {
            replacements: pairs
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }
}

// ********* Metadata table **********

/// Descriptive fields for one indicator, as provided by the host.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IndicatorMeta {
    pub id: String,
    /// Sheet name this indicator maps to, when the workbook uses
    /// opaque sheet names ("1".."17") instead of indicator columns.
    pub sheet_key: Option<String>,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub category: String,
    pub subcategory: String,
    pub layer: String,
}

/// An ordered metadata table. Iteration order is declaration order and is
/// the tie-break for ambiguous lookups, so hosts should list more specific
/// entries first.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MetaTable {
    pub entries: Vec<IndicatorMeta>,
}

impl MetaTable {
    pub fn new(entries: Vec<IndicatorMeta>) -> MetaTable {
        MetaTable { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ******** Output data structures *********

pub const UNKNOWN: &str = "Unknown";

/// One normalized observation. Records are independent of each other and
/// carry no identity beyond their fields; duplicates are kept as-is.
#[derive(PartialEq, Debug, Clone)]
pub struct IndicatorRecord {
    pub indicator: String,
    pub country: String,
    pub year: i32,
    pub value: f64,
    pub category: String,
    pub subcategory: String,
    pub layer: String,
    pub unit: String,
    pub sheet_source: String,
}

/// Sorted, duplicate-free projections over a record collection, used for
/// the consolidated dataset's metadata block.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub countries: Vec<String>,
    pub years: Vec<i32>,
    pub indicators: Vec<String>,
    pub categories: Vec<String>,
}

/// Per-table accounting returned by the normalizer.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TableStats {
    pub records: usize,
    /// Row/column pairs dropped because country, year or value failed
    /// presence or coercion checks.
    pub skipped: usize,
}

/// Errors that prevent a table from being normalized at all.
/// Cell-level failures are not errors; they only skip the cell.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NormalizeErrors {
    EmptyTable,
    NoColumns,
}

impl Error for NormalizeErrors {}

impl Display for NormalizeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeErrors::EmptyTable => write!(f, "table has no data rows"),
            NormalizeErrors::NoColumns => write!(f, "table has no usable header"),
        }
    }
}
