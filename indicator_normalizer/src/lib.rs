mod builder;
mod config;

use log::{debug, info};

use std::collections::BTreeSet;

pub use crate::builder::Builder;
pub use crate::config::*;

// **** Missing-value handling ****

/// The single predicate deciding whether a cell carries no observation:
/// empty cells, blank text, the `".."` placeholder and non-finite floats.
pub fn is_missing(cell: &CellValue) -> bool {
    match cell {
        CellValue::Empty => true,
        CellValue::Text(s) => {
            let t = s.trim();
            t.is_empty() || t == ".."
        }
        CellValue::Float(f) => !f.is_finite(),
        CellValue::Int(_) => false,
    }
}

/// The apparent host type of a column, ignoring missing cells.
pub fn column_kind(table: &Table, col: usize) -> ColumnKind {
    let mut saw_numeric = false;
    for row in &table.rows {
        let cell = &row[col];
        if is_missing(cell) {
            continue;
        }
        match cell {
            CellValue::Text(_) => return ColumnKind::Text,
            CellValue::Int(_) | CellValue::Float(_) => saw_numeric = true,
            CellValue::Empty => {}
        }
    }
    if saw_numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Blank
    }
}

// **** Column classification ****

fn contains_keyword(lower_name: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| lower_name.contains(k.as_str()))
}

fn has_placeholder_prefix(lower_name: &str, config: &ClassifierConfig) -> bool {
    config
        .placeholder_prefixes
        .iter()
        .any(|p| lower_name.starts_with(p.as_str()))
}

/// Determines whether a column name denotes an actual observation column,
/// as opposed to a label or metadata column. Only year-shaped names
/// (`"2020"`) and year-range names (`"20152022"`) qualify.
pub fn is_data_column(name: &str, config: &ClassifierConfig) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lower = trimmed.to_lowercase();
    if config.metadata_columns.iter().any(|m| *m == lower) {
        return false;
    }
    if has_placeholder_prefix(&lower, config) {
        return false;
    }
    header_year(trimmed, config).is_some()
}

/// Extracts the leading year of a 4-digit or concatenated 8-digit
/// year-range column name, range-checked against the configuration.
pub fn header_year(name: &str, config: &ClassifierConfig) -> Option<i32> {
    let t = name.trim();
    if t.len() != 4 && t.len() != 8 {
        return None;
    }
    if !t.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = t[..4].parse().ok()?;
    if year < config.min_header_year || year > config.max_header_year {
        return None;
    }
    Some(year)
}

/// Assigns a role to every column of the table.
///
/// Keyword sets are evaluated in priority order (country, year, indicator)
/// against the lowercased column name; the first unclaimed single role whose
/// set matches takes the column. A numeric column that is not the year
/// column becomes a value column, except that blank, placeholder and
/// pure-numeral headers must also pass [`is_data_column`]. Everything else
/// is metadata.
///
/// This is a pure function of its inputs.
pub fn classify_columns(table: &Table, config: &ClassifierConfig) -> RoleAssignment {
    let mut roles = RoleAssignment::default();
    for (idx, name) in table.columns.iter().enumerate() {
        let lower = name.trim().to_lowercase();
        if roles.country.is_none() && contains_keyword(&lower, &config.country_keywords) {
            roles.country = Some(idx);
        } else if roles.year.is_none() && contains_keyword(&lower, &config.year_keywords) {
            roles.year = Some(idx);
        } else if roles.indicator.is_none() && contains_keyword(&lower, &config.indicator_keywords)
        {
            roles.indicator = Some(idx);
        } else if column_kind(table, idx) == ColumnKind::Numeric {
            let suspicious = lower.is_empty()
                || has_placeholder_prefix(&lower, config)
                || lower.chars().all(|c| c.is_ascii_digit());
            if suspicious && !is_data_column(name, config) {
                roles.metadata.push(idx);
            } else {
                roles.values.push(idx);
            }
        } else {
            roles.metadata.push(idx);
        }
    }
    debug!("classify_columns: {}: {:?}", table.name, roles);
    roles
}

// **** Cell coercion ****

// Floats within this distance of a whole number count as integral years.
const YEAR_TOLERANCE: f64 = 1e-6;

/// Coerces a cell into a calendar year. Floats are truncated toward zero
/// only when their fractional part is within tolerance; strings must parse
/// as plain integers. Anything else is rejected, never defaulted.
pub fn coerce_year(cell: &CellValue) -> Option<i32> {
    match cell {
        CellValue::Int(i) => i32::try_from(*i).ok(),
        CellValue::Float(f) if f.is_finite() => {
            if f.fract().abs() <= YEAR_TOLERANCE {
                Some(f.trunc() as i32)
            } else {
                None
            }
        }
        CellValue::Text(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Coerces a cell into an observation value. Missing markers yield `None`,
/// never zero.
pub fn coerce_value(cell: &CellValue) -> Option<f64> {
    if is_missing(cell) {
        return None;
    }
    match cell {
        CellValue::Int(i) => Some(*i as f64),
        CellValue::Float(f) => Some(*f),
        CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        CellValue::Empty => None,
    }
}

/// Renders a non-missing cell as a label (country names, indicator cells).
pub fn cell_text(cell: &CellValue) -> Option<String> {
    if is_missing(cell) {
        return None;
    }
    match cell {
        CellValue::Text(s) => Some(s.trim().to_string()),
        CellValue::Int(i) => Some(i.to_string()),
        CellValue::Float(f) => Some(float_label(*f)),
        CellValue::Empty => None,
    }
}

/// Spreadsheet readers report integral numbers as floats; labels should not
/// carry the trailing `.0`.
pub fn float_label(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

// **** Indicator names and metadata ****

/// Turns a raw column or sheet identifier into a display name: strips one
/// leading digit run plus underscore, replaces underscores with spaces,
/// title-cases, then applies the configured acronym restorations in order.
pub fn clean_indicator_name(raw: &str, cleaner: &NameCleaner) -> String {
    let mut name = raw.trim();
    let digits = name.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = name[digits..].strip_prefix('_') {
            name = rest;
        }
    }
    let spaced = name.replace('_', " ");
    let mut titled = String::with_capacity(spaced.len());
    let mut start_of_word = true;
    for c in spaced.chars() {
        if c.is_alphanumeric() {
            if start_of_word {
                titled.extend(c.to_uppercase());
            } else {
                titled.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            titled.push(c);
            start_of_word = true;
        }
    }
    let mut result = titled;
    for (from, to) in cleaner.replacements.iter() {
        result = result.replace(from.as_str(), to.as_str());
    }
    result
}

/// Finds the metadata entry for an indicator, trying in order: the sheet
/// mapping, the entry id against the raw identifier, the display name, and
/// finally the description. Each tier scans the table in declaration order
/// and the first hit wins; no hit leaves the record classified as Unknown.
pub fn lookup_meta<'a>(
    table: &'a MetaTable,
    sheet: &str,
    raw: &str,
    cleaned: &str,
) -> Option<&'a IndicatorMeta> {
    let sheet_l = sheet.trim().to_lowercase();
    let raw_l = raw.trim().to_lowercase();
    let cleaned_l = cleaned.trim().to_lowercase();

    if let Some(m) = table.entries.iter().find(|m| {
        m.sheet_key
            .as_deref()
            .map(|k| k.trim().to_lowercase() == sheet_l)
            .unwrap_or(false)
    }) {
        return Some(m);
    }
    if let Some(m) = table
        .entries
        .iter()
        .find(|m| !m.id.is_empty() && raw_l.contains(&m.id.to_lowercase()))
    {
        return Some(m);
    }
    if let Some(m) = table.entries.iter().find(|m| {
        let n = m.name.to_lowercase();
        !n.is_empty() && (raw_l.contains(&n) || cleaned_l.contains(&n))
    }) {
        return Some(m);
    }
    table.entries.iter().find(|m| {
        let d = m.description.to_lowercase();
        !d.is_empty() && (raw_l.contains(&d) || cleaned_l.contains(&d))
    })
}

// **** Row extraction ****

/// The outcome of normalizing one table.
#[derive(PartialEq, Debug, Clone)]
pub struct TableNormalization {
    pub records: Vec<IndicatorRecord>,
    pub roles: RoleAssignment,
    /// Row/column pairs dropped by presence or coercion checks.
    pub skipped: usize,
}

fn build_record(
    indicator: String,
    country: String,
    year: i32,
    value: f64,
    meta: Option<&IndicatorMeta>,
    sheet: &str,
) -> IndicatorRecord {
    let (category, subcategory, layer, unit) = match meta {
        Some(m) => (
            m.category.clone(),
            m.subcategory.clone(),
            m.layer.clone(),
            m.unit.clone(),
        ),
        None => (
            UNKNOWN.to_string(),
            UNKNOWN.to_string(),
            UNKNOWN.to_string(),
            UNKNOWN.to_string(),
        ),
    };
    IndicatorRecord {
        indicator,
        country,
        year,
        value,
        category,
        subcategory,
        layer,
        unit,
        sheet_source: sheet.to_string(),
    }
}

/// Normalizes one table into flat indicator records.
///
/// With an indicator column, each row yields at most one record: the
/// indicator from the cell (the sheet name when the cell is missing), the
/// value from the first value column. Without one, each row yields one
/// record per eligible value column, named after the cleaned column header.
/// The year comes from the year column when assigned, otherwise from the
/// value column's header; records missing country, year or value after
/// coercion are skipped silently and counted.
pub fn normalize_table(
    table: &Table,
    config: &ClassifierConfig,
    cleaner: &NameCleaner,
    meta: &MetaTable,
) -> Result<TableNormalization, NormalizeErrors> {
    if table.columns.is_empty() {
        return Err(NormalizeErrors::NoColumns);
    }
    if table.rows.is_empty() {
        return Err(NormalizeErrors::EmptyTable);
    }
    let roles = classify_columns(table, config);

    let country_for = |row: &[CellValue]| -> Option<String> {
        match roles.country {
            Some(c) => cell_text(&row[c]),
            None => Some(UNKNOWN.to_string()),
        }
    };
    let year_for = |row: &[CellValue], col: usize| -> Option<i32> {
        match roles.year {
            Some(y) => coerce_year(&row[y]),
            None => header_year(&table.columns[col], config),
        }
    };

    let mut records: Vec<IndicatorRecord> = Vec::new();
    let mut skipped: usize = 0;

    if let Some(ind_idx) = roles.indicator {
        match roles.values.first().copied() {
            None => {
                // A label-only sheet: nothing to observe.
                skipped += table.rows.len();
            }
            Some(value_idx) => {
                for row in &table.rows {
                    let (Some(country), Some(year), Some(value)) = (
                        country_for(row),
                        year_for(row, value_idx),
                        coerce_value(&row[value_idx]),
                    ) else {
                        skipped += 1;
                        continue;
                    };
                    let raw = cell_text(&row[ind_idx]).unwrap_or_else(|| table.name.clone());
                    let found = lookup_meta(meta, &table.name, &raw, &raw);
                    records.push(build_record(
                        raw, country, year, value, found, &table.name,
                    ));
                }
            }
        }
    } else {
        // Each value column is its own indicator. Without a year column the
        // eligible columns are exactly the year-bearing ones.
        let eligible: Vec<usize> = if roles.year.is_some() {
            roles.values.clone()
        } else {
            roles
                .values
                .iter()
                .copied()
                .filter(|idx| header_year(&table.columns[*idx], config).is_some())
                .collect()
        };
        for row in &table.rows {
            for &col in &eligible {
                let (Some(country), Some(year), Some(value)) = (
                    country_for(row),
                    year_for(row, col),
                    coerce_value(&row[col]),
                ) else {
                    skipped += 1;
                    continue;
                };
                let raw = table.columns[col].trim().to_string();
                let display = clean_indicator_name(&raw, cleaner);
                let found = lookup_meta(meta, &table.name, &raw, &display);
                records.push(build_record(
                    display, country, year, value, found, &table.name,
                ));
            }
        }
    }

    info!(
        "normalize_table: {}: {} records, {} skipped",
        table.name,
        records.len(),
        skipped
    );
    Ok(TableNormalization {
        records,
        roles,
        skipped,
    })
}

/// Sorted, duplicate-free projections over a record collection.
pub fn summarize(records: &[IndicatorRecord]) -> DatasetSummary {
    let mut countries: BTreeSet<String> = BTreeSet::new();
    let mut years: BTreeSet<i32> = BTreeSet::new();
    let mut indicators: BTreeSet<String> = BTreeSet::new();
    let mut categories: BTreeSet<String> = BTreeSet::new();
    for r in records {
        countries.insert(r.country.clone());
        years.insert(r.year);
        indicators.insert(r.indicator.clone());
        categories.insert(r.category.clone());
    }
    DatasetSummary {
        total_records: records.len(),
        countries: countries.into_iter().collect(),
        years: years.into_iter().collect(),
        indicators: indicators.into_iter().collect(),
        categories: categories.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn int(x: i64) -> CellValue {
        CellValue::Int(x)
    }

    fn float(x: f64) -> CellValue {
        CellValue::Float(x)
    }

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    fn config() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    fn cleaner() -> NameCleaner {
        NameCleaner::default()
    }

    fn meta_entry(id: &str, sheet: Option<&str>, name: &str, description: &str) -> IndicatorMeta {
        IndicatorMeta {
            id: id.to_string(),
            sheet_key: sheet.map(|s| s.to_string()),
            name: name.to_string(),
            description: description.to_string(),
            unit: "%".to_string(),
            category: "Foundational Capabilities".to_string(),
            subcategory: "Enabling Infrastructure - Energy".to_string(),
            layer: "Basic".to_string(),
        }
    }

    #[test]
    fn classifier_assigns_roles_by_keyword() {
        let t = table(
            "data",
            &["Country", "Year", "Indicator", "Score", "Notes"],
            vec![vec![
                text("Albania"),
                int(2020),
                text("Energy availability"),
                float(1.5),
                text("ok"),
            ]],
        );
        let roles = classify_columns(&t, &config());
        assert_eq!(roles.country, Some(0));
        assert_eq!(roles.year, Some(1));
        assert_eq!(roles.indicator, Some(2));
        assert_eq!(roles.values, vec![3]);
        assert_eq!(roles.metadata, vec![4]);
        assert_eq!(roles.role_of(3), ColumnRole::Value);
    }

    #[test]
    fn classifier_first_match_claims_single_roles() {
        // Both headers contain a country keyword; only the first one gets
        // the role, the second falls through to metadata.
        let t = table(
            "data",
            &["Country", "Country Code"],
            vec![vec![text("Serbia"), text("SRB")]],
        );
        let roles = classify_columns(&t, &config());
        assert_eq!(roles.country, Some(0));
        assert_eq!(roles.metadata, vec![1]);
    }

    #[test]
    fn classifier_year_named_numeric_columns_are_values() {
        let t = table(
            "1",
            &["Country", "2020", "2021"],
            vec![vec![text("Albania"), float(10.5), float(11.0)]],
        );
        let roles = classify_columns(&t, &config());
        assert_eq!(roles.country, Some(0));
        assert_eq!(roles.year, None);
        assert_eq!(roles.values, vec![1, 2]);
    }

    #[test]
    fn classifier_placeholder_numeric_columns_are_metadata() {
        let t = table(
            "data",
            &["Country", "Unnamed: 3", ""],
            vec![vec![text("Albania"), float(4.0), float(5.0)]],
        );
        let roles = classify_columns(&t, &config());
        assert!(roles.values.is_empty());
        assert_eq!(roles.metadata, vec![1, 2]);
    }

    #[test]
    fn classifier_rejects_out_of_range_numeral_headers() {
        let t = table(
            "data",
            &["Country", "1800", "2020"],
            vec![vec![text("Albania"), float(1.0), float(2.0)]],
        );
        let roles = classify_columns(&t, &config());
        assert_eq!(roles.values, vec![2]);
        assert_eq!(roles.metadata, vec![1]);
    }

    #[test]
    fn data_column_predicate() {
        let c = config();
        assert!(is_data_column("2020", &c));
        assert!(is_data_column("20152022", &c));
        assert!(!is_data_column("economy", &c));
        assert!(!is_data_column("Region", &c));
        assert!(!is_data_column("Unnamed: 5", &c));
        assert!(!is_data_column("", &c));
        assert!(!is_data_column("1899", &c));
        assert!(!is_data_column("notayear", &c));
    }

    #[test]
    fn header_year_extraction() {
        let c = config();
        assert_eq!(header_year("2020", &c), Some(2020));
        assert_eq!(header_year("20152022", &c), Some(2015));
        assert_eq!(header_year(" 2020 ", &c), Some(2020));
        assert_eq!(header_year("202", &c), None);
        assert_eq!(header_year("20156", &c), None);
        assert_eq!(header_year("2051", &c), None);
    }

    #[test]
    fn year_coercion_is_idempotent_across_hosts() {
        assert_eq!(coerce_year(&int(2020)), Some(2020));
        assert_eq!(coerce_year(&float(2020.0)), Some(2020));
        assert_eq!(coerce_year(&text("2020")), Some(2020));
        assert_eq!(coerce_year(&float(2020.5)), None);
        assert_eq!(coerce_year(&text("2020.0")), None);
        assert_eq!(coerce_year(&CellValue::Empty), None);
    }

    #[test]
    fn value_coercion_treats_markers_as_missing() {
        assert_eq!(coerce_value(&text("..")), None);
        assert_eq!(coerce_value(&text("")), None);
        assert_eq!(coerce_value(&text("   ")), None);
        assert_eq!(coerce_value(&float(f64::NAN)), None);
        assert_eq!(coerce_value(&CellValue::Empty), None);
        assert_eq!(coerce_value(&int(3)), Some(3.0));
        assert_eq!(coerce_value(&float(2.25)), Some(2.25));
        assert_eq!(coerce_value(&text("3.5")), Some(3.5));
        assert_eq!(coerce_value(&text("n/a")), None);
    }

    #[test]
    fn name_cleaning_strips_prefixes_and_restores_acronyms() {
        let c = cleaner();
        assert_eq!(
            clean_indicator_name("13_innovation_patents", &c),
            "Innovation Patents"
        );
        assert_eq!(clean_indicator_name("11_gerd_gdp", &c), "GERD GDP");
        assert_eq!(
            clean_indicator_name("GFCF_share_of_gdp", &c),
            "GFCF Share Of GDP"
        );
        assert_eq!(clean_indicator_name("2020", &c), "2020");
        assert_eq!(clean_indicator_name("stem_graduates", &c), "STEM Graduates");
    }

    #[test]
    fn year_named_columns_each_emit_a_record() {
        let t = table(
            "1",
            &["Country", "2020", "2021"],
            vec![vec![text("Albania"), float(10.5), float(11.0)]],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        assert_eq!(n.records.len(), 2);
        assert_eq!(n.records[0].indicator, "2020");
        assert_eq!(n.records[0].country, "Albania");
        assert_eq!(n.records[0].year, 2020);
        assert_eq!(n.records[0].value, 10.5);
        assert_eq!(n.records[1].indicator, "2021");
        assert_eq!(n.records[1].year, 2021);
        assert_eq!(n.records[1].value, 11.0);
        assert_eq!(n.skipped, 0);
    }

    #[test]
    fn indicator_column_emits_one_record_per_row() {
        let t = table(
            "sheet",
            &["Country", "Indicator", "2020"],
            vec![vec![
                text("Serbia"),
                text("Energy availability"),
                int(2500),
            ]],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        assert_eq!(n.records.len(), 1);
        let r = &n.records[0];
        assert_eq!(r.indicator, "Energy availability");
        assert_eq!(r.country, "Serbia");
        assert_eq!(r.year, 2020);
        assert_eq!(r.value, 2500.0);
        assert_eq!(r.category, UNKNOWN);
    }

    #[test]
    fn missing_indicator_cell_falls_back_to_sheet_name() {
        let t = table(
            "5",
            &["Country", "Indicator", "2020"],
            vec![vec![text("Kosovo"), CellValue::Empty, float(3.25)]],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        assert_eq!(n.records.len(), 1);
        assert_eq!(n.records[0].indicator, "5");
    }

    #[test]
    fn placeholder_values_skip_the_cell_only() {
        let t = table(
            "1",
            &["Country", "2020", "2021"],
            vec![
                vec![text("Albania"), text(".."), float(11.0)],
                vec![text("Serbia"), float(9.5), text("")],
            ],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        assert_eq!(n.records.len(), 2);
        assert_eq!(n.skipped, 2);
        assert_eq!(n.records[0].country, "Albania");
        assert_eq!(n.records[0].year, 2021);
        assert_eq!(n.records[1].country, "Serbia");
        assert_eq!(n.records[1].year, 2020);
    }

    #[test]
    fn missing_country_cell_skips_the_row() {
        let t = table(
            "1",
            &["Country", "2020"],
            vec![
                vec![text(".."), float(1.0)],
                vec![CellValue::Empty, float(2.0)],
                vec![text("Montenegro"), float(3.0)],
            ],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        assert_eq!(n.records.len(), 1);
        assert_eq!(n.records[0].country, "Montenegro");
        assert_eq!(n.skipped, 2);
    }

    #[test]
    fn absent_country_column_reports_unknown() {
        let t = table(
            "data",
            &["Year", "Score"],
            vec![vec![int(2019), float(7.5)]],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        assert_eq!(n.records.len(), 1);
        assert_eq!(n.records[0].country, UNKNOWN);
        assert_eq!(n.records[0].year, 2019);
    }

    #[test]
    fn year_column_cells_win_over_headers() {
        let t = table(
            "data",
            &["Country", "Year", "gdp_per_capita"],
            vec![
                vec![text("Albania"), float(2018.0), float(5200.0)],
                vec![text("Albania"), float(2018.5), float(5300.0)],
                vec![text("Albania"), text("bad"), float(5400.0)],
            ],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        assert_eq!(n.records.len(), 1);
        assert_eq!(n.records[0].year, 2018);
        assert_eq!(n.records[0].indicator, "GDP Per Capita");
        assert_eq!(n.skipped, 2);
    }

    #[test]
    fn lookup_prefers_sheet_key_then_id_then_name() {
        let table = MetaTable::new(vec![
            meta_entry("energy_reliability", None, "Energy reliability", "outages"),
            meta_entry(
                "energy_availability",
                Some("1"),
                "Energy availability",
                "Electricity consumption per capita",
            ),
        ]);
        // Sheet mapping wins even though the first entry also matches by name.
        let by_sheet = lookup_meta(&table, "1", "Energy reliability", "Energy reliability");
        assert_eq!(by_sheet.unwrap().id, "energy_availability");
        // Id substring beats name matching of later entries.
        let by_id = lookup_meta(&table, "data", "x_energy_reliability_y", "ignored");
        assert_eq!(by_id.unwrap().id, "energy_reliability");
        // Description tier.
        let by_desc = lookup_meta(
            &table,
            "data",
            "Electricity consumption per capita, kWh",
            "",
        );
        assert_eq!(by_desc.unwrap().id, "energy_availability");
        // No lexical overlap at all.
        assert!(lookup_meta(&table, "data", "Road density", "Road Density").is_none());
    }

    #[test]
    fn lookup_is_deterministic() {
        let table = MetaTable::new(vec![
            meta_entry("bb_subs", None, "Broadband", "subscriptions"),
            meta_entry("bb_subs_100", None, "Broadband access", "subscriptions per 100"),
        ]);
        let first = lookup_meta(&table, "s", "Broadband access", "Broadband Access");
        let second = lookup_meta(&table, "s", "Broadband access", "Broadband Access");
        assert_eq!(first.unwrap().id, "bb_subs");
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn merge_attaches_metadata_fields() {
        let meta = MetaTable::new(vec![meta_entry(
            "energy_availability",
            Some("1"),
            "Energy availability",
            "Electricity consumption per capita",
        )]);
        let t = table(
            "1",
            &["Country", "2020"],
            vec![vec![text("Albania"), float(2400.0)]],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &meta).unwrap();
        assert_eq!(n.records[0].category, "Foundational Capabilities");
        assert_eq!(n.records[0].unit, "%");
        assert_eq!(n.records[0].layer, "Basic");
        assert_eq!(n.records[0].sheet_source, "1");
    }

    #[test]
    fn summary_is_sorted_and_unique() {
        let t = table(
            "1",
            &["Country", "2021", "2020"],
            vec![
                vec![text("Serbia"), float(1.0), float(2.0)],
                vec![text("Albania"), float(3.0), float(4.0)],
            ],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        let s = summarize(&n.records);
        assert_eq!(s.total_records, 4);
        assert_eq!(s.countries, vec!["Albania", "Serbia"]);
        assert_eq!(s.years, vec![2020, 2021]);
        assert_eq!(s.indicators, vec!["2020", "2021"]);
        assert_eq!(s.categories, vec![UNKNOWN]);
    }

    #[test]
    fn empty_table_is_an_error() {
        let t = table("1", &["Country", "2020"], vec![]);
        let res = normalize_table(&t, &config(), &cleaner(), &MetaTable::default());
        assert_eq!(res, Err(NormalizeErrors::EmptyTable));
    }

    #[test]
    fn short_rows_are_padded() {
        let t = table(
            "1",
            &["Country", "2020", "2021"],
            vec![vec![text("Albania"), float(1.5)]],
        );
        let n = normalize_table(&t, &config(), &cleaner(), &MetaTable::default()).unwrap();
        assert_eq!(n.records.len(), 1);
        assert_eq!(n.records[0].year, 2020);
    }
}
