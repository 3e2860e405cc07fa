pub use crate::config::*;

use crate::{normalize_table, summarize, TableNormalization};

/// A builder that accumulates normalized records across the sheets of a
/// workbook, in sheet order then row order.
///
/// A table that fails to normalize leaves the already accumulated records
/// untouched, so callers can log the failure and move on to the next sheet.
///
/// ```
/// pub use indicator_normalizer::Builder;
/// pub use indicator_normalizer::{CellValue, ClassifierConfig, Table};
/// # use indicator_normalizer::NormalizeErrors;
///
/// let mut builder = Builder::new(&ClassifierConfig::default())?;
///
/// let table = Table::new(
///     "1".to_string(),
///     vec!["Country".to_string(), "2020".to_string()],
///     vec![vec![
///         CellValue::Text("Albania".to_string()),
///         CellValue::Float(10.5),
///     ]],
/// );
/// builder.add_table(&table)?;
/// assert_eq!(builder.records().len(), 1);
///
/// # Ok::<(), NormalizeErrors>(())
/// ```
pub struct Builder {
    pub(crate) _config: ClassifierConfig,
    pub(crate) _cleaner: NameCleaner,
    pub(crate) _meta: MetaTable,
    pub(crate) _records: Vec<IndicatorRecord>,
    pub(crate) _skipped: usize,
}

impl Builder {
    pub fn new(config: &ClassifierConfig) -> Result<Builder, NormalizeErrors> {
        Ok(Builder {
            _config: config.clone(),
            _cleaner: NameCleaner::default(),
            _meta: MetaTable::default(),
            _records: Vec::new(),
            _skipped: 0,
        })
    }

    pub fn cleaner(self, cleaner: &NameCleaner) -> Result<Builder, NormalizeErrors> {
        Ok(Builder {
            _cleaner: cleaner.clone(),
            ..self
        })
    }

    pub fn meta_table(self, meta: &MetaTable) -> Result<Builder, NormalizeErrors> {
        Ok(Builder {
            _meta: meta.clone(),
            ..self
        })
    }

    /// Normalizes one table and appends its records.
    pub fn add_table(&mut self, table: &Table) -> Result<TableStats, NormalizeErrors> {
        let TableNormalization {
            records, skipped, ..
        } = normalize_table(table, &self._config, &self._cleaner, &self._meta)?;
        let stats = TableStats {
            records: records.len(),
            skipped,
        };
        self._records.extend(records);
        self._skipped += skipped;
        Ok(stats)
    }

    pub fn records(&self) -> &[IndicatorRecord] {
        &self._records
    }

    pub fn skipped(&self) -> usize {
        self._skipped
    }

    pub fn summary(&self) -> DatasetSummary {
        summarize(&self._records)
    }
}
