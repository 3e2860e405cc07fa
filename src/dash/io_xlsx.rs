// Conversion from calamine worksheets to the normalizer's table model.

use std::fs::File;
use std::io::BufReader;

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::debug;
use snafu::{OptionExt, ResultExt};

use indicator_normalizer::{float_label, CellValue, Table};

use crate::dash::{
    BDashResult, MissingSheetSnafu, OpeningExcelSnafu, ReadingSheetSnafu,
};

pub type XlsxFile = Xlsx<BufReader<File>>;

pub fn open(path: String) -> BDashResult<XlsxFile> {
    let workbook: XlsxFile =
        open_workbook(path.clone()).context(OpeningExcelSnafu { path })?;
    Ok(workbook)
}

pub fn sheet_names(workbook: &XlsxFile) -> Vec<String> {
    workbook.sheet_names().to_vec()
}

pub fn read_sheet(workbook: &mut XlsxFile, name: &str) -> BDashResult<Table> {
    let wrange = workbook
        .worksheet_range(name)
        .context(MissingSheetSnafu { sheet: name })?
        .context(ReadingSheetSnafu { sheet: name })?;
    debug!(
        "read_sheet: {}: {} x {}",
        name,
        wrange.height(),
        wrange.width()
    );
    Ok(table_from_range(name, &wrange))
}

/// The first row of the range is the header; everything below is data.
pub fn table_from_range(name: &str, range: &Range<DataType>) -> Table {
    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(cells) => cells.iter().map(header_label).collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<CellValue>> = rows_iter
        .map(|r| r.iter().map(cell_value).collect())
        .collect();
    Table::new(name.to_string(), columns, rows)
}

pub fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Int(i) => CellValue::Int(*i),
        DataType::Float(f) => CellValue::Float(*f),
        DataType::DateTime(f) => CellValue::Float(*f),
        DataType::Bool(b) => CellValue::Text(b.to_string()),
        DataType::Empty => CellValue::Empty,
        // Error cells carry no usable observation.
        _ => CellValue::Empty,
    }
}

/// Column headers come out of the reader with heterogeneous types; year
/// headers in particular are floats ("2020.0") that must not keep the
/// trailing fraction.
pub fn header_label(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => float_label(*f),
        DataType::DateTime(f) => float_label(*f),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
