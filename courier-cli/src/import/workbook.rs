//! Load raw workbook bytes into addressable sheets

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;

use super::cell::CellValue;
use super::error::ImportError;

/// One worksheet as an absolute grid: `rows[r][c]` is the cell at row `r`,
/// column `c` (0-based, A1 = `(0, 0)`), regardless of where the populated
/// range starts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    fn from_range(name: &str, range: &Range<Data>) -> Self {
        let (Some((start_row, start_col)), Some((end_row, end_col))) = (range.start(), range.end())
        else {
            return Self::from_rows(name, Vec::new());
        };

        let height = end_row as usize + 1;
        let width = end_col as usize + 1;
        let mut rows = vec![vec![CellValue::Empty; width]; height];

        for (r, c, cell) in range.cells() {
            let (row, col) = (start_row as usize + r, start_col as usize + c);
            if let Some(slot) = rows.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *slot = CellValue::from(cell);
            }
        }

        Self::from_rows(name, rows)
    }

    /// Non-empty cell at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .filter(|cell| !cell.is_empty())
    }

    /// Number of rows up to the last populated one
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns up to the widest populated one
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|cells| cells.iter().all(CellValue::is_empty))
    }
}

/// Open xlsx/xls/ods bytes and read every sheet in workbook order
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<Sheet>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::Workbook(format!("sheet '{}': {}", sheet_name, e)))?;
        sheets.push(Sheet::from_range(&sheet_name, &range));
    }

    Ok(sheets)
}
