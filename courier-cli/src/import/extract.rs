//! Sheet extraction
//!
//! Sheet layout shared by both import kinds:
//! - A1: employee name (the subject)
//! - row 2: column headers
//! - row 3 onwards: one data row per date, up to the last populated row

use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use super::cell::CellValue;
use super::error::ImportError;
use super::workbook::Sheet;

/// Row holding the header labels (second row)
const HEADER_ROW: usize = 1;
/// First data row (third row)
const FIRST_DATA_ROW: usize = 2;

/// How data columns are identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Columns are addressed by header label. A label repeated later in
    /// the header row is renamed to `delivery_prefix + label`: monthly
    /// statements reuse "count/weight/share" labels for the delivery half.
    Named { delivery_prefix: String },
    /// Columns are addressed by index; header labels are ignored
    Positional,
}

/// One data row, cells indexed by column
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 0-based sheet row the data came from
    pub sheet_row: usize,
    pub cells: Vec<CellValue>,
}

impl RawRow {
    /// Non-empty cell at a column
    pub fn cell(&self, col: usize) -> Option<&CellValue> {
        self.cells.get(col).filter(|c| !c.is_empty())
    }
}

/// Output of extracting one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSheet {
    pub sheet_name: String,
    pub subject: String,
    /// Resolved label per column; `None` for blank or dropped headers
    pub headers: Vec<Option<String>>,
    pub rows: Vec<RawRow>,
}

impl ExtractedSheet {
    /// Label → column index for the resolved headers
    pub fn header_index(&self) -> HashMap<&str, usize> {
        self.headers
            .iter()
            .enumerate()
            .filter_map(|(col, label)| label.as_deref().map(|l| (l, col)))
            .collect()
    }
}

/// Read the subject from A1
fn read_subject(sheet: &Sheet) -> Result<String, ImportError> {
    sheet
        .get(0, 0)
        .and_then(CellValue::as_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ImportError::MissingSubject {
            sheet: sheet.name.clone(),
        })
}

/// Resolve header labels for the second row
///
/// Under the named layout a repeated label is renamed with the delivery
/// prefix; if that name is taken too the column is dropped.
fn resolve_headers(sheet: &Sheet, layout: &ColumnLayout) -> Vec<Option<String>> {
    let width = sheet.width();
    let raw = (0..width).map(|col| {
        sheet
            .get(HEADER_ROW, col)
            .and_then(CellValue::as_text)
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
    });

    let ColumnLayout::Named { delivery_prefix } = layout else {
        return raw.collect();
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(width);
    for (col, label) in raw.enumerate() {
        let resolved = match label {
            None => None,
            Some(label) if !seen.contains(&label) => Some(label),
            Some(label) => {
                let renamed = format!("{}{}", delivery_prefix, label);
                if seen.contains(&renamed) {
                    warn!(
                        "Sheet '{}': header '{}' in column {} repeats again, column ignored",
                        sheet.name, label, col
                    );
                    None
                } else {
                    debug!("Sheet '{}': header '{}' renamed to '{}'", sheet.name, label, renamed);
                    Some(renamed)
                }
            }
        };
        if let Some(label) = &resolved {
            seen.insert(label.clone());
        }
        headers.push(resolved);
    }
    headers
}

/// Extract subject, headers and non-empty data rows from one sheet
pub fn extract_sheet(sheet: &Sheet, layout: &ColumnLayout) -> Result<ExtractedSheet, ImportError> {
    if sheet.is_empty() {
        return Err(ImportError::EmptySheet {
            sheet: sheet.name.clone(),
        });
    }

    let subject = read_subject(sheet)?;
    let headers = resolve_headers(sheet, layout);

    let named = matches!(layout, ColumnLayout::Named { .. });
    if named && headers.iter().all(Option::is_none) {
        return Err(ImportError::MissingHeader {
            sheet: sheet.name.clone(),
        });
    }

    let width = sheet.width();
    let mut rows = Vec::new();
    for row in FIRST_DATA_ROW..sheet.height() {
        let cells: Vec<CellValue> = (0..width)
            .map(|col| sheet.get(row, col).cloned().unwrap_or_default())
            .collect();

        // only columns that carry a header count under the named layout
        let is_empty = cells
            .iter()
            .enumerate()
            .filter(|(col, _)| !named || headers.get(*col).is_some_and(Option::is_some))
            .all(|(_, cell)| cell.is_empty());
        if is_empty {
            continue;
        }

        rows.push(RawRow {
            sheet_row: row,
            cells,
        });
    }

    debug!(
        "Sheet '{}': subject '{}', {} data rows",
        sheet.name,
        subject,
        rows.len()
    );

    Ok(ExtractedSheet {
        sheet_name: sheet.name.clone(),
        subject,
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named() -> ColumnLayout {
        ColumnLayout::Named {
            delivery_prefix: "派件".to_string(),
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::from(s)
    }

    fn sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
        Sheet::from_rows("Sheet1", rows)
    }

    #[test]
    fn test_header_collision_gets_delivery_prefix() {
        let s = sheet(vec![
            vec![text("张三")],
            vec![text("日期"), text("票数"), text("重量"), text("票数"), text("重量")],
            vec![45627.0.into(), 10i64.into(), 2.5.into(), 8i64.into(), 1.5.into()],
        ]);
        let extracted = extract_sheet(&s, &named()).unwrap();

        assert_eq!(
            extracted.headers,
            vec![
                Some("日期".to_string()),
                Some("票数".to_string()),
                Some("重量".to_string()),
                Some("派件票数".to_string()),
                Some("派件重量".to_string()),
            ]
        );

        let index = extracted.header_index();
        let row = &extracted.rows[0];
        assert_eq!(row.cell(index["票数"]), Some(&CellValue::Int(10)));
        assert_eq!(row.cell(index["派件票数"]), Some(&CellValue::Int(8)));
    }

    #[test]
    fn test_third_repeat_is_dropped() {
        let s = sheet(vec![
            vec![text("张三")],
            vec![text("票数"), text("票数"), text("票数")],
            vec![1i64.into(), 2i64.into(), 3i64.into()],
        ]);
        let extracted = extract_sheet(&s, &named()).unwrap();
        assert_eq!(
            extracted.headers,
            vec![Some("票数".to_string()), Some("派件票数".to_string()), None]
        );
    }

    #[test]
    fn test_positional_keeps_repeats() {
        let s = sheet(vec![
            vec![text("李四")],
            vec![text("票数"), text("票数")],
            vec![1i64.into(), 2i64.into()],
        ]);
        let extracted = extract_sheet(&s, &ColumnLayout::Positional).unwrap();
        assert_eq!(
            extracted.headers,
            vec![Some("票数".to_string()), Some("票数".to_string())]
        );
    }

    #[test]
    fn test_empty_rows_are_skipped() {
        let s = sheet(vec![
            vec![text("张三")],
            vec![text("日期"), text("重量")],
            vec![45627.0.into(), 2.5.into()],
            vec![CellValue::Empty, CellValue::Empty],
            vec![45629.0.into(), CellValue::Empty],
        ]);
        let extracted = extract_sheet(&s, &named()).unwrap();

        let rows: Vec<usize> = extracted.rows.iter().map(|r| r.sheet_row).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn test_unheaded_columns_do_not_count_under_named_layout() {
        let s = sheet(vec![
            vec![text("张三")],
            vec![text("日期"), CellValue::Empty],
            vec![CellValue::Empty, text("note")],
        ]);
        let named_rows = extract_sheet(&s, &named()).unwrap().rows;
        assert!(named_rows.is_empty());

        let positional_rows = extract_sheet(&s, &ColumnLayout::Positional).unwrap().rows;
        assert_eq!(positional_rows.len(), 1);
    }

    #[test]
    fn test_missing_subject() {
        let s = sheet(vec![
            vec![CellValue::Empty],
            vec![text("日期")],
            vec![45627.0.into()],
        ]);
        assert_eq!(
            extract_sheet(&s, &named()),
            Err(ImportError::MissingSubject {
                sheet: "Sheet1".to_string()
            })
        );
    }

    #[test]
    fn test_numeric_subject_and_trim() {
        let s = sheet(vec![vec![1001.0.into()], vec![text("日期")]]);
        assert_eq!(extract_sheet(&s, &named()).unwrap().subject, "1001");

        let s = sheet(vec![vec![text("  王五 ")], vec![text("日期")]]);
        assert_eq!(extract_sheet(&s, &named()).unwrap().subject, "王五");
    }

    #[test]
    fn test_empty_sheet_and_missing_header() {
        assert!(matches!(
            extract_sheet(&sheet(Vec::new()), &named()),
            Err(ImportError::EmptySheet { .. })
        ));

        let no_header = sheet(vec![vec![text("张三")], vec![], vec![45627.0.into()]]);
        assert!(matches!(
            extract_sheet(&no_header, &named()),
            Err(ImportError::MissingHeader { .. })
        ));
        assert!(extract_sheet(&no_header, &ColumnLayout::Positional).is_ok());
    }
}
