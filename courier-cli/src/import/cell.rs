//! Normalized spreadsheet cell values

use calamine::Data;

/// A cell as the extractor sees it; blank and error cells collapse to `Empty`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Render as text (header labels, subject names)
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", *f as i64))
                } else {
                    Some(f.to_string())
                }
            }
            CellValue::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) if s.trim().is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.trim().to_string()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            // date-formatted cells keep their serial, the normalizer converts
            Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) => CellValue::Empty,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.trim().to_string())
        }
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_calamine() {
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
        assert_eq!(CellValue::from(&Data::String("  ".to_string())), CellValue::Empty);
        assert_eq!(
            CellValue::from(&Data::String(" 张三 ".to_string())),
            CellValue::Text("张三".to_string())
        );
        assert_eq!(CellValue::from(&Data::Float(45627.0)), CellValue::Float(45627.0));
        assert_eq!(CellValue::from(&Data::Int(3)), CellValue::Int(3));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(CellValue::Float(1001.0).as_text().as_deref(), Some("1001"));
        assert_eq!(CellValue::Float(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(CellValue::Empty.as_text(), None);
    }
}
