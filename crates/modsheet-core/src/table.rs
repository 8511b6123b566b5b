//! Cell and sheet types shared by the exporter and the fuser

/// Cell content denoting "no explicit entry", distinct from a stored zero.
///
/// A single space rather than an empty string, so spreadsheet editors
/// that trim or normalize truly-empty cells cannot collapse it.
pub const PLACEHOLDER: &str = " ";

/// A spreadsheet cell with loose typing
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// Text value
    Text(String),
    /// Empty or whitespace-only cell
    Blank,
}

impl CellValue {
    /// Parse a raw cell into a CellValue, detecting the type
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Blank;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }

        CellValue::Text(trimmed.to_string())
    }

    /// Check if the cell is blank
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Numeric reading of the cell, if it has one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Coerce the cell to an integer.
    ///
    /// Placeholders, empty cells and non-numeric text all coerce to 0;
    /// this leniency for hand-edited spreadsheets is deliberate. Both
    /// the general and auxiliary fuse paths use this one rule.
    pub fn coerce_int(&self) -> i64 {
        self.as_int().unwrap_or(0)
    }

    /// Render the cell for CSV output
    pub fn to_string_value(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Blank => String::new(),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Blank => Ok(()),
        }
    }
}

/// A flat tabular view: a header row plus one data row per module
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Column names, in schema order
    pub header: Vec<String>,
    /// Data rows, padded to the header width
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a sheet with the given header and no rows
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}
