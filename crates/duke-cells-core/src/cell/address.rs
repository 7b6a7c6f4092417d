//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// `['sheet'!]$C$7`, sheet names may be bare or single-quoted with doubled quotes.
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:'((?:[^']|'')+)'!|([^'!\s]+)!)?(\$)?([A-Z]+)(\$)?([0-9]+)$")
        .expect("address pattern is valid")
});

/// Formatting options for [`CellAddress::format`] and [`format_address`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressOptions {
    /// Prefix the row with `$`
    pub row_anchored: bool,
    /// Prefix the column with `$`
    pub column_anchored: bool,
    /// Shortcut for both row and column anchoring
    pub anchored: bool,
    /// Prefix the address with `'<sheet name>'!`
    pub include_sheet_name: bool,
}

impl AddressOptions {
    /// Options producing a plain relative address ("C7")
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_anchored(mut self, value: bool) -> Self {
        self.row_anchored = value;
        self
    }

    pub fn column_anchored(mut self, value: bool) -> Self {
        self.column_anchored = value;
        self
    }

    pub fn anchored(mut self, value: bool) -> Self {
        self.anchored = value;
        self
    }

    pub fn include_sheet_name(mut self, value: bool) -> Self {
        self.include_sheet_name = value;
        self
    }
}

/// A cell address (e.g., "C7", "$C$7")
///
/// Row and column numbers are 1-based, matching the numbers shown in the
/// spreadsheet UI: `C7` is row 7, column 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based, A=1, B=2, ..., XFD=16384)
    pub column: u32,
    /// Whether the row reference is anchored ($)
    pub row_anchored: bool,
    /// Whether the column reference is anchored ($)
    pub column_anchored: bool,
}

impl CellAddress {
    /// Create a new relative cell address
    pub fn new(row: u32, column: u32) -> Self {
        Self {
            row,
            column,
            row_anchored: false,
            column_anchored: false,
        }
    }

    /// Create a fully anchored cell address ($A$1 style)
    pub fn anchored(row: u32, column: u32) -> Self {
        Self {
            row,
            column,
            row_anchored: true,
            column_anchored: true,
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// A sheet qualifier (`'Sheet 1'!A1` or `Sheet1!A1`) is accepted and
    /// discarded; use [`CellAddress::parse_qualified`] to keep it.
    ///
    /// # Examples
    /// ```
    /// use duke_cells_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.row, 2);
    /// assert_eq!(addr.column, 2);
    /// assert!(addr.row_anchored);
    /// assert!(addr.column_anchored);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_qualified(s).map(|(_, addr)| addr)
    }

    /// Parse an address that may carry a sheet name, returning the unquoted name
    pub fn parse_qualified(s: &str) -> Result<(Option<String>, Self)> {
        let caps = ADDRESS_RE
            .captures(s)
            .ok_or_else(|| Error::MalformedAddress(s.to_string()))?;

        let sheet = match (caps.get(1), caps.get(2)) {
            (Some(quoted), _) => Some(quoted.as_str().replace("''", "'")),
            (None, Some(bare)) => Some(bare.as_str().to_string()),
            (None, None) => None,
        };

        let column = column_name_to_number(&caps[4])?;

        let row: u64 = caps[6]
            .parse()
            .map_err(|_| Error::RowOutOfBounds(u32::MAX, MAX_ROWS))?;
        if row == 0 {
            return Err(Error::MalformedAddress(s.to_string()));
        }
        if row > MAX_ROWS as u64 {
            return Err(Error::RowOutOfBounds(
                u32::try_from(row).unwrap_or(u32::MAX),
                MAX_ROWS,
            ));
        }

        Ok((
            sheet,
            Self {
                row: row as u32,
                column,
                row_anchored: caps.get(5).is_some(),
                column_anchored: caps.get(3).is_some(),
            },
        ))
    }

    /// Column letters of this address ("C" for C7)
    pub fn column_name(&self) -> String {
        column_number_to_name(self.column)
    }

    /// Format with explicit options; anchoring set on the address itself is kept
    pub fn format(&self, options: &AddressOptions, sheet_name: Option<&str>) -> String {
        let options = AddressOptions {
            row_anchored: options.row_anchored || self.row_anchored,
            column_anchored: options.column_anchored || self.column_anchored,
            ..*options
        };
        format_address(self.row, self.column, &options, sheet_name)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        self.format(&AddressOptions::default(), None)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Format a row/column pair as an address
///
/// The sheet name is only used when `include_sheet_name` is set; it is always
/// single-quoted, with embedded quotes doubled.
pub fn format_address(
    row: u32,
    column: u32,
    options: &AddressOptions,
    sheet_name: Option<&str>,
) -> String {
    let mut result = String::new();

    if options.include_sheet_name {
        if let Some(name) = sheet_name {
            result.push('\'');
            result.push_str(&name.replace('\'', "''"));
            result.push_str("'!");
        }
    }

    if options.column_anchored || options.anchored {
        result.push('$');
    }
    result.push_str(&column_number_to_name(column));

    if options.row_anchored || options.anchored {
        result.push('$');
    }
    result.push_str(&row.to_string());

    result
}

/// Convert a column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
///
/// Column 0 has no name and yields an empty string.
pub fn column_number_to_name(column: u32) -> String {
    let mut result = Vec::new();
    let mut n = column;

    while n > 0 {
        n -= 1;
        result.push((n % 26) as u8 + b'A');
        n /= 26;
    }

    result.iter().rev().map(|&b| b as char).collect()
}

/// Convert column letters to a number (A = 1, Z = 26, AA = 27, etc.)
pub fn column_name_to_number(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::MalformedAddress("empty column letters".into()));
    }

    let mut column: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::MalformedAddress(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        column = column * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        if column > MAX_COLS as u64 {
            return Err(Error::ColumnOutOfBounds(
                u32::try_from(column).unwrap_or(u32::MAX),
                MAX_COLS,
            ));
        }
    }

    Ok(column as u32)
}

/// A range of cells (e.g., "A1:C1")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalized so start is top-left
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        let (start_row, end_row) = if start.row <= end.row {
            (start.row, end.row)
        } else {
            (end.row, start.row)
        };

        let (start_col, end_col) = if start.column <= end.column {
            (start.column, end.column)
        } else {
            (end.column, start.column)
        };

        Self {
            start: CellAddress {
                row: start_row,
                column: start_col,
                ..start
            },
            end: CellAddress {
                row: end_row,
                column: end_col,
                ..end
            },
        }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:C1 notation (a lone address is a single-cell range)
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = |_| Error::InvalidRange(s.to_string());

        match s.split_once(':') {
            Some((start, end)) => {
                let start = CellAddress::parse(start).map_err(invalid)?;
                let end = CellAddress::parse(end).map_err(invalid)?;
                Ok(Self::new(start, end))
            }
            None => CellAddress::parse(s).map(Self::single).map_err(invalid),
        }
    }

    /// Check if a row/column pair is within this range
    pub fn contains(&self, row: u32, column: u32) -> bool {
        row >= self.start.row
            && row <= self.end.row
            && column >= self.start.column
            && column <= self.end.column
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn column_count(&self) -> u32 {
        self.end.column - self.start.column + 1
    }

    /// Format as A1:C1 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
