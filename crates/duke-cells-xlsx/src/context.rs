//! What a cell needs from the document around it
//!
//! A cell holds no references to its row, sheet or workbook. Operations that
//! need those collaborators take them as arguments, and notifications for the
//! owning sheet are queued as [`SheetRequest`]s for the owner to drain.

use std::fmt;

use duke_cells_core::{CellAddress, CellError, CellRange, RichText};

/// An entry of the shared-string table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SharedStringItem {
    /// Plain text (`<si><t>..</t></si>`)
    Text(String),
    /// Formatted runs (`<si><r>..</r>..</si>`)
    Rich(RichText),
}

/// The workbook's shared-string table
pub trait SharedStrings {
    /// Index of `item`, interning it if it is not in the table yet
    fn index_for(&mut self, item: &SharedStringItem) -> u32;

    /// Item stored at `index`
    fn get(&self, index: u32) -> Option<&SharedStringItem>;
}

/// A style property value
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Bool(b)
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Number(n as f64)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Text(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Text(s)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Bool(b) => write!(f, "{}", b),
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A live, mutable style owned by one cell
pub trait CellStyle {
    /// Style index written to the cell's `s` attribute
    fn id(&self) -> u32;

    fn get(&self, name: &str) -> Option<StyleValue>;

    fn set(&mut self, name: &str, value: StyleValue);
}

/// Creates live styles for cells
pub trait StyleSheet {
    /// Create a new style, copying the properties of `base` when given
    fn create_style(&mut self, base: Option<u32>) -> Box<dyn CellStyle>;
}

/// Maps error codes found in cell XML to error values
pub trait ErrorResolver {
    fn resolve(&self, code: &str) -> CellError;
}

/// Resolves the standard Excel error codes; anything else is kept opaque so
/// it is written back unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardErrorResolver;

impl ErrorResolver for StandardErrorResolver {
    fn resolve(&self, code: &str) -> CellError {
        CellError::from_code(code.trim()).unwrap_or_else(|| {
            log::warn!("Unknown error code '{}', keeping it as written", code);
            CellError::Other(code.to_string())
        })
    }
}

/// Workbook-level services used when reading, writing and styling cells
pub trait Workbook {
    fn shared_strings(&self) -> &dyn SharedStrings;

    fn shared_strings_mut(&mut self) -> &mut dyn SharedStrings;

    fn style_sheet(&mut self) -> &mut dyn StyleSheet;

    fn error_resolver(&self) -> &dyn ErrorResolver;
}

/// Sheet-level services a cell delegates to
///
/// The associated types are whatever handles the sheet hands out for cells,
/// ranges and columns.
pub trait Sheet {
    type CellRef;
    type Range;
    type Column;

    fn name(&self) -> &str;

    fn active_cell(&self) -> Option<CellAddress>;

    fn set_active_cell(&mut self, address: CellAddress);

    /// The cell at 1-based `row`/`column`; coordinates may be out of bounds
    /// and it is up to the sheet to reject them
    fn cell(&mut self, row: i64, column: i64) -> Self::CellRef;

    fn range(&mut self, range: CellRange) -> Self::Range;

    fn column(&mut self, column: u32) -> Self::Column;

    /// Hyperlink target attached to the cell at `address` (A1 form)
    fn hyperlink(&self, address: &str) -> Option<String>;

    fn set_hyperlink(&mut self, address: &str, target: Option<String>);

    /// Note that shared-formula id `id` is in use
    fn update_max_shared_formula_id(&mut self, id: u32);

    /// Clear every cell that belongs to shared-formula group `id`
    fn clear_cells_using_shared_formula(&mut self, id: u32);
}

/// A notification from a cell to its owning sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetRequest {
    /// A shared-formula id was read or assigned
    UpdateMaxSharedFormulaId(u32),
    /// The master of a shared-formula group was cleared
    ReleaseSharedFormula(u32),
}

impl SheetRequest {
    /// Deliver this request to `sheet`
    pub fn apply<S: Sheet + ?Sized>(self, sheet: &mut S) {
        log::trace!("Applying {:?} to sheet '{}'", self, sheet.name());
        match self {
            SheetRequest::UpdateMaxSharedFormulaId(id) => sheet.update_max_shared_formula_id(id),
            SheetRequest::ReleaseSharedFormula(id) => sheet.clear_cells_using_shared_formula(id),
        }
    }
}
