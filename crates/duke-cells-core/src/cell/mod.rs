//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "C7", "'Sheet'!$C$7")
//! - [`CellRange`] - A range of cells (e.g., "A1:C1")
//! - [`CellValue`] - The value stored in a cell
//! - [`FormulaState`] - A cell's formula and shared-formula linkage
//! - [`FindPattern`] - Search/replace over a cell's text

mod address;
mod date;
mod find;
mod formula;
mod value;

pub use address::{
    column_name_to_number, column_number_to_name, format_address, AddressOptions, CellAddress,
    CellRange,
};
pub use date::{date_to_serial, serial_to_date};
pub use find::{find_in, replace_in, FindMatch, FindPattern, Replacement};
pub use formula::{FormulaKind, FormulaState, SHARED_FORMULA_MARKER};
pub use value::{CellError, CellValue, RichText};
