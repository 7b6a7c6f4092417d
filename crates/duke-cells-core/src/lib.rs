//! # duke-cells-core
//!
//! Core data structures for the duke-cells document model.
//!
//! This crate provides the pieces a spreadsheet cell is made of:
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing with anchoring
//! - [`CellValue`] - The closed set of values a cell can hold
//! - [`FormulaState`] - Formula text, kind and shared-formula linkage
//! - [`XmlElement`] - The opaque node model used for rich text and
//!   round-tripping unknown XML
//!
//! ## Example
//!
//! ```rust
//! use duke_cells_core::{AddressOptions, CellAddress};
//!
//! let addr = CellAddress::parse("C7").unwrap();
//! assert_eq!((addr.row, addr.column), (7, 3));
//!
//! let text = addr.format(&AddressOptions::new().anchored(true), None);
//! assert_eq!(text, "$C$7");
//! ```

pub mod cell;
pub mod error;
pub mod node;

// Re-exports for convenience
pub use cell::{
    column_name_to_number, column_number_to_name, date_to_serial, find_in, format_address,
    replace_in, serial_to_date, AddressOptions, CellAddress, CellError, CellRange, CellValue,
    FindMatch, FindPattern, FormulaKind, FormulaState, Replacement, RichText,
    SHARED_FORMULA_MARKER,
};
pub use error::{Error, Result};
pub use node::{XmlElement, XmlNode};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
