//! # duke-cells-xlsx
//!
//! The cell entity of an OOXML worksheet and its `<c>` fragment codec.
//!
//! A [`Cell`] is parsed once from a `<c>` node, mutated through its API and
//! re-serialized on demand. Everything it needs from the surrounding document
//! (shared strings, styles, the owning sheet) comes in through the traits in
//! [`context`]; [`memory`] provides in-memory implementations of them.
//!
//! ## Example
//!
//! ```rust
//! use duke_cells_xlsx::memory::MemoryWorkbook;
//! use duke_cells_xlsx::{read_element, write_element, Cell};
//!
//! let mut workbook = MemoryWorkbook::new();
//! let node = read_element(r#"<c r="C7" t="b"><v>1</v></c>"#).unwrap();
//! let mut cell = Cell::from_node(7, &node, &workbook).unwrap();
//!
//! cell.set_formula(Some("A1*2"));
//! let xml = write_element(&cell.to_node(&mut workbook)).unwrap();
//! assert_eq!(xml, r#"<c r="C7"><f>A1*2</f></c>"#);
//! ```

pub mod cell;
pub mod codec;
pub mod context;
pub mod error;
pub mod memory;
pub mod xml;

pub use cell::Cell;
pub use context::{
    CellStyle, ErrorResolver, SharedStringItem, SharedStrings, Sheet, SheetRequest,
    StandardErrorResolver, StyleSheet, StyleValue, Workbook,
};
pub use error::{XlsxError, XlsxResult};
pub use xml::{read_element, write_element};
