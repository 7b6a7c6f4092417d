//! In-memory implementations of the collaborator traits
//!
//! [`MemoryWorksheet`] owns its cells in a `(row, column)` map and applies the
//! requests they queue. [`MemoryWorkbook`] bundles a [`SharedStringTable`] and
//! a [`MemoryStyleSheet`] with the standard error resolver.

use std::collections::BTreeMap;

use ahash::AHashMap;

use duke_cells_core::{CellAddress, CellRange, Error, Result, XmlElement, MAX_COLS, MAX_ROWS};

use crate::cell::Cell;
use crate::context::{
    CellStyle, ErrorResolver, SharedStringItem, SharedStrings, Sheet, SheetRequest,
    StandardErrorResolver, StyleSheet, StyleValue, Workbook,
};
use crate::error::{XlsxError, XlsxResult};

/// Shared-string table with deduplication
#[derive(Debug, Clone, Default)]
pub struct SharedStringTable {
    items: Vec<SharedStringItem>,
    index_map: AHashMap<SharedStringItem, u32>,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from existing items, keeping their positions
    pub fn from_items<I: IntoIterator<Item = SharedStringItem>>(items: I) -> Self {
        let mut table = Self::new();
        for item in items {
            let index = table.items.len() as u32;
            table.index_map.entry(item.clone()).or_insert(index);
            table.items.push(item);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in index order
    pub fn items(&self) -> &[SharedStringItem] {
        &self.items
    }
}

impl SharedStrings for SharedStringTable {
    fn index_for(&mut self, item: &SharedStringItem) -> u32 {
        if let Some(&index) = self.index_map.get(item) {
            return index;
        }
        let index = self.items.len() as u32;
        self.items.push(item.clone());
        self.index_map.insert(item.clone(), index);
        index
    }

    fn get(&self, index: u32) -> Option<&SharedStringItem> {
        self.items.get(index as usize)
    }
}

type StyleProperties = AHashMap<String, StyleValue>;

/// Style sheet keeping one property map per style id (id 0 is the default,
/// empty style)
#[derive(Debug, Clone)]
pub struct MemoryStyleSheet {
    styles: Vec<StyleProperties>,
}

impl MemoryStyleSheet {
    pub fn new() -> Self {
        Self {
            styles: vec![StyleProperties::default()],
        }
    }

    /// Add a style with the given properties, returning its id
    pub fn define<I, K>(&mut self, properties: I) -> u32
    where
        I: IntoIterator<Item = (K, StyleValue)>,
        K: Into<String>,
    {
        let id = self.styles.len() as u32;
        self.styles.push(
            properties
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        );
        id
    }

    /// Properties a style had when it was defined or created
    pub fn properties(&self, id: u32) -> Option<&StyleProperties> {
        self.styles.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for MemoryStyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSheet for MemoryStyleSheet {
    fn create_style(&mut self, base: Option<u32>) -> Box<dyn CellStyle> {
        let properties = base
            .and_then(|id| self.properties(id))
            .cloned()
            .unwrap_or_default();
        let id = self.styles.len() as u32;
        self.styles.push(properties.clone());
        Box::new(MemoryStyle { id, properties })
    }
}

/// A live style handed out by [`MemoryStyleSheet`]
#[derive(Debug, Clone)]
pub struct MemoryStyle {
    id: u32,
    properties: StyleProperties,
}

impl CellStyle for MemoryStyle {
    fn id(&self) -> u32 {
        self.id
    }

    fn get(&self, name: &str) -> Option<StyleValue> {
        self.properties.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: StyleValue) {
        self.properties.insert(name.to_string(), value);
    }
}

/// Shared strings, styles and error codes for standalone cells
#[derive(Debug, Default)]
pub struct MemoryWorkbook {
    shared_strings: SharedStringTable,
    style_sheet: MemoryStyleSheet,
    errors: StandardErrorResolver,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workbook over an existing shared-string table
    pub fn with_shared_strings(shared_strings: SharedStringTable) -> Self {
        Self {
            shared_strings,
            ..Self::default()
        }
    }

    pub fn shared_string_table(&self) -> &SharedStringTable {
        &self.shared_strings
    }

    pub fn style_sheet_mut(&mut self) -> &mut MemoryStyleSheet {
        &mut self.style_sheet
    }
}

impl Workbook for MemoryWorkbook {
    fn shared_strings(&self) -> &dyn SharedStrings {
        &self.shared_strings
    }

    fn shared_strings_mut(&mut self) -> &mut dyn SharedStrings {
        &mut self.shared_strings
    }

    fn style_sheet(&mut self) -> &mut dyn StyleSheet {
        &mut self.style_sheet
    }

    fn error_resolver(&self) -> &dyn ErrorResolver {
        &self.errors
    }
}

/// A worksheet that owns its cells
///
/// Mutations go through [`MemoryWorksheet::edit`] (or are followed by
/// [`MemoryWorksheet::flush`]) so that the requests cells queue are applied.
#[derive(Debug)]
pub struct MemoryWorksheet {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
    active_cell: Option<CellAddress>,
    max_shared_formula_id: Option<u32>,
    hyperlinks: AHashMap<String, String>,
}

impl MemoryWorksheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            active_cell: None,
            max_shared_formula_id: None,
            hyperlinks: AHashMap::new(),
        }
    }

    /// Read every `<c>` child of a `<row>` node
    ///
    /// The row number comes from the row's `r` attribute when present,
    /// otherwise from `default_row`. Returns the number of cells read.
    pub fn load_row<W: Workbook + ?Sized>(
        &mut self,
        row: &XmlElement,
        default_row: u32,
        workbook: &W,
    ) -> XlsxResult<usize> {
        let row_number = match row.attribute("r") {
            Some(r) => r
                .trim()
                .parse::<u32>()
                .map_err(|_| XlsxError::Parse(format!("Invalid row number '{}'", r)))?,
            None => default_row,
        };

        let mut count = 0;
        for node in row.elements().filter(|el| el.name == "c") {
            self.insert(Cell::from_node(row_number, node, workbook)?);
            count += 1;
        }
        Ok(count)
    }

    /// Add a cell, replacing any cell at the same position
    pub fn insert(&mut self, mut cell: Cell) -> Option<Cell> {
        let requests = cell.take_requests();
        let previous = self
            .cells
            .insert((cell.row_number(), cell.column_number()), cell);
        self.apply_requests(requests);
        previous
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }

    /// Mutable access to a cell; call [`MemoryWorksheet::flush`] afterwards
    pub fn get_mut(&mut self, row: u32, column: u32) -> Option<&mut Cell> {
        self.cells.get_mut(&(row, column))
    }

    /// Edit the cell at `row`/`column`, creating it if needed, then apply the
    /// requests the edit queued
    pub fn edit<R, F: FnOnce(&mut Cell) -> R>(&mut self, row: u32, column: u32, f: F) -> R {
        let cell = self
            .cells
            .entry((row, column))
            .or_insert_with(|| Cell::new(row, column, None));
        let result = f(cell);
        let requests = cell.take_requests();
        self.apply_requests(requests);
        result
    }

    /// Apply requests still queued on any cell
    pub fn flush(&mut self) {
        loop {
            let requests: Vec<SheetRequest> = self
                .cells
                .values_mut()
                .flat_map(Cell::take_requests)
                .collect();
            if requests.is_empty() {
                break;
            }
            self.apply_requests(requests);
        }
    }

    fn apply_requests(&mut self, requests: Vec<SheetRequest>) {
        for request in requests {
            request.apply(self);
        }
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Highest shared-formula id seen so far
    pub fn max_shared_formula_id(&self) -> Option<u32> {
        self.max_shared_formula_id
    }

    /// An id no shared formula on this sheet uses yet
    pub fn next_shared_formula_id(&self) -> u32 {
        self.max_shared_formula_id.map_or(0, |id| id + 1)
    }

    /// Serialize all cells in row-major order
    pub fn to_nodes<W: Workbook + ?Sized>(&self, workbook: &mut W) -> Vec<XmlElement> {
        self.cells.values().map(|cell| cell.to_node(workbook)).collect()
    }
}

impl Sheet for MemoryWorksheet {
    type CellRef = Result<CellAddress>;
    type Range = CellRange;
    type Column = u32;

    fn name(&self) -> &str {
        &self.name
    }

    fn active_cell(&self) -> Option<CellAddress> {
        self.active_cell
    }

    fn set_active_cell(&mut self, address: CellAddress) {
        self.active_cell = Some(address);
    }

    fn cell(&mut self, row: i64, column: i64) -> Result<CellAddress> {
        if row < 1 || row > i64::from(MAX_ROWS) {
            return Err(Error::RowOutOfBounds(row.clamp(0, u32::MAX.into()) as u32, MAX_ROWS));
        }
        if column < 1 || column > i64::from(MAX_COLS) {
            return Err(Error::ColumnOutOfBounds(
                column.clamp(0, u32::MAX.into()) as u32,
                MAX_COLS,
            ));
        }
        let (row, column) = (row as u32, column as u32);
        self.cells
            .entry((row, column))
            .or_insert_with(|| Cell::new(row, column, None));
        Ok(CellAddress::new(row, column))
    }

    fn range(&mut self, range: CellRange) -> CellRange {
        range
    }

    fn column(&mut self, column: u32) -> u32 {
        column
    }

    fn hyperlink(&self, address: &str) -> Option<String> {
        self.hyperlinks.get(address).cloned()
    }

    fn set_hyperlink(&mut self, address: &str, target: Option<String>) {
        match target {
            Some(target) => {
                self.hyperlinks.insert(address.to_string(), target);
            }
            None => {
                self.hyperlinks.remove(address);
            }
        }
    }

    fn update_max_shared_formula_id(&mut self, id: u32) {
        self.max_shared_formula_id = Some(self.max_shared_formula_id.map_or(id, |max| max.max(id)));
    }

    fn clear_cells_using_shared_formula(&mut self, id: u32) {
        let mut released = Vec::new();
        for cell in self.cells.values_mut() {
            if cell.shares_formula(id) {
                cell.clear();
                released.extend(cell.take_requests());
            }
        }
        self.apply_requests(released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::read_element;
    use duke_cells_core::CellValue;

    #[test]
    fn test_shared_strings_dedup() {
        let mut table = SharedStringTable::new();
        let a = table.index_for(&SharedStringItem::Text("a".into()));
        let b = table.index_for(&SharedStringItem::Text("b".into()));
        assert_eq!((a, b), (0, 1));
        assert_eq!(table.index_for(&SharedStringItem::Text("a".into())), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some(&SharedStringItem::Text("b".into())));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn test_shared_strings_from_items() {
        let table = SharedStringTable::from_items(vec![
            SharedStringItem::Text("x".into()),
            SharedStringItem::Text("x".into()),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some(&SharedStringItem::Text("x".into())));
    }

    #[test]
    fn test_style_sheet_creates_copies() {
        let mut sheet = MemoryStyleSheet::new();
        let base = sheet.define([("bold", StyleValue::Bool(true))]);
        assert_eq!(base, 1);

        let mut live = sheet.create_style(Some(base));
        assert_eq!(live.id(), 2);
        assert_eq!(live.get("bold"), Some(StyleValue::Bool(true)));

        live.set("bold", StyleValue::Bool(false));
        assert_eq!(
            sheet.properties(base).unwrap().get("bold"),
            Some(&StyleValue::Bool(true))
        );

        let fresh = sheet.create_style(None);
        assert_eq!(fresh.id(), 3);
        assert_eq!(fresh.get("bold"), None);
    }

    #[test]
    fn test_sheet_cell_bounds() {
        let mut sheet = MemoryWorksheet::new("Sheet1");
        assert_eq!(sheet.cell(1, 1), Ok(CellAddress::new(1, 1)));
        assert_eq!(sheet.len(), 1);
        assert_eq!(
            sheet.cell(0, 1),
            Err(Error::RowOutOfBounds(0, MAX_ROWS))
        );
        assert_eq!(
            sheet.cell(1, 16_385),
            Err(Error::ColumnOutOfBounds(16_385, MAX_COLS))
        );
    }

    #[test]
    fn test_load_row() {
        let workbook = MemoryWorkbook::new();
        let mut sheet = MemoryWorksheet::new("Sheet1");
        let row = read_element(
            r#"<row r="4"><c r="A4"><v>1</v></c><c r="B4"><f t="shared" ref="B4:B6" si="2">A4</f></c></row>"#,
        )
        .unwrap();

        assert_eq!(sheet.load_row(&row, 1, &workbook).unwrap(), 2);
        assert_eq!(sheet.get(4, 1).unwrap().value(), Some(&CellValue::Number(1.0)));
        assert_eq!(sheet.get(4, 2).unwrap().formula(), Some("A4"));
        assert_eq!(sheet.max_shared_formula_id(), Some(2));
        assert_eq!(sheet.next_shared_formula_id(), 3);
    }

    #[test]
    fn test_edit_applies_release() {
        let mut sheet = MemoryWorksheet::new("Sheet1");
        sheet.edit(1, 1, |c| {
            c.set_shared_formula(0, Some("B1"), Some("A1:A3"));
        });
        for row in 2..=3 {
            sheet.edit(row, 1, |c| {
                c.set_shared_formula(0, None, None);
            });
        }
        sheet.edit(1, 2, |c| {
            c.set_shared_formula(1, Some("C1"), Some("B1:B2"));
        });
        assert_eq!(sheet.max_shared_formula_id(), Some(1));

        sheet.edit(1, 1, |c| {
            c.clear();
        });
        for row in 1..=3 {
            assert!(sheet.get(row, 1).unwrap().is_empty());
        }
        assert!(sheet.get(1, 2).unwrap().shares_formula(1));
    }
}
