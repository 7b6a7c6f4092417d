//! The cell entity
//!
//! A [`Cell`] is read from a `<c>` node, edited in place and written back.
//! It keeps everything it does not understand so that a parse/serialize round
//! trip reproduces the original node.

use std::fmt;

use duke_cells_core::{
    column_number_to_name, find_in, format_address, replace_in, AddressOptions, CellAddress,
    CellRange, CellValue, Error, FindPattern, FormulaState, Replacement, Result, XmlElement,
    XmlNode,
};

use crate::codec::{decode_value, encode_value};
use crate::context::{CellStyle, Sheet, SheetRequest, StyleValue, Workbook};
use crate::error::{XlsxError, XlsxResult};

/// A single worksheet cell
///
/// Value and formula are mutually exclusive: setting either clears the other.
/// Requests for the owning sheet (see [`SheetRequest`]) accumulate on the
/// cell until the owner calls [`Cell::take_requests`].
pub struct Cell {
    row_number: u32,
    column_number: u32,
    value: Option<CellValue>,
    formula: Option<FormulaState>,
    style_id: Option<u32>,
    style: Option<Box<dyn CellStyle>>,
    extra_attributes: Vec<(String, String)>,
    extra_children: Vec<XmlNode>,
    requests: Vec<SheetRequest>,
}

impl Cell {
    /// Create an empty cell at 1-based `row_number`/`column_number`
    pub fn new(row_number: u32, column_number: u32, style_id: Option<u32>) -> Self {
        Self {
            row_number,
            column_number,
            value: None,
            formula: None,
            style_id,
            style: None,
            extra_attributes: Vec::new(),
            extra_children: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Read a cell from its `<c>` node
    ///
    /// The column comes from the `r` attribute, the row from the enclosing
    /// row. A shared formula id queues a
    /// [`SheetRequest::UpdateMaxSharedFormulaId`]. The cached `<v>` of a
    /// formula cell is not kept, and only the first `<f>`, `<v>` or `<is>`
    /// child is read.
    pub fn from_node<W: Workbook + ?Sized>(
        row_number: u32,
        node: &XmlElement,
        workbook: &W,
    ) -> XlsxResult<Self> {
        let reference = node.attribute("r").ok_or(XlsxError::MissingAttribute {
            element: "c",
            attribute: "r",
        })?;
        let address = CellAddress::parse(reference)?;
        if address.row != row_number {
            log::debug!("Cell {} found in row {}", reference, row_number);
        }

        let mut cell = Cell::new(row_number, address.column, None);
        let mut type_tag = None;

        for (key, value) in &node.attributes {
            match key.as_str() {
                "r" => {}
                "s" => {
                    let id = value.trim().parse::<u32>().map_err(|_| {
                        XlsxError::Parse(format!("Invalid style id '{}' on {}", value, reference))
                    })?;
                    cell.style_id = Some(id);
                }
                "t" => type_tag = Some(value.as_str()),
                _ => cell.extra_attributes.push((key.clone(), value.clone())),
            }
        }

        let mut value_node = None;
        let mut inline_node = None;
        for child in &node.children {
            match child {
                XmlNode::Element(el) if el.name == "f" && cell.formula.is_none() => {
                    let formula = FormulaState::from_attributes(&el.attributes, Some(el.text()))?;
                    if let Some(id) = formula.shared_id() {
                        cell.requests.push(SheetRequest::UpdateMaxSharedFormulaId(id));
                    }
                    cell.formula = Some(formula);
                }
                XmlNode::Element(el) if el.name == "v" && value_node.is_none() => {
                    value_node = Some(el)
                }
                XmlNode::Element(el) if el.name == "is" && inline_node.is_none() => {
                    inline_node = Some(el)
                }
                XmlNode::Element(el) if matches!(el.name.as_str(), "f" | "v" | "is") => {
                    log::warn!("Ignoring repeated <{}> in cell {}", el.name, reference);
                }
                other => {
                    if let XmlNode::Element(el) = other {
                        log::debug!("Preserving <{}> in cell {}", el.name, reference);
                    }
                    cell.extra_children.push(other.clone());
                }
            }
        }

        if cell.formula.is_some() {
            if value_node.is_some() || inline_node.is_some() {
                log::debug!("Dropping cached value of formula cell {}", reference);
            }
        } else {
            cell.value = decode_value(
                type_tag,
                value_node,
                inline_node,
                workbook.shared_strings(),
                workbook.error_resolver(),
            )?;
        }

        Ok(cell)
    }

    /// Write the cell as a `<c>` node
    ///
    /// Strings and rich text are interned in the workbook's shared-string
    /// table. Attributes come out as `r`, `s`, `t`, then the preserved ones;
    /// preserved children follow the `<f>` or `<v>` child.
    pub fn to_node<W: Workbook + ?Sized>(&self, workbook: &mut W) -> XmlElement {
        let mut node = XmlElement::new("c").with_attribute("r", self.cell_address().to_a1_string());

        if let Some(id) = self.style_id() {
            node.attributes.push(("s".to_string(), id.to_string()));
        }

        if let Some(formula) = &self.formula {
            let mut f = XmlElement::new("f");
            f.attributes = formula.to_attributes();
            if let Some(text) = formula.text() {
                f.children.push(XmlNode::Text(text.to_string()));
            }
            node.children.push(f.into());
        } else if let Some(value) = &self.value {
            let encoded = encode_value(value, workbook.shared_strings_mut());
            if let Some(tag) = encoded.type_tag {
                node.attributes.push(("t".to_string(), tag.to_string()));
            }
            let v = XmlElement::new("v").with_text(encoded.payload);
            node.children.push(v.into());
        }

        node.attributes.extend(self.extra_attributes.iter().cloned());
        node.children.extend(self.extra_children.iter().cloned());
        node
    }

    pub fn row_number(&self) -> u32 {
        self.row_number
    }

    pub fn column_number(&self) -> u32 {
        self.column_number
    }

    /// Column letters, e.g. `C`
    pub fn column_name(&self) -> String {
        column_number_to_name(self.column_number)
    }

    /// Unanchored address of this cell
    pub fn cell_address(&self) -> CellAddress {
        CellAddress::new(self.row_number, self.column_number)
    }

    /// The cell's address text; the sheet supplies the name for
    /// `include_sheet_name`
    pub fn address<S: Sheet + ?Sized>(&self, options: &AddressOptions, sheet: &S) -> String {
        format_address(
            self.row_number,
            self.column_number,
            options,
            Some(sheet.name()),
        )
    }

    pub fn value(&self) -> Option<&CellValue> {
        self.value.as_ref()
    }

    /// Replace the content with `value`; `None` empties the cell
    pub fn set_value(&mut self, value: Option<CellValue>) -> &mut Self {
        self.clear();
        self.value = value;
        self
    }

    /// Check if the cell has neither value nor formula
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.formula.is_none()
    }

    /// The formula as users see it
    ///
    /// The master of a shared group returns its own text and any other
    /// member of the group returns [`SHARED_FORMULA_MARKER`].
    ///
    /// [`SHARED_FORMULA_MARKER`]: duke_cells_core::SHARED_FORMULA_MARKER
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_ref().and_then(FormulaState::display_formula)
    }

    /// Full formula state, including kind and preserved `<f>` attributes
    pub fn formula_state(&self) -> Option<&FormulaState> {
        self.formula.as_ref()
    }

    /// Set a normal formula, or drop the formula with `None`
    pub fn set_formula(&mut self, text: Option<&str>) -> &mut Self {
        match text {
            Some(text) => {
                self.clear();
                self.formula = Some(FormulaState::normal(text));
            }
            None => self.clear_formula(),
        }
        self
    }

    /// Text of the shared formula this cell is the master of
    pub fn shared_ref_formula(&self) -> Option<&str> {
        self.formula.as_ref().and_then(FormulaState::shared_ref_formula)
    }

    /// Check if this cell belongs to shared-formula group `id`
    pub fn shares_formula(&self, id: u32) -> bool {
        self.formula.as_ref().map_or(false, |f| f.shares(id))
    }

    pub fn shared_formula_id(&self) -> Option<u32> {
        self.formula.as_ref().and_then(FormulaState::shared_id)
    }

    /// Make this cell a member of shared-formula group `id`
    ///
    /// Passing `reference` makes it the master of the group.
    pub fn set_shared_formula(
        &mut self,
        id: u32,
        text: Option<&str>,
        reference: Option<&str>,
    ) -> &mut Self {
        self.clear();
        self.formula = Some(FormulaState::shared(
            id,
            text.map(str::to_string),
            reference.map(str::to_string),
        ));
        self.requests.push(SheetRequest::UpdateMaxSharedFormulaId(id));
        self
    }

    /// Empty the value and formula
    ///
    /// Clearing the master of a shared group queues a
    /// [`SheetRequest::ReleaseSharedFormula`] so the sheet can clear the rest
    /// of the group.
    pub fn clear(&mut self) -> &mut Self {
        self.value = None;
        self.clear_formula();
        self
    }

    fn clear_formula(&mut self) {
        if let Some(formula) = self.formula.take() {
            if formula.is_shared_master() {
                if let Some(id) = formula.shared_id() {
                    self.requests.push(SheetRequest::ReleaseSharedFormula(id));
                }
            }
        }
    }

    /// Requests queued for the owning sheet, oldest first
    pub fn pending_requests(&self) -> &[SheetRequest] {
        &self.requests
    }

    /// Drain the requests queued for the owning sheet
    pub fn take_requests(&mut self) -> Vec<SheetRequest> {
        if !self.requests.is_empty() {
            log::trace!(
                "Draining {} request(s) from cell {}",
                self.requests.len(),
                self.cell_address()
            );
        }
        std::mem::take(&mut self.requests)
    }

    /// Check if this is the sheet's active cell
    pub fn is_active<S: Sheet + ?Sized>(&self, sheet: &S) -> bool {
        sheet
            .active_cell()
            .map_or(false, |a| a.row == self.row_number && a.column == self.column_number)
    }

    /// Make this the sheet's active cell
    ///
    /// A cell cannot be deactivated on its own; activate another cell instead.
    pub fn set_active<S: Sheet + ?Sized>(&self, active: bool, sheet: &mut S) -> Result<&Self> {
        if !active {
            return Err(Error::InvalidOperation(
                "a cell cannot be deactivated directly, activate a different cell instead".into(),
            ));
        }
        sheet.set_active_cell(self.cell_address());
        Ok(self)
    }

    /// Style id written to the `s` attribute: the live style's id once one
    /// exists, otherwise the id read from the document
    pub fn style_id(&self) -> Option<u32> {
        match &self.style {
            Some(style) => Some(style.id()),
            None => self.style_id,
        }
    }

    /// The live style, created from the stored style id on first use
    pub fn live_style<W: Workbook + ?Sized>(&mut self, workbook: &mut W) -> &mut dyn CellStyle {
        let base = self.style_id;
        self.style
            .get_or_insert_with(|| workbook.style_sheet().create_style(base))
            .as_mut()
    }

    pub fn style<W: Workbook + ?Sized>(&mut self, name: &str, workbook: &mut W) -> Option<StyleValue> {
        self.live_style(workbook).get(name)
    }

    /// Several style properties at once, in the order asked for
    pub fn styles<W: Workbook + ?Sized>(
        &mut self,
        names: &[&str],
        workbook: &mut W,
    ) -> Vec<(String, Option<StyleValue>)> {
        let style = self.live_style(workbook);
        names
            .iter()
            .map(|name| (name.to_string(), style.get(name)))
            .collect()
    }

    pub fn set_style<W, V>(&mut self, name: &str, value: V, workbook: &mut W) -> &mut Self
    where
        W: Workbook + ?Sized,
        V: Into<StyleValue>,
    {
        self.live_style(workbook).set(name, value.into());
        self
    }

    pub fn set_styles<W, I, K, V>(&mut self, entries: I, workbook: &mut W) -> &mut Self
    where
        W: Workbook + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<StyleValue>,
    {
        let style = self.live_style(workbook);
        for (name, value) in entries {
            style.set(name.as_ref(), value.into());
        }
        self
    }

    /// Check if the cell's text matches `pattern`
    ///
    /// Only plain string values are searched.
    pub fn find(&self, pattern: &FindPattern) -> Result<bool> {
        match &self.value {
            Some(CellValue::String(text)) => find_in(text, pattern),
            _ => Ok(false),
        }
    }

    /// Replace matches of `pattern` in the cell's text
    ///
    /// Returns `true` only if the text actually changed.
    pub fn find_and_replace(
        &mut self,
        pattern: &FindPattern,
        replacement: Replacement<'_>,
    ) -> Result<bool> {
        let Some(CellValue::String(text)) = &self.value else {
            return Ok(false);
        };
        match replace_in(text, pattern, replacement)? {
            Some(replaced) => {
                self.set_value(Some(CellValue::String(replaced)));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The range spanning this cell and `other`
    pub fn range_to<S: Sheet + ?Sized>(&self, other: CellAddress, sheet: &mut S) -> S::Range {
        sheet.range(CellRange::new(self.cell_address(), other))
    }

    /// The cell `row_offset` rows and `column_offset` columns away
    pub fn relative_cell<S: Sheet + ?Sized>(
        &self,
        row_offset: i64,
        column_offset: i64,
        sheet: &mut S,
    ) -> S::CellRef {
        sheet.cell(
            i64::from(self.row_number) + row_offset,
            i64::from(self.column_number) + column_offset,
        )
    }

    pub fn column<S: Sheet + ?Sized>(&self, sheet: &mut S) -> S::Column {
        sheet.column(self.column_number)
    }

    pub fn hyperlink<S: Sheet + ?Sized>(&self, sheet: &S) -> Option<String> {
        sheet.hyperlink(&self.cell_address().to_a1_string())
    }

    /// Attach a hyperlink target, or remove it with `None`
    pub fn set_hyperlink<S: Sheet + ?Sized>(&self, target: Option<String>, sheet: &mut S) -> &Self {
        sheet.set_hyperlink(&self.cell_address().to_a1_string(), target);
        self
    }

    /// Attributes of the `<c>` node that were kept as read
    pub fn extra_attributes(&self) -> &[(String, String)] {
        &self.extra_attributes
    }

    /// Child nodes of the `<c>` node that were kept as read
    pub fn extra_children(&self) -> &[XmlNode] {
        &self.extra_children
    }

    /// Run `f` on the cell and return the cell
    pub fn tap<F: FnOnce(&mut Self)>(&mut self, f: F) -> &mut Self {
        f(self);
        self
    }

    /// Run `f` on the cell and return its result
    pub fn thru<R, F: FnOnce(&mut Self) -> R>(&mut self, f: F) -> R {
        f(self)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("address", &self.cell_address().to_a1_string())
            .field("value", &self.value)
            .field("formula", &self.formula)
            .field("style_id", &self.style_id())
            .field("extra_attributes", &self.extra_attributes)
            .field("extra_children", &self.extra_children)
            .field("requests", &self.requests)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryWorkbook, MemoryWorksheet};
    use crate::xml::read_element;
    use duke_cells_core::{CellError, FindMatch, SHARED_FORMULA_MARKER};
    use pretty_assertions::assert_eq;

    fn parse(row: u32, xml: &str, workbook: &MemoryWorkbook) -> Cell {
        Cell::from_node(row, &read_element(xml).unwrap(), workbook).unwrap()
    }

    #[test]
    fn test_new_cell_is_empty() {
        let cell = Cell::new(7, 3, None);
        assert_eq!(cell.row_number(), 7);
        assert_eq!(cell.column_number(), 3);
        assert_eq!(cell.column_name(), "C");
        assert!(cell.is_empty());
        assert_eq!(cell.formula(), None);
        assert_eq!(cell.style_id(), None);
        assert!(cell.pending_requests().is_empty());
    }

    #[test]
    fn test_address() {
        let sheet = MemoryWorksheet::new("Sheet'1");
        let cell = Cell::new(7, 3, None);
        assert_eq!(cell.address(&AddressOptions::new(), &sheet), "C7");
        assert_eq!(
            cell.address(&AddressOptions::new().row_anchored(true), &sheet),
            "C$7"
        );
        assert_eq!(
            cell.address(&AddressOptions::new().column_anchored(true), &sheet),
            "$C7"
        );
        assert_eq!(
            cell.address(&AddressOptions::new().anchored(true), &sheet),
            "$C$7"
        );
        assert_eq!(
            cell.address(
                &AddressOptions::new().include_sheet_name(true).anchored(true),
                &sheet
            ),
            "'Sheet''1'!$C$7"
        );
    }

    #[test]
    fn test_value_and_formula_are_exclusive() {
        let mut cell = Cell::new(1, 1, None);
        cell.set_value(Some(CellValue::from(5.6)));
        assert_eq!(cell.value(), Some(&CellValue::Number(5.6)));

        cell.set_formula(Some("A2*3"));
        assert_eq!(cell.value(), None);
        assert_eq!(cell.formula(), Some("A2*3"));

        cell.set_value(Some(CellValue::from("foo")));
        assert_eq!(cell.formula(), None);
        assert_eq!(cell.formula_state(), None);
        assert_eq!(cell.value(), Some(&CellValue::string("foo")));

        cell.set_value(None);
        assert!(cell.is_empty());
    }

    #[test]
    fn test_set_formula_none_keeps_value() {
        let mut cell = Cell::new(1, 1, None);
        cell.set_value(Some(CellValue::from(true)));
        cell.set_formula(None);
        assert_eq!(cell.value(), Some(&CellValue::Boolean(true)));
    }

    #[test]
    fn test_shared_formula_accessors() {
        let mut master = Cell::new(1, 1, None);
        master.set_shared_formula(3, Some("A2*B2"), Some("A1:A4"));
        assert_eq!(master.formula(), Some("A2*B2"));
        assert_eq!(master.shared_ref_formula(), Some("A2*B2"));
        assert!(master.shares_formula(3));
        assert!(!master.shares_formula(4));
        assert_eq!(master.shared_formula_id(), Some(3));
        assert_eq!(
            master.take_requests(),
            vec![SheetRequest::UpdateMaxSharedFormulaId(3)]
        );

        let mut dependent = Cell::new(2, 1, None);
        dependent.set_shared_formula(3, None, None);
        assert_eq!(dependent.formula(), Some(SHARED_FORMULA_MARKER));
        assert_eq!(dependent.shared_ref_formula(), None);
        assert!(dependent.shares_formula(3));

        dependent.set_formula(Some("1+1"));
        assert!(!dependent.shares_formula(3));
        assert_eq!(dependent.formula(), Some("1+1"));
    }

    #[test]
    fn test_clear_master_requests_release() {
        let mut master = Cell::new(1, 1, None);
        master.set_shared_formula(0, Some("B1"), Some("A1:A3"));
        master.take_requests();

        master.clear();
        assert!(master.is_empty());
        assert_eq!(
            master.take_requests(),
            vec![SheetRequest::ReleaseSharedFormula(0)]
        );

        // A dependent clears silently
        let mut dependent = Cell::new(2, 1, None);
        dependent.set_shared_formula(0, None, None);
        dependent.take_requests();
        dependent.clear();
        assert!(dependent.take_requests().is_empty());

        // Overwriting a master with a value releases the group too
        master.set_shared_formula(1, Some("B1"), Some("A1:A3"));
        master.take_requests();
        master.set_value(Some(CellValue::from(1)));
        assert_eq!(
            master.take_requests(),
            vec![SheetRequest::ReleaseSharedFormula(1)]
        );
    }

    #[test]
    fn test_active_cell() {
        let mut sheet = MemoryWorksheet::new("Sheet1");
        let cell = Cell::new(2, 2, None);
        assert!(!cell.is_active(&sheet));

        cell.set_active(true, &mut sheet).unwrap();
        assert!(cell.is_active(&sheet));
        assert_eq!(sheet.active_cell(), Some(CellAddress::new(2, 2)));

        let result = cell.set_active(false, &mut sheet);
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
        assert!(cell.is_active(&sheet));
    }

    #[test]
    fn test_style_is_created_once() {
        let mut workbook = MemoryWorkbook::new();
        let base = workbook.style_sheet_mut().define([("bold", StyleValue::Bool(true))]);

        let mut cell = Cell::new(1, 1, Some(base));
        assert_eq!(cell.style_id(), Some(base));

        assert_eq!(cell.style("bold", &mut workbook), Some(StyleValue::Bool(true)));
        let live_id = cell.style_id().unwrap();
        assert_ne!(live_id, base);

        cell.set_style("italic", true, &mut workbook)
            .set_styles([("fontSize", 12), ("indent", 2)], &mut workbook);
        assert_eq!(cell.style_id(), Some(live_id));
        assert_eq!(
            cell.styles(&["bold", "italic", "fontSize", "underline"], &mut workbook),
            vec![
                ("bold".to_string(), Some(StyleValue::Bool(true))),
                ("italic".to_string(), Some(StyleValue::Bool(true))),
                ("fontSize".to_string(), Some(StyleValue::Number(12.0))),
                ("underline".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_find() {
        let mut cell = Cell::new(1, 1, None);
        cell.set_value(Some(CellValue::from("Foo bar baz")));
        assert!(cell.find(&"bar".into()).unwrap());
        assert!(cell.find(&"BAR".into()).unwrap());
        assert!(!cell.find(&"goo".into()).unwrap());

        cell.set_value(Some(CellValue::from(42)));
        assert!(!cell.find(&"42".into()).unwrap());

        cell.set_formula(Some("bar"));
        assert!(!cell.find(&"bar".into()).unwrap());
    }

    #[test]
    fn test_find_and_replace() {
        let mut cell = Cell::new(1, 1, None);
        cell.set_value(Some(CellValue::from("Foo bar baz foo")));

        assert!(!cell.find_and_replace(&"foot".into(), "XXX".into()).unwrap());
        assert_eq!(cell.value(), Some(&CellValue::string("Foo bar baz foo")));

        assert!(cell.find_and_replace(&"foo".into(), "XXX".into()).unwrap());
        assert_eq!(cell.value(), Some(&CellValue::string("XXX bar baz XXX")));

        let pattern = FindPattern::compile("[a-z]{3}", false).unwrap();
        assert!(cell.find_and_replace(&pattern, "YYY".into()).unwrap());
        assert_eq!(cell.value(), Some(&CellValue::string("XXX YYY baz XXX")));

        let pattern = FindPattern::compile(r"(\w)(\w)", true).unwrap();
        let replaced = cell
            .find_and_replace(
                &pattern,
                Replacement::function(|m: &FindMatch<'_>| m.matched.to_lowercase()),
            )
            .unwrap();
        assert!(replaced);
        assert_eq!(cell.value(), Some(&CellValue::string("xxX yyY baz xxX")));
    }

    #[test]
    fn test_find_and_replace_ignores_other_values() {
        let mut cell = Cell::new(1, 1, None);
        cell.set_value(Some(CellValue::Error(CellError::Na)));
        assert!(!cell.find_and_replace(&"N/A".into(), "x".into()).unwrap());
        assert_eq!(cell.value(), Some(&CellValue::Error(CellError::Na)));
    }

    #[test]
    fn test_delegations() {
        let mut sheet = MemoryWorksheet::new("Sheet1");
        let cell = Cell::new(7, 3, None);

        let range = cell.range_to(CellAddress::new(5, 1), &mut sheet);
        assert_eq!(range.to_a1_string(), "A5:C7");

        assert_eq!(
            cell.relative_cell(-2, 1, &mut sheet),
            Ok(CellAddress::new(5, 4))
        );
        assert!(cell.relative_cell(-7, 0, &mut sheet).is_err());

        assert_eq!(cell.column(&mut sheet), 3);

        assert_eq!(cell.hyperlink(&sheet), None);
        cell.set_hyperlink(Some("https://example.com".into()), &mut sheet);
        assert_eq!(cell.hyperlink(&sheet).as_deref(), Some("https://example.com"));
        cell.set_hyperlink(None, &mut sheet);
        assert_eq!(cell.hyperlink(&sheet), None);
    }

    #[test]
    fn test_tap_and_thru() {
        let mut cell = Cell::new(1, 1, None);
        let formula = cell
            .tap(|c| {
                c.set_value(Some(CellValue::from(1)));
            })
            .tap(|c| {
                c.set_formula(Some("A2"));
            })
            .thru(|c| c.formula().map(str::to_string));
        assert_eq!(formula.as_deref(), Some("A2"));
    }

    #[test]
    fn test_parse_requires_reference() {
        let workbook = MemoryWorkbook::new();
        let node = read_element("<c><v>1</v></c>").unwrap();
        let result = Cell::from_node(1, &node, &workbook);
        assert!(matches!(
            result,
            Err(XlsxError::MissingAttribute {
                element: "c",
                attribute: "r"
            })
        ));

        let node = read_element(r#"<c r="1A"/>"#).unwrap();
        assert!(matches!(
            Cell::from_node(1, &node, &workbook),
            Err(XlsxError::Core(Error::MalformedAddress(_)))
        ));
    }

    #[test]
    fn test_parse_formula_cell_drops_cached_value() {
        let workbook = MemoryWorkbook::new();
        let cell = parse(2, r#"<c r="B2" t="str"><f>CONCAT("a","b")</f><v>ab</v></c>"#, &workbook);
        assert_eq!(cell.formula(), Some(r#"CONCAT("a","b")"#));
        assert_eq!(cell.value(), None);
        assert_eq!(cell.column_number(), 2);
    }

    #[test]
    fn test_parse_shared_formula_advises_max_id() {
        let workbook = MemoryWorkbook::new();
        let mut cell = parse(3, r#"<c r="C3"><f t="shared" si="7"/></c>"#, &workbook);
        assert_eq!(cell.formula(), Some(SHARED_FORMULA_MARKER));
        assert_eq!(
            cell.take_requests(),
            vec![SheetRequest::UpdateMaxSharedFormulaId(7)]
        );
        assert!(cell.take_requests().is_empty());
    }
}
