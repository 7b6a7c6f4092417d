//! Shared-formula groups across a worksheet.

use duke_cells_core::{CellValue, SHARED_FORMULA_MARKER};
use duke_cells_xlsx::memory::{MemoryWorkbook, MemoryWorksheet};
use duke_cells_xlsx::{read_element, write_element, SheetRequest};
use pretty_assertions::assert_eq;

const ROWS: [&str; 3] = [
    r#"<row r="1"><c r="A1"><f t="shared" ref="A1:A3" si="0">B1*2</f><v>2</v></c><c r="B1"><v>1</v></c></row>"#,
    r#"<row r="2"><c r="A2"><f t="shared" si="0"/><v>4</v></c><c r="B2"><f t="shared" ref="B2:B3" si="4">C2</f></c></row>"#,
    r#"<row r="3"><c r="A3"><f t="shared" si="0"/><v>6</v></c><c r="B3"><f t="shared" si="4"/></c></row>"#,
];

fn load() -> (MemoryWorkbook, MemoryWorksheet) {
    let workbook = MemoryWorkbook::new();
    let mut sheet = MemoryWorksheet::new("Sheet1");
    for (i, row) in ROWS.iter().enumerate() {
        let node = read_element(row).unwrap();
        sheet.load_row(&node, i as u32 + 1, &workbook).unwrap();
    }
    (workbook, sheet)
}

#[test]
fn test_loading_tracks_max_shared_id() {
    let (_, sheet) = load();
    assert_eq!(sheet.len(), 6);
    assert_eq!(sheet.max_shared_formula_id(), Some(4));
    assert_eq!(sheet.next_shared_formula_id(), 5);
}

#[test]
fn test_master_and_dependent_formulas() {
    let (_, sheet) = load();
    let master = sheet.get(1, 1).unwrap();
    assert_eq!(master.formula(), Some("B1*2"));
    assert_eq!(master.shared_ref_formula(), Some("B1*2"));
    assert_eq!(master.value(), None);

    let dependent = sheet.get(2, 1).unwrap();
    assert_eq!(dependent.formula(), Some(SHARED_FORMULA_MARKER));
    assert_eq!(dependent.shared_ref_formula(), None);
    assert!(dependent.shares_formula(0));
    assert!(!dependent.shares_formula(4));
}

#[test]
fn test_clearing_master_clears_group() {
    let (mut workbook, mut sheet) = load();

    sheet.edit(1, 1, |cell| {
        cell.set_value(Some(CellValue::from(10)));
    });

    assert_eq!(sheet.get(1, 1).unwrap().value(), Some(&CellValue::Number(10.0)));
    assert!(sheet.get(2, 1).unwrap().is_empty());
    assert!(sheet.get(3, 1).unwrap().is_empty());

    // The other group is untouched
    assert_eq!(sheet.get(2, 2).unwrap().formula(), Some("C2"));
    assert_eq!(sheet.get(3, 2).unwrap().formula(), Some(SHARED_FORMULA_MARKER));

    let xml: Vec<String> = sheet
        .to_nodes(&mut workbook)
        .iter()
        .map(|node| write_element(node).unwrap())
        .collect();
    assert_eq!(
        xml,
        [
            r#"<c r="A1"><v>10</v></c>"#,
            r#"<c r="B1"><v>1</v></c>"#,
            r#"<c r="A2"/>"#,
            r#"<c r="B2"><f t="shared" ref="B2:B3" si="4">C2</f></c>"#,
            r#"<c r="A3"/>"#,
            r#"<c r="B3"><f t="shared" si="4"/></c>"#,
        ]
    );
}

#[test]
fn test_clearing_dependent_leaves_group() {
    let (_, mut sheet) = load();

    sheet.edit(2, 1, |cell| {
        cell.clear();
    });

    assert!(sheet.get(2, 1).unwrap().is_empty());
    assert_eq!(sheet.get(1, 1).unwrap().formula(), Some("B1*2"));
    assert!(sheet.get(3, 1).unwrap().shares_formula(0));
}

#[test]
fn test_requests_wait_for_the_owner() {
    let workbook = MemoryWorkbook::new();
    let node = read_element(r#"<c r="A1"><f t="shared" ref="A1:A2" si="9">1</f></c>"#).unwrap();
    let mut cell = duke_cells_xlsx::Cell::from_node(1, &node, &workbook).unwrap();
    assert_eq!(
        cell.pending_requests(),
        &[SheetRequest::UpdateMaxSharedFormulaId(9)]
    );

    cell.clear();
    assert_eq!(
        cell.take_requests(),
        vec![
            SheetRequest::UpdateMaxSharedFormulaId(9),
            SheetRequest::ReleaseSharedFormula(9),
        ]
    );

    // Requests left on a cell are applied by flush
    let (_, mut sheet) = load();
    sheet.get_mut(1, 1).unwrap().clear();
    assert!(sheet.get(2, 1).unwrap().shares_formula(0));
    sheet.flush();
    assert!(sheet.get(2, 1).unwrap().is_empty());
    assert!(sheet.get(3, 1).unwrap().is_empty());

    let mut late = duke_cells_xlsx::Cell::new(9, 1, None);
    late.set_shared_formula(12, Some("2"), Some("A9:A10"));
    assert!(sheet.insert(late).is_none());
    assert_eq!(sheet.next_shared_formula_id(), 13);
}
