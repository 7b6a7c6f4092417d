//! Duke Cells CLI - inspect spreadsheet cell XML and addresses

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use duke_cells_core::{
    column_name_to_number, column_number_to_name, AddressOptions, CellAddress, CellValue,
};
use duke_cells_xlsx::memory::{MemoryWorkbook, MemoryWorksheet, SharedStringTable};
use duke_cells_xlsx::{read_element, write_element, Cell, SharedStringItem};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "duke-cell")]
#[command(author, version, about = "Inspect and round-trip spreadsheet cell XML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a <c> or <row> fragment, describe its cells and write them back
    Inspect {
        /// File containing the fragment ("-" for stdin)
        xml: PathBuf,

        /// Row number for cells outside a <row> (default: taken from the address)
        #[arg(short, long)]
        row: Option<u32>,

        /// Sheet name used in qualified addresses
        #[arg(short, long, default_value = "Sheet1")]
        sheet: String,

        /// Shared-string table entries, in index order
        #[arg(long = "shared-string", value_name = "TEXT")]
        shared_strings: Vec<String>,
    },

    /// Parse an address and print it in the requested form
    Address {
        /// Address such as C7, $C$7 or 'My Sheet'!C7
        reference: String,

        /// Anchor row and column
        #[arg(long, conflicts_with_all = ["row_anchored", "column_anchored"])]
        anchored: bool,

        /// Anchor the row
        #[arg(long)]
        row_anchored: bool,

        /// Anchor the column
        #[arg(long)]
        column_anchored: bool,

        /// Qualify with this sheet name (overrides one in the reference)
        #[arg(short, long)]
        sheet: Option<String>,
    },

    /// Convert between column numbers and column letters
    Column {
        /// Column number (1-based) or letters
        column: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            xml,
            row,
            sheet,
            shared_strings,
        } => inspect(&xml, row, &sheet, shared_strings),
        Commands::Address {
            reference,
            anchored,
            row_anchored,
            column_anchored,
            sheet,
        } => {
            let options = AddressOptions::new()
                .anchored(anchored)
                .row_anchored(row_anchored)
                .column_anchored(column_anchored);
            address(&reference, options, sheet)
        }
        Commands::Column { column } => convert_column(&column),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))
    }
}

fn inspect(path: &Path, row: Option<u32>, sheet_name: &str, strings: Vec<String>) -> Result<()> {
    let text = read_input(path)?;
    let node = read_element(&text).context("Failed to parse XML")?;

    let mut workbook = MemoryWorkbook::with_shared_strings(SharedStringTable::from_items(
        strings.into_iter().map(SharedStringItem::Text),
    ));
    let mut sheet = MemoryWorksheet::new(sheet_name);

    match node.name.as_str() {
        "row" => {
            sheet
                .load_row(&node, row.unwrap_or(1), &workbook)
                .context("Failed to read row")?;
        }
        "c" => {
            let row = match row {
                Some(row) => row,
                None => node
                    .attribute("r")
                    .and_then(|r| CellAddress::parse(r).ok())
                    .map(|address| address.row)
                    .context("Cell has no valid 'r' attribute; pass --row")?,
            };
            let cell = Cell::from_node(row, &node, &workbook).context("Failed to read cell")?;
            sheet.insert(cell);
        }
        other => bail!("Expected a <c> or <row> element, found <{}>", other),
    }

    let qualified = AddressOptions::new().include_sheet_name(true);
    for cell in sheet.cells() {
        println!("{}", cell.address(&qualified, &sheet));
        describe(cell);
        let xml = write_element(&cell.to_node(&mut workbook)).context("Failed to write cell")?;
        println!("  xml:      {}", xml);
    }

    if let Some(id) = sheet.max_shared_formula_id() {
        println!("Max shared formula id: {}", id);
    }
    let table = workbook.shared_string_table();
    if !table.is_empty() {
        println!("Shared strings: {}", table.len());
    }

    Ok(())
}

fn describe(cell: &Cell) {
    match cell.value() {
        Some(value) => println!("  value:    {} ({})", display_value(value), value.type_name()),
        None => println!("  value:    (none)"),
    }
    if let Some(state) = cell.formula_state() {
        println!("  formula:  {}", cell.formula().unwrap_or(""));
        println!("  kind:     {}", state.kind());
        if let Some(reference) = state.reference() {
            println!("  ref:      {}", reference);
        }
        if let Some(id) = state.shared_id() {
            println!("  shared:   {}", id);
        }
    }
    if let Some(id) = cell.style_id() {
        println!("  style:    {}", id);
    }
    if !cell.extra_attributes().is_empty() || !cell.extra_children().is_empty() {
        println!(
            "  kept:     {} attribute(s), {} node(s)",
            cell.extra_attributes().len(),
            cell.extra_children().len()
        );
    }
}

fn display_value(value: &CellValue) -> String {
    match value {
        CellValue::String(s) => format!("{:?}", s),
        CellValue::RichText(r) => format!("{:?} in {} run(s)", r.plain_text(), r.runs().len()),
        other => other.to_string(),
    }
}

fn address(reference: &str, options: AddressOptions, sheet: Option<String>) -> Result<()> {
    let (parsed_sheet, address) = CellAddress::parse_qualified(reference)
        .with_context(|| format!("Invalid address '{}'", reference))?;
    let sheet = sheet.or(parsed_sheet);
    let options = options.include_sheet_name(sheet.is_some());

    println!("{}", address.format(&options, sheet.as_deref()));
    Ok(())
}

fn convert_column(column: &str) -> Result<()> {
    let column = column.trim();
    match column.parse::<u32>() {
        Ok(0) => bail!("Column numbers start at 1"),
        Ok(number) => {
            let name = column_number_to_name(number);
            column_name_to_number(&name)
                .with_context(|| format!("Column {} is out of range", number))?;
            println!("{}", name);
        }
        Err(_) => {
            let number = column_name_to_number(column)
                .with_context(|| format!("Invalid column '{}'", column))?;
            println!("{}", number);
        }
    }
    Ok(())
}
