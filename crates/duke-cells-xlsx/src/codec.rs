//! Value Codec: native cell values to and from `t` tags and `<v>`/`<is>` payloads

use chrono::{NaiveDate, NaiveDateTime};

use duke_cells_core::{date_to_serial, CellError, CellValue, RichText, XmlElement};

use crate::context::{ErrorResolver, SharedStringItem, SharedStrings};
use crate::error::{XlsxError, XlsxResult};

/// A value as it appears in cell XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    /// The cell's `t` attribute, if one is needed
    pub type_tag: Option<&'static str>,
    /// Text of the `<v>` child
    pub payload: String,
}

/// Encode a value, interning strings and rich text in `shared_strings`
///
/// A non-finite number has no representation in the format and is written
/// as `#NUM!`.
pub fn encode_value(value: &CellValue, shared_strings: &mut dyn SharedStrings) -> EncodedValue {
    match value {
        CellValue::String(s) => {
            let index = shared_strings.index_for(&SharedStringItem::Text(s.clone()));
            tagged("s", index.to_string())
        }
        CellValue::RichText(rich) => {
            let index = shared_strings.index_for(&SharedStringItem::Rich(rich.clone()));
            tagged("s", index.to_string())
        }
        CellValue::Boolean(b) => tagged("b", if *b { "1" } else { "0" }.to_string()),
        CellValue::Number(n) if n.is_finite() => untagged(format_number(*n)),
        CellValue::Number(_) => tagged("e", CellError::Num.as_str().to_string()),
        CellValue::Date(d) => untagged(format_number(date_to_serial(*d))),
        CellValue::Error(e) => tagged("e", e.as_str().to_string()),
    }
}

fn tagged(tag: &'static str, payload: String) -> EncodedValue {
    EncodedValue {
        type_tag: Some(tag),
        payload,
    }
}

fn untagged(payload: String) -> EncodedValue {
    EncodedValue {
        type_tag: None,
        payload,
    }
}

/// Shortest decimal text that reads back as the same number
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Also covers -0
        return "0".to_string();
    }
    n.to_string()
}

/// Decode the value of a `<c>` node from its `t` attribute and its `<v>` and
/// `<is>` children
///
/// Returns `Ok(None)` when there is nothing to decode, including an empty
/// `<v>` on a number, boolean or date cell.
pub fn decode_value(
    type_tag: Option<&str>,
    value: Option<&XmlElement>,
    inline: Option<&XmlElement>,
    shared_strings: &dyn SharedStrings,
    errors: &dyn ErrorResolver,
) -> XlsxResult<Option<CellValue>> {
    if let Some(is) = inline {
        if type_tag.is_none() || type_tag == Some("inlineStr") {
            return Ok(Some(decode_inline_string(is)));
        }
    }

    let Some(value) = value else {
        return Ok(None);
    };
    let text = value.text();
    if text.is_empty() && matches!(type_tag, None | Some("n") | Some("b") | Some("d")) {
        return Ok(None);
    }

    let decoded = match type_tag {
        Some("s") => {
            let index: u32 = text.trim().parse().map_err(|_| {
                XlsxError::Parse(format!("Invalid shared string index '{}'", text))
            })?;
            match shared_strings.get(index) {
                Some(SharedStringItem::Text(s)) => CellValue::String(s.clone()),
                Some(SharedStringItem::Rich(rich)) => CellValue::RichText(rich.clone()),
                None => {
                    return Err(XlsxError::Parse(format!(
                        "Shared string index {} out of bounds",
                        index
                    )))
                }
            }
        }
        Some("b") => match text.trim() {
            "1" | "true" => CellValue::Boolean(true),
            "0" | "false" => CellValue::Boolean(false),
            other => return Err(XlsxError::Parse(format!("Invalid boolean '{}'", other))),
        },
        Some("e") => CellValue::Error(errors.resolve(&text)),
        Some("d") => CellValue::Date(parse_iso_date(&text)?),
        None | Some("n") => CellValue::Number(parse_number(&text)?),
        // `str` (cached formula string), `inlineStr` without `<is>` and
        // unknown tags all keep the text as is
        Some(_) => CellValue::String(text),
    };

    Ok(Some(decoded))
}

/// An `<is>` element whose only child is `<t>` is plain text; anything else
/// is kept as rich-text runs
pub fn decode_inline_string(is: &XmlElement) -> CellValue {
    let runs: Vec<&XmlElement> = is.elements().collect();
    match runs.as_slice() {
        [] => CellValue::String(String::new()),
        [t] if t.name == "t" => CellValue::String(t.text()),
        _ => CellValue::RichText(RichText::new(runs.into_iter().cloned().collect())),
    }
}

fn parse_number(text: &str) -> XlsxResult<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| XlsxError::Parse(format!("Invalid number '{}'", text)))
}

fn parse_iso_date(text: &str) -> XlsxResult<NaiveDateTime> {
    let text = text.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::default()))
        })
        .map_err(|_| XlsxError::Parse(format!("Invalid date '{}'", text)))
}
