//! Reading and writing single XML fragments as [`XmlElement`] trees

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use duke_cells_core::{XmlElement, XmlNode};

use crate::error::{XlsxError, XlsxResult};

/// Parse one XML fragment (such as a `<c>` node) into an element tree
///
/// Whitespace-only text between elements is dropped unless it sits inside a
/// `<t>` element or an element marked `xml:space="preserve"`. Comments,
/// processing instructions and the declaration are skipped.
pub fn read_element(xml: &str) -> XlsxResult<XmlElement> {
    let mut xml_reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(start_element(&e)?),
            Ok(Event::Empty(e)) => {
                let element = start_element(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XlsxError::Parse("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape()?.into_owned();
                push_text(&mut stack, text)?;
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_text(&mut stack, text)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XlsxError::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| XlsxError::Parse("no element found".into()))
}

fn start_element(e: &BytesStart<'_>) -> XlsxResult<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> XlsxResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(XlsxError::Parse("more than one root element".into()));
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: String) -> XlsxResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            if !text.trim().is_empty() || keeps_whitespace(parent) {
                parent.children.push(XmlNode::Text(text));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XlsxError::Parse("text outside of the root element".into())),
    }
}

fn keeps_whitespace(element: &XmlElement) -> bool {
    element.name == "t" || element.attribute("xml:space") == Some("preserve")
}

/// Serialize an element tree; childless elements are written self-closing
pub fn write_element(element: &XmlElement) -> XlsxResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, element)?;
    String::from_utf8(writer.into_inner()).map_err(|e| XlsxError::Parse(e.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> XlsxResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(el) => write_node(writer, el)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
