//! Formula state of a cell
//!
//! A cell either has no formula, a normal formula, a shared formula (as the
//! master that carries the text and the covered range, or as a dependent that
//! only carries the group id), or a formula of some other kind (`array`,
//! `dataTable`, vendor kinds) whose attributes are kept verbatim.

use std::fmt;

use crate::error::{Error, Result};

/// Text returned for the formula of a shared-formula dependent
pub const SHARED_FORMULA_MARKER: &str = "SHARED";

/// The `t` attribute of an `<f>` node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaKind {
    /// Plain formula (the attribute is omitted)
    #[default]
    Normal,
    /// Member of a shared-formula group
    Shared,
    /// Array formula
    Array,
    /// Anything else, kept as written
    Other(String),
}

impl FormulaKind {
    /// Interpret a `t` attribute; a missing attribute means `normal`
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("normal") => FormulaKind::Normal,
            Some("shared") => FormulaKind::Shared,
            Some("array") => FormulaKind::Array,
            Some(other) => FormulaKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FormulaKind::Normal => "normal",
            FormulaKind::Shared => "shared",
            FormulaKind::Array => "array",
            FormulaKind::Other(s) => s,
        }
    }
}

impl fmt::Display for FormulaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formula text, kind and shared-formula linkage of one cell
///
/// `reference` can only be set on a shared formula; for every other kind a
/// `ref` or `si` attribute is kept with the other unrecognized attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormulaState {
    kind: FormulaKind,
    text: Option<String>,
    reference: Option<String>,
    shared_id: Option<u32>,
    extra_attributes: Vec<(String, String)>,
}

impl FormulaState {
    /// A normal formula
    pub fn normal<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// The master of a shared-formula group
    pub fn shared_master<S: Into<String>, R: Into<String>>(id: u32, text: S, reference: R) -> Self {
        Self {
            kind: FormulaKind::Shared,
            text: Some(text.into()),
            reference: Some(reference.into()),
            shared_id: Some(id),
            extra_attributes: Vec::new(),
        }
    }

    /// A dependent of a shared-formula group
    pub fn shared_dependent(id: u32) -> Self {
        Self {
            kind: FormulaKind::Shared,
            shared_id: Some(id),
            ..Self::default()
        }
    }

    /// A shared-group member; it is the master when `reference` is given
    pub fn shared(id: u32, text: Option<String>, reference: Option<String>) -> Self {
        Self {
            kind: FormulaKind::Shared,
            text: text.filter(|t| !t.is_empty()),
            reference,
            shared_id: Some(id),
            extra_attributes: Vec::new(),
        }
    }

    /// Build the state from the attributes and text of an `<f>` node
    pub fn from_attributes(attributes: &[(String, String)], text: Option<String>) -> Result<Self> {
        let kind = FormulaKind::from_attr(
            attributes
                .iter()
                .find(|(k, _)| k == "t")
                .map(|(_, v)| v.as_str()),
        );
        let shared = kind == FormulaKind::Shared;

        let mut state = Self {
            kind,
            text: text.filter(|t| !t.is_empty()),
            ..Self::default()
        };

        for (key, value) in attributes {
            match key.as_str() {
                "t" => {}
                "ref" if shared => state.reference = Some(value.clone()),
                "si" if shared => {
                    let id = value.trim().parse::<u32>().map_err(|_| {
                        Error::InvalidFormula(format!("shared formula id '{}'", value))
                    })?;
                    state.shared_id = Some(id);
                }
                _ => state.extra_attributes.push((key.clone(), value.clone())),
            }
        }

        Ok(state)
    }

    /// Attributes to write on the `<f>` node: preserved ones first, then
    /// `t` (omitted for normal formulas), `ref` and `si`
    pub fn to_attributes(&self) -> Vec<(String, String)> {
        let mut attributes = self.extra_attributes.clone();
        if self.kind != FormulaKind::Normal {
            attributes.push(("t".to_string(), self.kind.as_str().to_string()));
        }
        if let Some(reference) = &self.reference {
            attributes.push(("ref".to_string(), reference.clone()));
        }
        if let Some(id) = self.shared_id {
            attributes.push(("si".to_string(), id.to_string()));
        }
        attributes
    }

    pub fn kind(&self) -> &FormulaKind {
        &self.kind
    }

    /// The formula text stored on this cell
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Range covered by a shared formula; only set on the master
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn shared_id(&self) -> Option<u32> {
        self.shared_id
    }

    /// `<f>` attributes that are not interpreted, in document order
    pub fn extra_attributes(&self) -> &[(String, String)] {
        &self.extra_attributes
    }

    /// Check if this is the master of a shared-formula group
    pub fn is_shared_master(&self) -> bool {
        self.kind == FormulaKind::Shared && self.reference.is_some()
    }

    /// Check if this cell belongs to shared-formula group `id`
    pub fn shares(&self, id: u32) -> bool {
        self.kind == FormulaKind::Shared && self.shared_id == Some(id)
    }

    /// The authoritative text of a shared-formula group, only known to the master
    pub fn shared_ref_formula(&self) -> Option<&str> {
        if self.is_shared_master() {
            self.text()
        } else {
            None
        }
    }

    /// The formula as presented to users
    ///
    /// A master answers with its own text, any other shared member with
    /// [`SHARED_FORMULA_MARKER`], everything else with the stored text.
    pub fn display_formula(&self) -> Option<&str> {
        if let Some(text) = self.shared_ref_formula() {
            return Some(text);
        }
        if self.kind == FormulaKind::Shared {
            return Some(SHARED_FORMULA_MARKER);
        }
        self.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_kind_from_attr() {
        assert_eq!(FormulaKind::from_attr(None), FormulaKind::Normal);
        assert_eq!(FormulaKind::from_attr(Some("shared")), FormulaKind::Shared);
        assert_eq!(FormulaKind::from_attr(Some("array")), FormulaKind::Array);
        assert_eq!(
            FormulaKind::from_attr(Some("dataTable")),
            FormulaKind::Other("dataTable".into())
        );
        assert_eq!(FormulaKind::Other("dataTable".into()).to_string(), "dataTable");
    }

    #[test]
    fn test_parse_normal_formula() {
        let state = FormulaState::from_attributes(&[], Some("A1+1".into())).unwrap();
        assert_eq!(state.kind(), &FormulaKind::Normal);
        assert_eq!(state.text(), Some("A1+1"));
        assert_eq!(state.reference(), None);
        assert_eq!(state.shared_id(), None);
        assert!(state.extra_attributes().is_empty());
        assert!(state.to_attributes().is_empty());
    }

    #[test]
    fn test_parse_shared_master() {
        let state = FormulaState::from_attributes(
            &attrs(&[("t", "shared"), ("ref", "A1:C1"), ("si", "3")]),
            Some("A1*A2".into()),
        )
        .unwrap();
        assert_eq!(state, FormulaState::shared_master(3, "A1*A2", "A1:C1"));
        assert!(state.is_shared_master());
        assert_eq!(state.shared_ref_formula(), Some("A1*A2"));
        assert_eq!(state.display_formula(), Some("A1*A2"));
        assert_eq!(
            state.to_attributes(),
            attrs(&[("t", "shared"), ("ref", "A1:C1"), ("si", "3")])
        );
    }

    #[test]
    fn test_shared_dependent() {
        let state =
            FormulaState::from_attributes(&attrs(&[("t", "shared"), ("si", "3")]), None).unwrap();
        assert_eq!(state, FormulaState::shared_dependent(3));
        assert!(state.shares(3));
        assert!(!state.shares(4));
        assert_eq!(state.shared_ref_formula(), None);
        assert_eq!(state.display_formula(), Some(SHARED_FORMULA_MARKER));
    }

    #[test]
    fn test_dependent_with_own_text_still_reads_shared() {
        let state = FormulaState::from_attributes(
            &attrs(&[("t", "shared"), ("si", "3")]),
            Some("FORMULA".into()),
        )
        .unwrap();
        assert_eq!(state.text(), Some("FORMULA"));
        assert_eq!(state.display_formula(), Some(SHARED_FORMULA_MARKER));
        assert_eq!(state.shared_ref_formula(), None);
    }

    #[test]
    fn test_array_keeps_ref_verbatim() {
        let state = FormulaState::from_attributes(
            &attrs(&[("t", "array"), ("ref", "A1:A3")]),
            Some("{1,2,3}".into()),
        )
        .unwrap();
        assert_eq!(state.kind(), &FormulaKind::Array);
        assert_eq!(state.reference(), None);
        assert_eq!(state.shared_ref_formula(), None);
        assert!(!state.shares(0));
        assert_eq!(state.display_formula(), Some("{1,2,3}"));
        assert_eq!(
            state.to_attributes(),
            attrs(&[("ref", "A1:A3"), ("t", "array")])
        );
    }

    #[test]
    fn test_unknown_attributes_preserved() {
        let state = FormulaState::from_attributes(
            &attrs(&[("t", "TYPE"), ("foo", "foo"), ("bar", "bar")]),
            None,
        )
        .unwrap();
        assert_eq!(state.kind(), &FormulaKind::Other("TYPE".into()));
        assert_eq!(state.text(), None);
        assert_eq!(state.extra_attributes(), attrs(&[("foo", "foo"), ("bar", "bar")]));
        assert_eq!(
            state.to_attributes(),
            attrs(&[("foo", "foo"), ("bar", "bar"), ("t", "TYPE")])
        );

        // Normal formulas omit `t` but keep the rest
        let state =
            FormulaState::from_attributes(&attrs(&[("foo", "foo")]), Some("FORMULA".into()))
                .unwrap();
        assert_eq!(state.to_attributes(), attrs(&[("foo", "foo")]));
    }

    #[test]
    fn test_shared_constructor() {
        assert_eq!(
            FormulaState::shared(2, Some("A1".into()), Some("A1:A4".into())),
            FormulaState::shared_master(2, "A1", "A1:A4")
        );
        assert_eq!(FormulaState::shared(2, None, None), FormulaState::shared_dependent(2));
    }

    #[test]
    fn test_invalid_shared_id() {
        let result = FormulaState::from_attributes(&attrs(&[("t", "shared"), ("si", "x")]), None);
        assert!(matches!(result, Err(Error::InvalidFormula(_))));
    }
}
