//! Wire-level data structures for the bar.
//!
//! All structs tolerate loosely-conforming input: optional fields default,
//! unknown context keys and stale ids are resolved (and recovered from) at
//! render time, never during deserialization.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level payload consumed from the data source.
///
/// A document without a `collections` field deserializes to an empty payload,
/// which renders as "nothing to show" rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarData {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

/// A named tab holding an ordered list of items.
///
/// `name` doubles as the persistence key for the tab, so it must be stable
/// across reloads of the same logical collection. Item order is render order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    /// Icon name shown in the tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Named visual classifications referenced by items via their `context`
    /// key. Declaration order is preserved.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub contexts: IndexMap<String, ItemContext>,
    /// Text shown when the collection has no items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A reusable visual classification shared by items within one collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemContext {
    /// Badge label; the context key is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Badge background: a palette keyword (`error`, `warning`, `success`,
    /// `info`, `important`) or a literal `#rrggbb` color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Badge text color, same forms as `background`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Icon name shown in the badge instead of the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Whether an item renders as a collapsible disclosure or a flat row.
///
/// Computed once during the id-assignment pass so renderers switch on an
/// explicit discriminant instead of re-deriving it from optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemKind {
    #[default]
    Leaf,
    Expandable,
}

/// A node in the recursive content tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    /// Stable identifier used for deep-linking and state restoration.
    /// Assigned by [`crate::tree::assign_ids`] when absent on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Key into the owning collection's `contexts` map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Small text shown at the right of the title, e.g. `2` or `"3 errors"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Detail>,
    /// Body text revealed when the item is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Code block revealed when the item is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Sub-items revealed when the item is expanded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    /// Actions shown under the item whenever it is visible.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    /// Render discriminant; not part of the wire format.
    #[serde(skip)]
    pub kind: ItemKind,
}

impl Item {
    /// An item is expandable iff it carries non-empty `text`, `code`, or
    /// sub-items.
    pub fn classify(&self) -> ItemKind {
        let has_text = self.text.as_deref().is_some_and(|t| !t.is_empty());
        let has_code = self.code.as_deref().is_some_and(|c| !c.is_empty());
        if has_text || has_code || !self.items.is_empty() {
            ItemKind::Expandable
        } else {
            ItemKind::Leaf
        }
    }
}

/// Item detail text; a string or a number on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Detail {
    Text(String),
    Number(f64),
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Text(text) => f.write_str(text),
            Detail::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Detail::Number(n) => write!(f, "{n}"),
        }
    }
}

/// An action attached to an item: a navigable link (`href` present), a
/// host-interpreted handler (`onclick` present), or a message button
/// (`data` present and no `onclick`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Opaque handler reference interpreted by the host, never executed by
    /// the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onclick: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Link target hint, e.g. `_blank`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Scalar payload delivered on the outbound action channel.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub data: IndexMap<String, Value>,
}

/// Message delivered to the outbound action channel when a data action is
/// activated: the owning item plus the action's payload, at most once per
/// activation per render.
#[derive(Debug, Clone, Serialize)]
pub struct ActionMessage {
    pub item: Item,
    pub data: IndexMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collections_field_deserializes_to_empty_payload() {
        let data: BarData = serde_json::from_str("{}").unwrap();
        assert!(data.collections.is_empty());
    }

    #[test]
    fn collection_tolerates_absent_optional_fields() {
        let collection: Collection =
            serde_json::from_str(r#"{"name":"Errors","items":[]}"#).unwrap();
        assert_eq!(collection.name, "Errors");
        assert!(collection.icon.is_none());
        assert!(collection.contexts.is_empty());
        assert!(collection.empty.is_none());
    }

    #[test]
    fn classify_requires_non_empty_body() {
        let mut item: Item = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(item.classify(), ItemKind::Leaf);

        item.text = Some(String::new());
        assert_eq!(item.classify(), ItemKind::Leaf);

        item.text = Some("line 3".into());
        assert_eq!(item.classify(), ItemKind::Expandable);

        item.text = None;
        item.items.push(serde_json::from_str(r#"{"title":"child"}"#).unwrap());
        assert_eq!(item.classify(), ItemKind::Expandable);
    }

    #[test]
    fn detail_accepts_strings_and_numbers() {
        let text: Detail = serde_json::from_str(r#""3 errors""#).unwrap();
        assert_eq!(text.to_string(), "3 errors");

        let count: Detail = serde_json::from_str("4").unwrap();
        assert_eq!(count.to_string(), "4");
    }

    #[test]
    fn action_data_preserves_declaration_order() {
        let action: Action = serde_json::from_str(
            r#"{"text":"Fix","data":{"action":"fix","severity":2,"force":true}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = action.data.keys().map(String::as_str).collect();
        assert_eq!(keys, ["action", "severity", "force"]);
    }
}
