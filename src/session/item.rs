//! Coalescing of the two item event schemas.
//!
//! Codex has emitted item events in two shapes over time:
//!
//! ```text
//! {"type":"item.completed","item_id":"i1","item_type":"agent_message","content":"Done"}
//! {"type":"item.completed","item":{"id":"i1","type":"agent_message","text":"Done"}}
//! ```
//!
//! Both are normalized into a [`RawItem`] before any handler looks at them,
//! so the handlers never branch on the schema.

use serde_json::{Map, Value};

/// Item fields resolved from either schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawItem {
    pub id: Option<String>,
    pub item_type: Option<String>,
    /// Flat `content`, else nested `item.text`
    pub content: Option<String>,
    /// Top-level event fields
    pub event: Map<String, Value>,
    /// Nested `item` object (empty for the flat schema)
    pub nested: Map<String, Value>,
}

impl RawItem {
    /// Resolve id/type/content from a decoded item event.
    pub fn from_event(event: &Map<String, Value>) -> Self {
        let nested = event
            .get("item")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let id = str_field(event, "item_id").or_else(|| str_field(&nested, "id"));
        let item_type = str_field(event, "item_type").or_else(|| str_field(&nested, "type"));
        let content = str_field(event, "content").or_else(|| str_field(&nested, "text"));

        Self {
            id,
            item_type,
            content,
            event: event.clone(),
            nested,
        }
    }

    /// Look up a field at the event level first, then inside `item`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.event
            .get(name)
            .filter(|v| !v.is_null())
            .or_else(|| self.nested.get(name).filter(|v| !v.is_null()))
    }

    /// String variant of [`field`](Self::field).
    pub fn str_field(&self, name: &str) -> Option<String> {
        str_field(&self.event, name).or_else(|| str_field(&self.nested, name))
    }
}

fn str_field(map: &Map<String, Value>, name: &str) -> Option<String> {
    map.get(name).and_then(Value::as_str).map(str::to_string)
}
