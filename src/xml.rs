//! Decode API XML into a `serde_json::Value` tree.
//!
//! The mapper navigates a conventional tree shape rather than raw XML:
//! attributes become `@name` entries, element text next to attributes or
//! children becomes a `#text` entry, text-only elements collapse to plain
//! strings, childless attribute-less elements become null, and repeated
//! sibling elements coerce to arrays. Element and attribute names keep only
//! their local part; namespace prefixes and `xmlns` declarations are
//! dropped.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Errors from XML decoding.
#[derive(thiserror::Error, Debug)]
pub enum XmlError {
    #[error("Invalid XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("Unexpected end of document")]
    Truncated,

    #[error("Document has no root element")]
    NoRoot,
}

/// An open element while decoding.
struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String, fields: Map<String, Value>) -> Self {
        Self {
            name,
            fields,
            text: String::new(),
        }
    }

    /// Collapse a closed element into its tree value.
    fn close(self) -> Value {
        let mut fields = self.fields;
        if fields.is_empty() {
            if self.text.is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            }
        } else {
            if !self.text.is_empty() {
                fields.insert("#text".to_string(), Value::String(self.text));
            }
            Value::Object(fields)
        }
    }
}

/// Decode an XML document into its tree form.
///
/// The returned value is an object with a single entry: the root element's
/// local name mapped to its subtree.
pub fn parse(xml: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Bottom frame collects the root element; it is never popped by an
    // end tag because the reader rejects unbalanced documents.
    let mut stack: Vec<Frame> = vec![Frame::new(String::new(), Map::new())];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                let fields = attr_fields(&e);
                stack.push(Frame::new(name, fields));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                let node = Frame::new(String::new(), attr_fields(&e)).close();
                if let Some(parent) = stack.last_mut() {
                    insert_child(&mut parent.fields, name, node);
                }
            }
            Event::Text(e) => {
                if let Some(frame) = stack.last_mut() {
                    let text = e.unescape().unwrap_or_default();
                    frame.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    let bytes = e.into_inner();
                    let text = String::from_utf8_lossy(&bytes);
                    frame.text.push_str(&text);
                }
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(frame) = stack.pop() {
                        let name = frame.name.clone();
                        let node = frame.close();
                        if let Some(parent) = stack.last_mut() {
                            insert_child(&mut parent.fields, name, node);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(XmlError::Truncated);
    }
    match stack.pop() {
        Some(doc) if !doc.fields.is_empty() => Ok(Value::Object(doc.fields)),
        _ => Err(XmlError::NoRoot),
    }
}

/// Collect element attributes as `@name` entries, skipping namespace
/// declarations.
fn attr_fields(e: &quick_xml::events::BytesStart<'_>) -> Map<String, Value> {
    let mut fields = Map::new();
    for attr in e.attributes().flatten() {
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let name = format!(
            "@{}",
            String::from_utf8_lossy(attr.key.local_name().as_ref())
        );
        let value = attr.unescape_value().unwrap_or_default().to_string();
        fields.insert(name, Value::String(value));
    }
    fields
}

/// Insert a child node, coercing repeated sibling names to an array.
fn insert_child(fields: &mut Map<String, Value>, name: String, node: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(node),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, node]);
        }
        None => {
            fields.insert(name, node);
        }
    }
}

// ── Node access helpers ─────────────────────────────────────────────────────

/// Text content of a node: a plain string, or the `#text` entry of an
/// element that also carries attributes or children.
pub fn node_text(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("#text")
            .and_then(|t| t.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

/// Text content of the named child, if present.
pub fn child_text(node: &Value, key: &str) -> Option<String> {
    node.get(key).and_then(node_text)
}

/// Value of the named attribute (`@name` entry), if present.
pub fn node_attr(node: &Value, name: &str) -> Option<String> {
    node.get(format!("@{name}").as_str())
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Integer value of a node's text; `None` when absent or unparseable.
pub fn node_int(node: &Value) -> Option<i64> {
    node.as_i64()
        .or_else(|| node_text(node).and_then(|s| s.trim().parse().ok()))
}

/// Integer value of the named child's text.
pub fn child_int(node: &Value, key: &str) -> Option<i64> {
    node.get(key).and_then(node_int)
}

/// Normalize an object-or-array node to a list of element nodes.
///
/// A document with one repeated element decodes to a lone object where a
/// document with several decodes to an array; callers that expect a
/// collection go through this so both shapes read the same way.
pub fn as_list(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
