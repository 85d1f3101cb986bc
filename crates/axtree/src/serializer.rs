//! Deterministic JSON form of element trees
//!
//! Positions are rendered as `"x;y"` with two decimals, sizes as `"w;h"` with
//! none, and an absent geometry field as `""`.

use crate::element::{Element, ElementValue};
use crate::geometry::{BBox, Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized form of one node. The field set is fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedElement {
    pub id: String,
    pub name: Option<String>,
    pub role: String,
    pub description: Option<String>,
    pub role_description: Option<String>,
    pub value: Value,
    pub absolute_position: String,
    pub position: String,
    pub size: String,
    pub enabled: bool,
    pub bbox: Option<BBox>,
    pub visible_bbox: Option<BBox>,
    pub children: Vec<SerializedElement>,
}

/// Timed output wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnvelope {
    /// Capture start, milliseconds since the Unix epoch
    pub time: i64,
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    pub duration_ms: u64,
    pub tree: Vec<SerializedElement>,
}

impl TreeEnvelope {
    pub fn new(time: i64, duration_ms: u64, tree: Vec<SerializedElement>) -> Self {
        Self {
            time,
            data: EnvelopeData { duration_ms, tree },
        }
    }
}

pub fn format_position(point: Option<Point>) -> String {
    point.map_or_else(String::new, |p| format!("{:.2};{:.2}", p.x, p.y))
}

pub fn format_size(size: Option<Size>) -> String {
    size.map_or_else(String::new, |s| format!("{:.0};{:.0}", s.width, s.height))
}

/// Node fields without children
fn serialize_node(element: &Element) -> SerializedElement {
    SerializedElement {
        id: element.identifier.clone(),
        name: element.name.clone(),
        role: element.role.clone(),
        description: element.description.clone(),
        role_description: element.role_description.clone(),
        value: element.value.as_ref().map_or(Value::Null, value_to_json),
        absolute_position: format_position(element.absolute_position),
        position: format_position(element.position),
        size: format_size(element.size),
        enabled: element.enabled,
        bbox: element.bbox,
        visible_bbox: element.visible_bbox,
        children: Vec::with_capacity(element.children.len()),
    }
}

/// Convert a tree depth-first, preserving child order.
pub fn to_serialized(root: &Element) -> SerializedElement {
    // (source node, its serialized form, index of the next child to visit)
    let mut stack: Vec<(&Element, SerializedElement, usize)> =
        vec![(root, serialize_node(root), 0)];

    while let Some(top) = stack.last_mut() {
        let source: &Element = top.0;
        let index = top.2;
        top.2 += 1;
        if let Some(child) = source.children.get(index) {
            stack.push((child, serialize_node(child), 0));
            continue;
        }
        let Some((_, done, _)) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.1.children.push(done),
            None => return done,
        }
    }
    unreachable!("the root is returned before the stack empties")
}

fn value_to_json(value: &ElementValue) -> Value {
    match value {
        ElementValue::Text(s) | ElementValue::Date(s) | ElementValue::Opaque(s) => {
            Value::String(s.clone())
        }
        ElementValue::Integer(i) => Value::from(*i),
        ElementValue::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
        ElementValue::Bool(b) => Value::Bool(*b),
        ElementValue::List(items) => Value::Array(items.iter().map(value_to_json).collect()),
        ElementValue::Element(e) => {
            serde_json::to_value(to_serialized(e)).unwrap_or(Value::Null)
        }
    }
}

pub fn to_json(roots: &[Element]) -> Result<String, serde_json::Error> {
    let tree: Vec<SerializedElement> = roots.iter().map(to_serialized).collect();
    serde_json::to_string_pretty(&tree)
}

pub fn to_json_envelope(
    roots: &[Element],
    time: i64,
    duration_ms: u64,
) -> Result<String, serde_json::Error> {
    let tree: Vec<SerializedElement> = roots.iter().map(to_serialized).collect();
    serde_json::to_string_pretty(&TreeEnvelope::new(time, duration_ms, tree))
}
