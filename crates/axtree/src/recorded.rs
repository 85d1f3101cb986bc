//! Provider backed by a recorded native element graph
//!
//! A snapshot file captures what a native backend reported for each element,
//! so trees can be rebuilt, diffed and annotated offline. It doubles as the
//! fixture backend for tests.

use crate::errors::{ExtractionError, ProviderError};
use crate::geometry::{Point, Size};
use crate::provider::{AttrResult, AttributeProvider, NativeValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Recorded value attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedValue {
    /// `{"element": "<id>"}`
    Element { element: String },
    /// `{"date": "<canonical form>"}`
    Date { date: String },
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<RecordedValue>),
}

impl RecordedValue {
    fn to_native(&self) -> NativeValue<String> {
        match self {
            RecordedValue::Element { element } => NativeValue::Element(element.clone()),
            RecordedValue::Date { date } => NativeValue::Date(date.clone()),
            RecordedValue::Bool(b) => NativeValue::Bool(*b),
            RecordedValue::Integer(i) => NativeValue::Integer(*i),
            RecordedValue::Float(f) => NativeValue::Float(*f),
            RecordedValue::Text(s) => NativeValue::Text(s.clone()),
            RecordedValue::List(items) => {
                NativeValue::List(items.iter().map(RecordedValue::to_native).collect())
            }
        }
    }
}

/// Attributes recorded for one native element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedElement {
    pub role: Option<String>,
    pub subrole: Option<String>,
    pub title: Option<String>,
    pub enabled: Option<bool>,
    /// `[x, y]` in screen coordinates
    pub position: Option<[f64; 2]>,
    /// `[width, height]`
    pub size: Option<[f64; 2]>,
    pub description: Option<String>,
    pub role_description: Option<String>,
    pub value: Option<RecordedValue>,
    pub children: Option<Vec<String>>,
    pub visible_children: Option<Vec<String>>,
    pub actions: Option<Vec<String>>,
    pub parent: Option<String>,
    pub window: Option<String>,
    /// Attributes whose fetch fails instead of being absent
    pub failing: Vec<String>,
}

impl RecordedElement {
    pub fn new(role: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            ..Default::default()
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some([x, y]);
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = Some([width, height]);
        self
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_value(mut self, value: RecordedValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_subrole(mut self, subrole: &str) -> Self {
        self.subrole = Some(subrole.to_string());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = Some(children.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_visible_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible_children = Some(children.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_actions(mut self, actions: &[&str]) -> Self {
        self.actions = Some(actions.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn with_window(mut self, window: &str) -> Self {
        self.window = Some(window.to_string());
        self
    }

    pub fn failing_on(mut self, attribute: &str) -> Self {
        self.failing.push(attribute.to_string());
        self
    }
}

/// A recorded native element graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedSnapshot {
    /// Top-level handles, usually windows
    pub roots: Vec<String>,
    pub elements: BTreeMap<String, RecordedElement>,
    /// Simulates a backend that cannot be reached at all
    pub unavailable: bool,
}

impl RecordedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, ExtractionError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Add an element. Parent links of its children are filled in when missing.
    pub fn element(mut self, id: &str, element: RecordedElement) -> Self {
        for child in element.children.iter().flatten() {
            if let Some(existing) = self.elements.get_mut(child) {
                existing.parent.get_or_insert_with(|| id.to_string());
            }
        }
        let mut element = element;
        if element.parent.is_none() {
            element.parent = self
                .elements
                .iter()
                .find(|(_, e)| e.children.iter().flatten().any(|c| c == id))
                .map(|(parent_id, _)| parent_id.clone());
        }
        self.elements.insert(id.to_string(), element);
        self
    }

    pub fn root(mut self, id: &str) -> Self {
        self.roots.push(id.to_string());
        self
    }

    pub fn with_parent(mut self, id: &str, parent: &str) -> Self {
        if let Some(e) = self.elements.get_mut(id) {
            e.parent = Some(parent.to_string());
        }
        self
    }
}

/// [`AttributeProvider`] over a [`RecordedSnapshot`]
#[derive(Debug, Clone)]
pub struct RecordedProvider {
    snapshot: RecordedSnapshot,
}

impl RecordedProvider {
    pub fn new(snapshot: RecordedSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn roots(&self) -> &[String] {
        &self.snapshot.roots
    }

    pub fn snapshot(&self) -> &RecordedSnapshot {
        &self.snapshot
    }

    fn lookup(&self, handle: &String, attribute: &str) -> Result<&RecordedElement, ProviderError> {
        if self.snapshot.unavailable {
            return Err(ProviderError::Unavailable(
                "recorded backend marked unavailable".to_string(),
            ));
        }
        let element = self
            .snapshot
            .elements
            .get(handle)
            .ok_or_else(|| ProviderError::InvalidHandle(handle.clone()))?;
        if element.failing.iter().any(|a| a == attribute) {
            return Err(ProviderError::Backend(format!(
                "recorded failure reading {attribute} of {handle}"
            )));
        }
        Ok(element)
    }

    fn depth_of(&self, handle: &String) -> usize {
        let mut seen = HashSet::new();
        let mut depth = 0;
        let mut current = handle;
        while let Some(parent) = self
            .snapshot
            .elements
            .get(current)
            .and_then(|e| e.parent.as_ref())
        {
            if !seen.insert(parent) {
                break;
            }
            depth += 1;
            current = parent;
        }
        depth
    }
}

impl AttributeProvider for RecordedProvider {
    type Handle = String;

    fn role(&self, element: &String) -> AttrResult<String> {
        Ok(self.lookup(element, "role")?.role.clone())
    }

    fn subrole(&self, element: &String) -> AttrResult<String> {
        Ok(self.lookup(element, "subrole")?.subrole.clone())
    }

    fn title(&self, element: &String) -> AttrResult<String> {
        Ok(self.lookup(element, "title")?.title.clone())
    }

    fn enabled(&self, element: &String) -> AttrResult<bool> {
        Ok(self.lookup(element, "enabled")?.enabled)
    }

    fn position(&self, element: &String) -> AttrResult<Point> {
        Ok(self
            .lookup(element, "position")?
            .position
            .map(|[x, y]| Point::new(x, y)))
    }

    fn size(&self, element: &String) -> AttrResult<Size> {
        Ok(self
            .lookup(element, "size")?
            .size
            .map(|[w, h]| Size::new(w, h)))
    }

    fn description(&self, element: &String) -> AttrResult<String> {
        Ok(self.lookup(element, "description")?.description.clone())
    }

    fn role_description(&self, element: &String) -> AttrResult<String> {
        Ok(self
            .lookup(element, "role_description")?
            .role_description
            .clone())
    }

    fn value(&self, element: &String) -> AttrResult<NativeValue<String>> {
        Ok(self
            .lookup(element, "value")?
            .value
            .as_ref()
            .map(RecordedValue::to_native))
    }

    fn children(&self, element: &String) -> AttrResult<Vec<String>> {
        Ok(self.lookup(element, "children")?.children.clone())
    }

    fn visible_children(&self, element: &String) -> AttrResult<Vec<String>> {
        Ok(self
            .lookup(element, "visible_children")?
            .visible_children
            .clone())
    }

    fn action_names(&self, element: &String) -> AttrResult<Vec<String>> {
        Ok(self.lookup(element, "actions")?.actions.clone())
    }

    fn parent(&self, element: &String) -> AttrResult<String> {
        Ok(self.lookup(element, "parent")?.parent.clone())
    }

    fn window(&self, element: &String) -> AttrResult<String> {
        Ok(self.lookup(element, "window")?.window.clone())
    }

    /// Deepest element whose recorded rectangle contains the point
    fn element_at(&self, point: Point) -> AttrResult<String> {
        if self.snapshot.unavailable {
            return Err(ProviderError::Unavailable(
                "recorded backend marked unavailable".to_string(),
            ));
        }
        let hit = self
            .snapshot
            .elements
            .iter()
            .filter(|(_, e)| match (e.position, e.size) {
                (Some([x, y]), Some([w, h])) => {
                    point.x >= x && point.x < x + w && point.y >= y && point.y < y + h
                }
                _ => false,
            })
            .map(|(id, _)| (self.depth_of(id), id))
            // max_by_key keeps the last maximum; ids iterate in sorted order
            .max_by_key(|(depth, _)| *depth)
            .map(|(_, id)| id.clone());
        debug!("[recorded] Hit test at {:?} -> {:?}", point, hit);
        Ok(hit)
    }
}
