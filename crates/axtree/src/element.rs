//! The finished accessibility element tree

use crate::geometry::{BBox, Point, Size};
use crate::provider::{role_is, BUTTON_ROLE, WINDOW_ROLE};
use std::fmt;

/// Value attribute of a finished element.
///
/// An element-valued attribute owns an independent subtree; it never points
/// back into the tree it was found in.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(String),
    Opaque(String),
    List(Vec<ElementValue>),
    Element(Box<Element>),
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Text(s) | ElementValue::Date(s) | ElementValue::Opaque(s) => {
                write!(f, "{s}")
            }
            ElementValue::Integer(i) => write!(f, "{i}"),
            ElementValue::Float(v) => write!(f, "{v}"),
            ElementValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            ElementValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ElementValue::Element(e) => write!(
                f,
                "<Element role={} id={} content={}>",
                e.role, e.identifier, e.content_identifier
            ),
        }
    }
}

/// One node of the accessibility tree.
#[derive(Clone, PartialEq, Default)]
pub struct Element {
    pub role: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub role_description: Option<String>,
    pub value: Option<ElementValue>,
    pub enabled: bool,
    /// Native screen position, before any offset adjustment
    pub absolute_position: Option<Point>,
    /// Position relative to the owning window
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub bbox: Option<BBox>,
    pub visible_bbox: Option<BBox>,
    /// Structural hash (geometry, enabled, role)
    pub identifier: String,
    /// Content hash aggregated from the children
    pub content_identifier: String,
    pub action_items: Vec<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Screen-space center, when geometry is known
    pub fn center(&self) -> Option<Point> {
        let pos = self.absolute_position?;
        let size = self.size?;
        Some(Point::new(
            pos.x + size.width / 2.0,
            pos.y + size.height / 2.0,
        ))
    }

    pub fn is_button(&self) -> bool {
        role_is(&self.role, BUTTON_ROLE)
    }

    pub fn is_window(&self) -> bool {
        role_is(&self.role, WINDOW_ROLE)
    }

    /// Pre-order walk over every descendant (self excluded)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    pub fn descendant_count(&self) -> usize {
        self.descendants().count()
    }
}

/// Iterator returned by [`Element::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        s.field("role", &self.role)
            .field("name", &self.name)
            .field("bbox", &self.bbox)
            .field("visible_bbox", &self.visible_bbox)
            .field("identifier", &self.identifier);
        if !self.children.is_empty() {
            // summarized so deep trees stay readable in logs
            s.field("children", &format!("[{} children]", self.children.len()));
        }
        s.finish()
    }
}
