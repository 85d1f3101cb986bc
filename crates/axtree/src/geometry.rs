//! Geometry primitives and the visibility clipper
//!
//! Positions and sizes stay floating point as the accessibility backends
//! report them; bounding boxes are integer rectangles `[x0, y0, x1, y1]`.

use serde::{Deserialize, Serialize};

/// A point in logical (point) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Subtract a window offset. Negative offset components are clamped to zero,
    /// so an element is never pushed away from the window origin.
    pub fn relative_to(&self, offset: Point) -> Point {
        Point {
            x: self.x - offset.x.max(0.0),
            y: self.y - offset.y.max(0.0),
        }
    }

    pub fn offset_by(&self, dx: f64, dy: f64) -> Point {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Width and height of an element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Integer rectangle, serialized as `[x0, y0, x1, y1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i64; 4]", into = "[i64; 4]")]
pub struct BBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl BBox {
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Bounding box of an element from its window-relative position and size.
    /// Coordinates are truncated toward zero.
    pub fn from_geometry(position: Point, size: Size) -> Self {
        Self {
            x0: position.x as i64,
            y0: position.y as i64,
            x1: (position.x + size.width) as i64,
            y1: (position.y + size.height) as i64,
        }
    }

    /// Whether the two rectangles are disjoint on either axis.
    /// Touching edges count as overlapping.
    pub fn is_disjoint(&self, other: &BBox) -> bool {
        self.x0 > other.x1 || self.y0 > other.y1 || self.x1 < other.x0 || self.y1 < other.y0
    }

    pub fn intersect(&self, other: &BBox) -> Option<BBox> {
        if self.is_disjoint(other) {
            return None;
        }
        Some(BBox {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        })
    }

    pub fn contains(&self, other: &BBox) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }

    pub fn width(&self) -> i64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i64 {
        self.y1 - self.y0
    }
}

impl From<[i64; 4]> for BBox {
    fn from(v: [i64; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [i64; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// Clip an element's bounding box against its parent's visible box.
///
/// * no bbox -> `None`
/// * no parent box (root call) -> the bbox itself
/// * disjoint -> `None`
/// * otherwise the intersection
pub fn clip(bbox: Option<BBox>, parent_visible_bbox: Option<BBox>) -> Option<BBox> {
    let bbox = bbox?;
    match parent_visible_bbox {
        None => Some(bbox),
        Some(parent) => bbox.intersect(&parent),
    }
}

/// Clip context handed from a node to its children during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipRegion {
    /// No ancestor restricts visibility (tree root)
    Unbounded,
    /// Nearest ancestor visible box
    Region(BBox),
    /// An ancestor is entirely out of view, so every descendant is too
    Occluded,
}

impl ClipRegion {
    pub fn clip(&self, bbox: Option<BBox>) -> Option<BBox> {
        match self {
            ClipRegion::Unbounded => clip(bbox, None),
            ClipRegion::Region(parent) => clip(bbox, Some(*parent)),
            ClipRegion::Occluded => None,
        }
    }

    /// Region a node passes to its children.
    pub fn for_children(&self, bbox: Option<BBox>, visible_bbox: Option<BBox>) -> ClipRegion {
        match (bbox, visible_bbox) {
            (_, Some(visible)) => ClipRegion::Region(visible),
            (Some(_), None) => ClipRegion::Occluded,
            // no geometry of its own: inherit the nearest ancestor's region
            (None, None) => *self,
        }
    }
}

impl From<Option<BBox>> for ClipRegion {
    fn from(value: Option<BBox>) -> Self {
        match value {
            Some(b) => ClipRegion::Region(b),
            None => ClipRegion::Unbounded,
        }
    }
}
