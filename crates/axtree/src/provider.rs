//! Seam between the tree algorithms and a native accessibility backend
//!
//! Platform backends (AX on macOS, UIA on Windows, AT-SPI on Linux) live
//! outside this crate. They only need to answer per-element attribute queries.

use crate::errors::ProviderError;
use crate::geometry::{Point, Size};
use std::fmt::Debug;
use std::hash::Hash;

/// Result of a single attribute fetch. `Ok(None)` means the attribute is
/// simply absent, which is not an error.
pub type AttrResult<T> = Result<Option<T>, ProviderError>;

/// Raw value attribute of a native element
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue<H> {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Dates are carried in their canonical string form
    Date(String),
    /// Any other backend object, in its canonical string form
    Opaque(String),
    List(Vec<NativeValue<H>>),
    /// The value is itself an accessible element
    Element(H),
}

/// Per-element attribute access on a native accessibility graph.
///
/// Implementations must be cheap to share across worker threads; the
/// multi-window extractor hands an `Arc<P>` to every worker.
pub trait AttributeProvider: Send + Sync {
    type Handle: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn role(&self, element: &Self::Handle) -> AttrResult<String>;

    fn subrole(&self, _element: &Self::Handle) -> AttrResult<String> {
        Ok(None)
    }

    fn title(&self, element: &Self::Handle) -> AttrResult<String>;

    fn enabled(&self, element: &Self::Handle) -> AttrResult<bool>;

    /// Position in native screen coordinates
    fn position(&self, element: &Self::Handle) -> AttrResult<Point>;

    fn size(&self, element: &Self::Handle) -> AttrResult<Size>;

    fn description(&self, element: &Self::Handle) -> AttrResult<String>;

    fn role_description(&self, element: &Self::Handle) -> AttrResult<String>;

    fn value(&self, element: &Self::Handle) -> AttrResult<NativeValue<Self::Handle>>;

    /// Ordered child handles
    fn children(&self, element: &Self::Handle) -> AttrResult<Vec<Self::Handle>>;

    /// Fallback child list used when [`AttributeProvider::children`] is absent
    fn visible_children(&self, _element: &Self::Handle) -> AttrResult<Vec<Self::Handle>> {
        Ok(None)
    }

    fn action_names(&self, element: &Self::Handle) -> AttrResult<Vec<String>>;

    fn parent(&self, element: &Self::Handle) -> AttrResult<Self::Handle>;

    /// Owning window of an element, when the backend exposes it directly
    fn window(&self, _element: &Self::Handle) -> AttrResult<Self::Handle> {
        Ok(None)
    }

    /// Topmost element at a screen point
    fn element_at(&self, point: Point) -> AttrResult<Self::Handle>;
}

/// Strip the platform prefix from a role ("AXWindow" -> "Window").
pub fn bare_role(role: &str) -> &str {
    role.strip_prefix("AX").unwrap_or(role)
}

/// Compare a role against a bare role name, ignoring the platform prefix.
pub fn role_is(role: &str, bare: &str) -> bool {
    bare_role(role) == bare
}

pub const WINDOW_ROLE: &str = "Window";
pub const GROUP_ROLE: &str = "Group";
pub const BUTTON_ROLE: &str = "Button";
pub const HOSTING_VIEW_SUBROLE: &str = "HostingView";

/// Role substituted when the provider reports none
pub const NO_ROLE: &str = "No role";
