//! Accessibility tree construction
//!
//! Builds a finished [`Element`] subtree from a native handle: window-relative
//! offsets, depth limiting, single-child group flattening, visibility
//! clipping, deterministic child order and bottom-up hashing.

use crate::config::ExtractionConfig;
use crate::element::{Element, ElementValue};
use crate::errors::{ExtractionError, ProviderError};
use crate::geometry::{BBox, ClipRegion, Point, Size};
use crate::hashing::calculate_hashes;
use crate::provider::{
    role_is, AttrResult, AttributeProvider, NativeValue, GROUP_ROLE, NO_ROLE, WINDOW_ROLE,
};
use std::collections::HashSet;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Counters collected while building one tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeBuildStats {
    pub elements_processed: usize,
    pub max_depth_reached: usize,
    pub attribute_errors: usize,
    pub cycles_skipped: usize,
    pub groups_flattened: usize,
}

impl TreeBuildStats {
    fn increment_element_count(&mut self) {
        self.elements_processed += 1;
    }

    fn update_max_depth(&mut self, depth: usize) {
        self.max_depth_reached = self.max_depth_reached.max(depth);
    }

    fn increment_errors(&mut self) {
        self.attribute_errors += 1;
    }
}

/// A node whose children are still being built
struct Frame<H> {
    handle: H,
    element: Element,
    /// Native children not yet visited, reversed so `pop` yields native order
    pending: Vec<H>,
    built: Vec<Element>,
    offset: Point,
    child_depth: Option<usize>,
    child_clip: ClipRegion,
}

impl<H> Frame<H> {
    fn finish(self) -> Element {
        let mut element = self.element;
        let mut children = self.built;
        order_children(&mut children);
        element.children = children;
        calculate_hashes(&mut element);
        element
    }
}

/// Drop children without a resolved position, then order them descending by
/// `(y, x)`: ascending sort followed by a full reversal, ties included.
pub fn order_children(children: &mut Vec<Element>) {
    children.retain(|c| c.position.is_some());
    children.sort_by(|a, b| {
        let (ka, kb) = (order_key(a), order_key(b));
        ka.0.total_cmp(&kb.0).then(ka.1.total_cmp(&kb.1))
    });
    children.reverse();
}

fn order_key(element: &Element) -> (f64, f64) {
    element
        .position
        .map_or((f64::NEG_INFINITY, f64::NEG_INFINITY), |p| (p.y, p.x))
}

/// Builds element trees from an [`AttributeProvider`].
pub struct TreeBuilder<'a, P: AttributeProvider> {
    provider: &'a P,
    config: &'a ExtractionConfig,
    cancel: CancellationToken,
}

impl<'a, P: AttributeProvider> TreeBuilder<'a, P> {
    pub fn new(provider: &'a P, config: &'a ExtractionConfig) -> Self {
        Self {
            provider,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort the build at the next node boundary once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn provider(&self) -> &'a P {
        self.provider
    }

    pub fn config(&self) -> &'a ExtractionConfig {
        self.config
    }

    /// Build the tree under `root` with no offset, the configured depth budget
    /// and no clipping parent.
    pub fn build(&self, root: &P::Handle) -> Result<Element, ExtractionError> {
        self.build_subtree(root, Point::default(), self.config.max_depth, ClipRegion::Unbounded)
    }

    pub fn build_subtree(
        &self,
        root: &P::Handle,
        offset: Point,
        depth: Option<usize>,
        clip: ClipRegion,
    ) -> Result<Element, ExtractionError> {
        self.build_with_stats(root, offset, depth, clip)
            .map(|(element, _)| element)
    }

    /// Build a subtree and report what happened along the way.
    #[instrument(level = "debug", skip(self, root))]
    pub fn build_with_stats(
        &self,
        root: &P::Handle,
        offset: Point,
        depth: Option<usize>,
        clip: ClipRegion,
    ) -> Result<(Element, TreeBuildStats), ExtractionError> {
        let start_time = Instant::now();
        let mut stats = TreeBuildStats::default();
        let element = self.build_inner(root, offset, depth, clip, 0, &mut stats)?;
        info!(
            "[tree_builder] Tree build completed: {} elements, depth {}, {} attribute errors in {:?}",
            stats.elements_processed,
            stats.max_depth_reached,
            stats.attribute_errors,
            start_time.elapsed()
        );
        Ok((element, stats))
    }

    fn build_inner(
        &self,
        root: &P::Handle,
        offset: Point,
        depth: Option<usize>,
        clip: ClipRegion,
        value_nesting: usize,
        stats: &mut TreeBuildStats,
    ) -> Result<Element, ExtractionError> {
        self.check_cancelled()?;
        let root_frame = self.open_node(root.clone(), offset, depth, clip, value_nesting, true, stats)?;

        // handles on the current ancestor path, to break cycles in the native graph
        let mut on_path: HashSet<P::Handle> = HashSet::new();
        on_path.insert(root.clone());
        let mut stack = vec![root_frame];

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.pending.pop() {
                if on_path.contains(&child) {
                    stats.cycles_skipped += 1;
                    debug!("[tree_builder] Skipping {:?}: already an ancestor", child);
                    continue;
                }
                let (offset, child_depth, child_clip) =
                    (frame.offset, frame.child_depth, frame.child_clip);
                self.check_cancelled()?;
                let child_frame = self.open_node(
                    child.clone(),
                    offset,
                    child_depth,
                    child_clip,
                    value_nesting,
                    false,
                    stats,
                )?;
                on_path.insert(child);
                stack.push(child_frame);
                stats.update_max_depth(stack.len() - 1);
                continue;
            }

            let Some(done) = stack.pop() else { break };
            on_path.remove(&done.handle);
            let element = done.finish();
            match stack.last_mut() {
                Some(parent) => parent.built.push(element),
                None => return Ok(element),
            }
        }

        Err(ExtractionError::Worker(
            "tree construction finished without a root".to_string(),
        ))
    }

    fn check_cancelled(&self) -> Result<(), ExtractionError> {
        if self.cancel.is_cancelled() {
            debug!("[tree_builder] Build cancelled");
            return Err(ExtractionError::Cancelled);
        }
        Ok(())
    }

    /// Fetch one node's attributes and its native child list.
    #[allow(clippy::too_many_arguments)]
    fn open_node(
        &self,
        handle: P::Handle,
        mut offset: Point,
        depth: Option<usize>,
        clip: ClipRegion,
        value_nesting: usize,
        is_root: bool,
        stats: &mut TreeBuildStats,
    ) -> Result<Frame<P::Handle>, ExtractionError> {
        stats.increment_element_count();

        let role = match self.provider.role(&handle) {
            Ok(role) => role.unwrap_or_else(|| NO_ROLE.to_string()),
            Err(e) if is_root && e.is_fatal_for_root() => {
                return Err(ExtractionError::ProviderUnavailable(e.to_string()));
            }
            Err(e) => {
                self.note_error(&handle, "role", &e, stats);
                NO_ROLE.to_string()
            }
        };

        let name = self
            .attr(&handle, "title", self.provider.title(&handle), stats)
            .map(|title| {
                if self.config.underscore_titles {
                    title.replace(' ', "_")
                } else {
                    title
                }
            });
        let enabled = self
            .attr(&handle, "enabled", self.provider.enabled(&handle), stats)
            .unwrap_or(false);
        let absolute_position = self.attr(&handle, "position", self.provider.position(&handle), stats);
        let size = self.attr(&handle, "size", self.provider.size(&handle), stats);

        // children of a window are expressed relative to that window
        if role_is(&role, WINDOW_ROLE) {
            if let Some(origin) = absolute_position {
                offset = origin;
            }
        }

        let position = absolute_position.map(|p| p.relative_to(offset));
        let bbox = match (position, size) {
            (Some(p), Some(s)) => Some(BBox::from_geometry(p, s)),
            _ => None,
        };
        let visible_bbox = clip.clip(bbox);
        if bbox.is_none() {
            debug!("[tree_builder] {:?} ({}) has no geometry", handle, role);
        }

        let description = self.attr(&handle, "description", self.provider.description(&handle), stats);
        let role_description = self.attr(
            &handle,
            "role_description",
            self.provider.role_description(&handle),
            stats,
        );
        let value = match self.attr(&handle, "value", self.provider.value(&handle), stats) {
            Some(raw) => Some(self.convert_value(raw, offset, depth, value_nesting, stats)?),
            None => None,
        };

        let (pending, action_items) = if depth == Some(0) {
            (Vec::new(), Vec::new())
        } else {
            let mut children = self.children_for_node(&handle, &role, position, size, stats);
            children.reverse();
            let actions = self
                .attr(&handle, "actions", self.provider.action_names(&handle), stats)
                .unwrap_or_default();
            (children, actions)
        };

        let element = Element {
            role,
            name,
            description,
            role_description,
            value,
            enabled,
            absolute_position,
            position,
            size,
            bbox,
            visible_bbox,
            action_items,
            ..Default::default()
        };

        Ok(Frame {
            handle,
            element,
            pending,
            built: Vec::new(),
            offset,
            child_depth: depth.map(|d| d.saturating_sub(1)),
            child_clip: clip.for_children(bbox, visible_bbox),
        })
    }

    /// Native children of a node, collapsing a pass-through group wrapper.
    ///
    /// A group with exactly one child is skipped over when the child's native
    /// position and size equal the group's window-relative position and size:
    /// the grandchildren are used instead, provided there are any.
    fn children_for_node(
        &self,
        handle: &P::Handle,
        role: &str,
        position: Option<Point>,
        size: Option<Size>,
        stats: &mut TreeBuildStats,
    ) -> Vec<P::Handle> {
        let children = self.native_children(handle, stats);
        if !role_is(role, GROUP_ROLE) || children.len() != 1 {
            return children;
        }
        let (Some(own_position), Some(own_size)) = (position, size) else {
            return children;
        };

        let only = &children[0];
        let child_position = self.attr(only, "position", self.provider.position(only), stats);
        let child_size = self.attr(only, "size", self.provider.size(only), stats);
        if child_position != Some(own_position) || child_size != Some(own_size) {
            return children;
        }

        let grandchildren = self.native_children(only, stats);
        if grandchildren.is_empty() {
            return children;
        }
        stats.groups_flattened += 1;
        debug!(
            "[tree_builder] Flattening wrapper {:?} into {} grandchildren",
            only,
            grandchildren.len()
        );
        grandchildren
    }

    /// Primary child list, falling back to the visible-children attribute.
    fn native_children(&self, handle: &P::Handle, stats: &mut TreeBuildStats) -> Vec<P::Handle> {
        match self.provider.children(handle) {
            Ok(Some(children)) => return children,
            Ok(None) => {}
            Err(e) => self.note_error(handle, "children", &e, stats),
        }
        self.attr(
            handle,
            "visible_children",
            self.provider.visible_children(handle),
            stats,
        )
        .unwrap_or_default()
    }

    fn convert_value(
        &self,
        raw: NativeValue<P::Handle>,
        offset: Point,
        depth: Option<usize>,
        value_nesting: usize,
        stats: &mut TreeBuildStats,
    ) -> Result<ElementValue, ExtractionError> {
        Ok(match raw {
            NativeValue::Text(s) => ElementValue::Text(s),
            NativeValue::Integer(i) => ElementValue::Integer(i),
            NativeValue::Float(f) => ElementValue::Float(f),
            NativeValue::Bool(b) => ElementValue::Bool(b),
            NativeValue::Date(s) => ElementValue::Date(s),
            NativeValue::Opaque(s) => ElementValue::Opaque(s),
            NativeValue::List(items) => ElementValue::List(
                items
                    .into_iter()
                    .map(|item| self.convert_value(item, offset, depth, value_nesting, stats))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            NativeValue::Element(handle) => {
                if value_nesting >= self.config.max_value_nesting {
                    let role = self
                        .attr(&handle, "role", self.provider.role(&handle), stats)
                        .unwrap_or_else(|| NO_ROLE.to_string());
                    ElementValue::Opaque(format!("<{role}>"))
                } else {
                    match self.build_inner(
                        &handle,
                        offset,
                        depth,
                        ClipRegion::Unbounded,
                        value_nesting + 1,
                        stats,
                    ) {
                        Ok(nested) => ElementValue::Element(Box::new(nested)),
                        // an unreachable value element degrades like any other attribute
                        Err(ExtractionError::ProviderUnavailable(msg)) => {
                            debug!("[tree_builder] Value element unavailable: {}", msg);
                            stats.increment_errors();
                            ElementValue::Opaque(format!("<{NO_ROLE}>"))
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        })
    }

    /// Unwrap an attribute fetch, degrading errors to "absent".
    fn attr<T>(
        &self,
        handle: &P::Handle,
        what: &str,
        result: AttrResult<T>,
        stats: &mut TreeBuildStats,
    ) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(e) => {
                self.note_error(handle, what, &e, stats);
                None
            }
        }
    }

    fn note_error(&self, handle: &P::Handle, what: &str, error: &ProviderError, stats: &mut TreeBuildStats) {
        stats.increment_errors();
        debug!(
            "[tree_builder] Failed to read {} of {:?}: {}. Using default.",
            what, handle, error
        );
    }
}
