//! Hit-test augmentation of a window tree
//!
//! Some toolkits host content (web views, hosting views) that the plain
//! depth-first walk does not reach. Hit-testing a point inside the window and
//! walking up to the owning root recovers that content, which is then merged
//! into the window's children unless it is already represented.

use crate::element::Element;
use crate::errors::ExtractionError;
use crate::geometry::{ClipRegion, Point};
use crate::hashing::calculate_hashes;
use crate::provider::{role_is, AttributeProvider, HOSTING_VIEW_SUBROLE, WINDOW_ROLE};
use crate::tree_builder::TreeBuilder;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// What a hit-test merge did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The discovered subtree was appended to the window
    Merged,
    /// A child with the same identity pair already exists
    AlreadyPresent,
    /// The discovered root is the target window itself
    IsTargetWindow,
    /// The discovered root belongs to another on-screen window
    DifferentWindow,
    /// Ascent ended without a window-equivalent ancestor
    NoWindowRoot,
    /// Nothing at the probe point
    NothingAtPoint,
    /// The owning window or the discovered root could not be built
    Unreachable,
}

impl MergeOutcome {
    pub fn merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged)
    }
}

/// Probe point for a window: its native origin offset by `offset` on both axes.
pub fn probe_point(window: &Element, offset: f64) -> Option<Point> {
    window
        .absolute_position
        .map(|origin| origin.offset_by(offset, offset))
}

/// Whether two elements denote the same on-screen window instance.
///
/// Compares name, role, position and size directly; identity hashes are not
/// enough because they ignore the name.
pub fn windows_are_equal(a: &Element, b: &Element) -> bool {
    a.name == b.name && a.role == b.role && a.position == b.position && a.size == b.size
}

/// Walk up from `start` until a window or hosting view is found.
///
/// Native parent graphs are not guaranteed to be acyclic, so the walk stops
/// on a revisited handle or after `max_hops` steps.
pub fn find_window_root<P: AttributeProvider>(
    provider: &P,
    start: &P::Handle,
    max_hops: usize,
) -> Option<P::Handle> {
    let mut visited: HashSet<P::Handle> = HashSet::new();
    let mut current = start.clone();

    for _ in 0..=max_hops {
        if !visited.insert(current.clone()) {
            warn!("[hit_test] Parent cycle detected at {:?}", current);
            return None;
        }
        if is_window_root(provider, &current) {
            return Some(current);
        }
        match provider.parent(&current) {
            Ok(Some(parent)) => current = parent,
            Ok(None) => return None,
            Err(e) => {
                debug!("[hit_test] Failed to read parent of {:?}: {}", current, e);
                return None;
            }
        }
    }

    warn!("[hit_test] No window root within {} hops", max_hops);
    None
}

fn is_window_root<P: AttributeProvider>(provider: &P, handle: &P::Handle) -> bool {
    let role = provider.role(handle).ok().flatten();
    if role.as_deref().is_some_and(|r| role_is(r, WINDOW_ROLE)) {
        return true;
    }
    let subrole = provider.subrole(handle).ok().flatten();
    subrole
        .as_deref()
        .is_some_and(|s| role_is(s, HOSTING_VIEW_SUBROLE))
}

/// Append `subtree` to `window` unless an identical child is already there.
///
/// Only the window's own hashes are recomputed; existing children are left
/// untouched.
pub fn merge_subtree(window: &mut Element, subtree: Element) -> MergeOutcome {
    let duplicate = window.children.iter().any(|child| {
        child.identifier == subtree.identifier
            && child.content_identifier == subtree.content_identifier
    });
    if duplicate {
        debug!("[hit_test] Subtree {} already present", subtree.identifier);
        return MergeOutcome::AlreadyPresent;
    }
    window.children.push(subtree);
    calculate_hashes(window);
    MergeOutcome::Merged
}

/// Hit-test `point` and merge the owning root's subtree into `window`.
///
/// Every failure mode is an outcome, not an error; only cancellation
/// propagates.
#[instrument(level = "debug", skip(builder, window))]
pub fn merge_hit_test<P: AttributeProvider>(
    builder: &TreeBuilder<'_, P>,
    window: &mut Element,
    point: Point,
) -> Result<MergeOutcome, ExtractionError> {
    let provider = builder.provider();
    let config = builder.config();

    let hit = match provider.element_at(point) {
        Ok(Some(hit)) => hit,
        Ok(None) => {
            debug!("[hit_test] Nothing at {:?}", point);
            return Ok(MergeOutcome::NothingAtPoint);
        }
        Err(e) => {
            debug!("[hit_test] Hit test at {:?} failed: {}", point, e);
            return Ok(MergeOutcome::NothingAtPoint);
        }
    };

    let Some(root) = find_window_root(provider, &hit, config.max_parent_hops) else {
        info!("[hit_test] No window root above {:?}, keeping depth-first tree", hit);
        return Ok(MergeOutcome::NoWindowRoot);
    };

    let offset = window.absolute_position.unwrap_or_default();
    let clip = ClipRegion::from(window.visible_bbox);

    if let Ok(Some(owner)) = provider.window(&root) {
        let owner_element =
            match builder.build_subtree(&owner, offset, Some(0), ClipRegion::Unbounded) {
                Ok(element) => element,
                Err(ExtractionError::ProviderUnavailable(msg)) => {
                    warn!("[hit_test] Owning window of {:?} unreachable: {}", root, msg);
                    return Ok(MergeOutcome::Unreachable);
                }
                Err(e) => return Err(e),
            };
        if !windows_are_equal(window, &owner_element) {
            debug!("[hit_test] Root {:?} belongs to another window", root);
            return Ok(MergeOutcome::DifferentWindow);
        }
    }

    let subtree = match builder.build_subtree(&root, offset, config.max_depth, clip) {
        Ok(subtree) => subtree,
        Err(ExtractionError::ProviderUnavailable(msg)) => {
            warn!("[hit_test] Root {:?} unreachable: {}", root, msg);
            return Ok(MergeOutcome::Unreachable);
        }
        Err(e) => return Err(e),
    };
    if windows_are_equal(window, &subtree) {
        return Ok(MergeOutcome::IsTargetWindow);
    }

    let outcome = merge_subtree(window, subtree);
    info!("[hit_test] Merge at {:?}: {:?}", point, outcome);
    Ok(outcome)
}
