//! Structural and content identity hashes
//!
//! Both hashes are hex strings of a 128-bit BLAKE3 digest. The empty string
//! hashes to `""` rather than to a digest: downstream consumers treat `""` as
//! "field absent", so that convention is part of the format.

use crate::element::Element;

/// Digest length in bytes (128 bits)
const DIGEST_BYTES: usize = 16;

/// Hash a string to lowercase hex, or `""` for empty input.
pub fn hash_from_string(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let digest = blake3::hash(input.as_bytes());
    digest.as_bytes()[..DIGEST_BYTES]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn enabled_token(enabled: bool) -> &'static str {
    if enabled {
        "True"
    } else {
        "False"
    }
}

/// Structural hash over window-relative geometry, enabled state and role.
/// `""` when position or size is unknown.
pub fn structural_hash(element: &Element) -> String {
    let (Some(pos), Some(size)) = (element.position, element.size) else {
        return String::new();
    };
    let position_string = format!("{:.0};{:.0}", pos.x, pos.y);
    let size_string = format!("{:.0};{:.0}", size.width, size.height);
    hash_from_string(&format!(
        "{position_string}{size_string}{}{}",
        enabled_token(element.enabled),
        element.role
    ))
}

/// Hash of the element's own descriptive text and value.
pub fn single_content_hash(element: &Element) -> String {
    let value = element
        .value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_default();
    hash_from_string(&format!(
        "{}{}{}{}",
        element.description.as_deref().unwrap_or(""),
        element.role_description.as_deref().unwrap_or(""),
        element.name.as_deref().unwrap_or(""),
        value
    ))
}

/// Content hash aggregated over already-finalized children.
///
/// Child content hashes are sorted (order-independent) while child structural
/// hashes keep tree order (order-sensitive). A leaf yields `""`.
pub fn aggregate_content_hash(children: &[Element]) -> String {
    if children.is_empty() {
        return String::new();
    }
    let mut content_hashes: Vec<&str> = children
        .iter()
        .map(|c| c.content_identifier.as_str())
        .collect();
    content_hashes.sort_unstable();
    let structure: String = children.iter().map(|c| c.identifier.as_str()).collect();

    let content_hash = hash_from_string(&content_hashes.concat());
    let structure_hash = hash_from_string(&structure);
    hash_from_string(&format!("{content_hash}{structure_hash}"))
}

/// Set `identifier` and `content_identifier` on a node whose children are final.
pub fn calculate_hashes(element: &mut Element) {
    element.identifier = structural_hash(element);
    element.content_identifier = aggregate_content_hash(&element.children);
}
