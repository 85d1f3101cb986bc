//! Tests for the recorded provider

use super::editor_snapshot;
use crate::errors::ProviderError;
use crate::geometry::Point;
use crate::provider::{AttributeProvider, NativeValue};
use crate::recorded::{RecordedProvider, RecordedSnapshot};

#[test]
fn test_snapshot_json_shape() {
    let raw = r#"{
        "roots": ["w"],
        "elements": {
            "w": {"role": "AXWindow", "position": [0, 0], "size": [10, 10], "children": ["b"]},
            "b": {"role": "AXButton", "value": {"element": "w"}, "failing": ["title"]},
            "c": {"role": "AXCheckBox", "value": true},
            "d": {"role": "AXDateField", "value": {"date": "2024-05-01 10:00:00 +0000"}}
        }
    }"#;
    let snapshot = RecordedSnapshot::from_json(raw).expect("Should parse snapshot");
    let provider = RecordedProvider::new(snapshot);

    assert_eq!(provider.roots(), ["w".to_string()]);
    let b = "b".to_string();
    assert_eq!(
        provider.value(&b),
        Ok(Some(NativeValue::Element("w".to_string())))
    );
    assert!(matches!(provider.title(&b), Err(ProviderError::Backend(_))));
    assert_eq!(
        provider.value(&"c".to_string()),
        Ok(Some(NativeValue::Bool(true)))
    );
    assert_eq!(
        provider.value(&"d".to_string()),
        Ok(Some(NativeValue::Date("2024-05-01 10:00:00 +0000".to_string())))
    );
    assert_eq!(provider.subrole(&b), Ok(None));
}

#[test]
fn test_unknown_handle_is_invalid() {
    let provider = RecordedProvider::new(editor_snapshot());
    assert!(matches!(
        provider.role(&"nope".to_string()),
        Err(ProviderError::InvalidHandle(_))
    ));
}

#[test]
fn test_unavailable_backend() {
    let mut snapshot = editor_snapshot();
    snapshot.unavailable = true;
    let provider = RecordedProvider::new(snapshot);
    assert!(matches!(
        provider.role(&"win".to_string()),
        Err(ProviderError::Unavailable(_))
    ));
    assert!(provider.element_at(Point::new(1.0, 1.0)).is_err());
}

#[test]
fn test_parents_are_linked_from_children() {
    let provider = RecordedProvider::new(editor_snapshot());
    assert_eq!(
        provider.parent(&"save".to_string()),
        Ok(Some("toolbar".to_string()))
    );
    assert_eq!(
        provider.parent(&"text".to_string()),
        Ok(Some("wrapper".to_string()))
    );
    assert_eq!(provider.parent(&"win".to_string()), Ok(None));
}

#[test]
fn test_hit_test_picks_deepest_element() {
    let provider = RecordedProvider::new(editor_snapshot());
    assert_eq!(
        provider.element_at(Point::new(115.0, 115.0)),
        Ok(Some("save".to_string()))
    );
    assert_eq!(
        provider.element_at(Point::new(130.0, 165.0)),
        Ok(Some("text".to_string()))
    );
    assert_eq!(provider.element_at(Point::new(5.0, 5.0)), Ok(None));
}

#[test]
fn test_snapshot_file_round_trip() {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let path = dir.path().join("snapshot.json");
    let snapshot = editor_snapshot();
    std::fs::write(
        &path,
        serde_json::to_string_pretty(&snapshot).expect("Should serialize snapshot"),
    )
    .expect("Should write snapshot");

    let loaded = RecordedSnapshot::from_file(&path).expect("Should load snapshot");
    assert_eq!(loaded, snapshot);
}
