mod config_tests;
mod recorded_tests;

use crate::element::Element;
use crate::errors::ProviderError;
use crate::geometry::{Point, Size};
use crate::provider::{AttrResult, AttributeProvider, NativeValue};
use crate::recorded::{RecordedElement, RecordedProvider, RecordedSnapshot, RecordedValue};

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Editor-like window at screen (100, 100):
///
/// ```text
/// win      Window "Main Window"  (100,100) 400x300
///   toolbar  Toolbar             (100,100) 400x40
///     save     Button "Save"     (110,110) 50x20
///     open     Button "Open"     (170,110) 50x20
///   content  Group               (100,140) 400x260
///     wrapper  Group             (100,140) 400x260
///       text     StaticText      (120,160) 100x20  value "Hello"
///       field    TextField       (120,200) 200x30  value "typed"
///   offscreen Button             (1000,1000) 10x10
/// ```
pub(crate) fn editor_snapshot() -> RecordedSnapshot {
    RecordedSnapshot::new()
        .root("win")
        .element(
            "win",
            RecordedElement::new("AXWindow")
                .titled("Main Window")
                .enabled(true)
                .at(100.0, 100.0)
                .sized(400.0, 300.0)
                .with_children(["toolbar", "content", "offscreen"]),
        )
        .element(
            "toolbar",
            RecordedElement::new("AXToolbar")
                .enabled(true)
                .at(100.0, 100.0)
                .sized(400.0, 40.0)
                .with_children(["save", "open"]),
        )
        .element(
            "save",
            RecordedElement::new("AXButton")
                .titled("Save")
                .enabled(true)
                .at(110.0, 110.0)
                .sized(50.0, 20.0)
                .with_actions(&["AXPress"]),
        )
        .element(
            "open",
            RecordedElement::new("AXButton")
                .titled("Open")
                .enabled(true)
                .at(170.0, 110.0)
                .sized(50.0, 20.0)
                .with_actions(&["AXPress"]),
        )
        .element(
            "content",
            RecordedElement::new("AXGroup")
                .at(100.0, 140.0)
                .sized(400.0, 260.0)
                .with_children(["wrapper"]),
        )
        .element(
            "wrapper",
            RecordedElement::new("AXGroup")
                .at(100.0, 140.0)
                .sized(400.0, 260.0)
                .with_children(["text", "field"]),
        )
        .element(
            "text",
            RecordedElement::new("AXStaticText")
                .at(120.0, 160.0)
                .sized(100.0, 20.0)
                .with_value(RecordedValue::Text("Hello".to_string())),
        )
        .element(
            "field",
            RecordedElement::new("AXTextField")
                .enabled(true)
                .at(120.0, 200.0)
                .sized(200.0, 30.0)
                .with_value(RecordedValue::Text("typed".to_string())),
        )
        .element(
            "offscreen",
            RecordedElement::new("AXButton")
                .at(1000.0, 1000.0)
                .sized(10.0, 10.0),
        )
}

pub(crate) fn editor_provider() -> RecordedProvider {
    RecordedProvider::new(editor_snapshot())
}

/// Leaf element with geometry and no hashes
pub(crate) fn element_at(role: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    Element {
        role: role.to_string(),
        position: Some(Point::new(x, y)),
        absolute_position: Some(Point::new(x, y)),
        size: Some(Size::new(w, h)),
        bbox: Some(crate::geometry::BBox::from_geometry(
            Point::new(x, y),
            Size::new(w, h),
        )),
        visible_bbox: Some(crate::geometry::BBox::from_geometry(
            Point::new(x, y),
            Size::new(w, h),
        )),
        ..Default::default()
    }
}

/// Provider whose every fetch fails with the same error
pub(crate) struct FailingProvider {
    pub error: ProviderError,
}

impl FailingProvider {
    pub fn new(error: ProviderError) -> Self {
        Self { error }
    }

    fn fail<T>(&self) -> AttrResult<T> {
        Err(self.error.clone())
    }
}

impl AttributeProvider for FailingProvider {
    type Handle = u32;

    fn role(&self, _: &u32) -> AttrResult<String> {
        self.fail()
    }
    fn title(&self, _: &u32) -> AttrResult<String> {
        self.fail()
    }
    fn enabled(&self, _: &u32) -> AttrResult<bool> {
        self.fail()
    }
    fn position(&self, _: &u32) -> AttrResult<Point> {
        self.fail()
    }
    fn size(&self, _: &u32) -> AttrResult<Size> {
        self.fail()
    }
    fn description(&self, _: &u32) -> AttrResult<String> {
        self.fail()
    }
    fn role_description(&self, _: &u32) -> AttrResult<String> {
        self.fail()
    }
    fn value(&self, _: &u32) -> AttrResult<NativeValue<u32>> {
        self.fail()
    }
    fn children(&self, _: &u32) -> AttrResult<Vec<u32>> {
        self.fail()
    }
    fn action_names(&self, _: &u32) -> AttrResult<Vec<String>> {
        self.fail()
    }
    fn parent(&self, _: &u32) -> AttrResult<u32> {
        self.fail()
    }
    fn element_at(&self, _: Point) -> AttrResult<u32> {
        self.fail()
    }
}
