//! Accessibility tree extraction
//!
//! Turns a native accessibility graph, reached through an
//! [`AttributeProvider`], into a normalized tree of [`Element`]s: window
//! relative geometry, visibility clipping, deterministic child order and
//! content/structure identity hashes. The tree can be augmented with
//! hit-tested content, serialized to JSON, and rendered as a color-coded
//! segmentation overlay.
//!
//! ```no_run
//! use axtree::{ExtractionConfig, Extractor, RecordedProvider, RecordedSnapshot};
//!
//! let snapshot = RecordedSnapshot::from_file("snapshot.json").unwrap();
//! let provider = RecordedProvider::new(snapshot);
//! let config = ExtractionConfig::default();
//! let roots = provider.roots().to_vec();
//! let extraction = Extractor::new(&provider, &config).extract_all(&roots);
//! println!("{}", axtree::to_json(&extraction.windows).unwrap());
//! ```

pub mod config;
pub mod element;
pub mod errors;
pub mod extractor;
pub mod geometry;
pub mod hashing;
pub mod hit_test;
pub mod provider;
pub mod recorded;
pub mod segmentation;
pub mod serializer;
#[cfg(test)]
mod tests;
pub mod tree_builder;
pub mod tree_formatter;

pub use config::{DisplayScale, ExtractionConfig};
pub use element::{Element, ElementValue};
pub use errors::{ExtractionError, ProviderError, RenderError};
pub use extractor::{extract_windows, select_main_window, Extractor, WindowExtraction, WindowFailure};
pub use geometry::{clip, BBox, ClipRegion, Point, Size};
pub use hit_test::{merge_hit_test, MergeOutcome};
pub use provider::{AttrResult, AttributeProvider, NativeValue};
pub use recorded::{RecordedElement, RecordedProvider, RecordedSnapshot, RecordedValue};
pub use segmentation::{color_for_role, Canvas, NamedColor, SegmentationRenderer};
pub use serializer::{to_json, to_json_envelope, SerializedElement, TreeEnvelope};
pub use tokio_util::sync::CancellationToken;
pub use tree_builder::{TreeBuildStats, TreeBuilder};
pub use tree_formatter::{format_forest, format_tree, TreeFormattingResult};
