//! Debug overlay: color-coded outlines for every visible descendant
//!
//! Draws onto any [`Canvas`]; an implementation for `image::RgbaImage` is
//! provided so a screenshot can be annotated and saved as PNG.

use crate::config::DisplayScale;
use crate::element::Element;
use crate::errors::{ExtractionError, RenderError};
use crate::provider::bare_role;
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Outline stroke width in device pixels
pub const STROKE_WIDTH: u32 = 2;

/// Named outline colors used by the role table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Brown,
    Pink,
    Cyan,
    Magenta,
    LightBlue,
    LightGreen,
    LightYellow,
    Lavender,
    PeachPuff,
    LightSalmon,
    LightPink,
    LightCyan,
    Plum,
    DarkRed,
    DarkBlue,
    DarkGreen,
    Olive,
    RebeccaPurple,
    DarkOrange,
    SaddleBrown,
    PaleVioletRed,
    DarkCyan,
    DarkMagenta,
    Black,
    White,
    LightGray,
    DarkGray,
    Salmon,
    BurlyWood,
    DarkYellow,
}

impl NamedColor {
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            NamedColor::Red => [255, 0, 0],
            NamedColor::Blue => [0, 0, 255],
            NamedColor::Green => [0, 128, 0],
            NamedColor::Yellow => [255, 255, 0],
            NamedColor::Purple => [128, 0, 128],
            NamedColor::Orange => [255, 165, 0],
            NamedColor::Brown => [165, 42, 42],
            NamedColor::Pink => [255, 192, 203],
            NamedColor::Cyan => [0, 255, 255],
            NamedColor::Magenta => [255, 0, 255],
            NamedColor::LightBlue => [173, 216, 230],
            NamedColor::LightGreen => [144, 238, 144],
            NamedColor::LightYellow => [255, 255, 224],
            NamedColor::Lavender => [230, 230, 250],
            NamedColor::PeachPuff => [255, 218, 185],
            NamedColor::LightSalmon => [255, 160, 122],
            NamedColor::LightPink => [255, 182, 193],
            NamedColor::LightCyan => [224, 255, 255],
            NamedColor::Plum => [221, 160, 221],
            NamedColor::DarkRed => [139, 0, 0],
            NamedColor::DarkBlue => [0, 0, 139],
            NamedColor::DarkGreen => [0, 100, 0],
            NamedColor::Olive => [128, 128, 0],
            NamedColor::RebeccaPurple => [102, 51, 153],
            NamedColor::DarkOrange => [255, 140, 0],
            NamedColor::SaddleBrown => [139, 69, 19],
            NamedColor::PaleVioletRed => [219, 112, 147],
            NamedColor::DarkCyan => [0, 139, 139],
            NamedColor::DarkMagenta => [139, 0, 139],
            NamedColor::Black => [0, 0, 0],
            NamedColor::White => [255, 255, 255],
            NamedColor::LightGray => [211, 211, 211],
            NamedColor::DarkGray => [169, 169, 169],
            NamedColor::Salmon => [250, 128, 114],
            NamedColor::BurlyWood => [222, 184, 135],
            NamedColor::DarkYellow => [155, 135, 12],
        }
    }

    pub fn rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.rgb();
        Rgba([r, g, b, 255])
    }
}

/// Color used for roles missing from the table
pub const FALLBACK_COLOR: NamedColor = NamedColor::Red;

/// Outline color for a role. The platform prefix is ignored, so "AXButton"
/// and "Button" share a color. Assignments are stable across releases.
pub fn color_for_role(role: &str) -> NamedColor {
    use NamedColor::*;
    match bare_role(role) {
        "Button" => Blue,
        "TextField" => Green,
        "StaticText" => Yellow,
        "Image" => Purple,
        "Group" => Orange,
        "ScrollBar" => Brown,
        "Row" => Pink,
        "Column" => Cyan,
        "Cell" => Magenta,
        "Table" => LightBlue,
        "Outline" => LightGreen,
        "LayoutArea" => LightYellow,
        "LayoutItem" => Lavender,
        "Handle" => PeachPuff,
        "Splitter" => LightSalmon,
        "Incrementor" => LightPink,
        "BusyIndicator" => LightCyan,
        "ProgressIndicator" => Plum,
        "Toolbar" => DarkRed,
        "Popover" => DarkBlue,
        "Menu" => DarkGreen,
        "MenuItem" => Olive,
        "MenuBar" => RebeccaPurple,
        "MenuBarItem" => DarkOrange,
        "MenuButton" => SaddleBrown,
        "MenuItemCheckbox" => PaleVioletRed,
        "MenuItemRadio" => DarkCyan,
        "MenuItemPopover" => DarkMagenta,
        "MenuItemSplitter" => Black,
        "MenuItemTable" => White,
        "MenuItemTextField" => LightGray,
        "MenuItemStaticText" => DarkGray,
        "MenuItemImage" => Salmon,
        "MenuItemGroup" => LightBlue,
        "MenuItemScrollBar" => LightGreen,
        "MenuItemRow" => LightYellow,
        "MenuItemColumn" => Lavender,
        "MenuItemCell" => PeachPuff,
        "MenuItemOutline" => BurlyWood,
        "MenuItemLayoutArea" => LightPink,
        "MenuItemLayoutItem" => LightCyan,
        "MenuItemHandle" => Plum,
        "MenuItemIncrementor" => DarkBlue,
        "MenuItemBusyIndicator" => DarkGreen,
        "MenuItemProgressIndicator" => DarkYellow,
        "MenuItemToolbar" => RebeccaPurple,
        _ => FALLBACK_COLOR,
    }
}

/// Raster surface the renderer draws on
pub trait Canvas {
    /// Outline the rectangle `top_left..=bottom_right` (device pixels)
    fn draw_rect_outline(
        &mut self,
        top_left: (f64, f64),
        bottom_right: (f64, f64),
        color: NamedColor,
        width: u32,
    ) -> Result<(), RenderError>;
}

impl Canvas for RgbaImage {
    fn draw_rect_outline(
        &mut self,
        top_left: (f64, f64),
        bottom_right: (f64, f64),
        color: NamedColor,
        width: u32,
    ) -> Result<(), RenderError> {
        let coords = [top_left.0, top_left.1, bottom_right.0, bottom_right.1];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(RenderError::NonFinite);
        }
        let [x0, y0, x1, y1] = coords.map(|c| c.round() as i64);
        if x1 < x0 || y1 < y0 {
            return Err(RenderError::Degenerate { x0, y0, x1, y1 });
        }

        let rgba = color.rgba();
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));
        let mut put = |x: i64, y: i64| {
            if (0..w).contains(&x) && (0..h).contains(&y) {
                self.put_pixel(x as u32, y as u32, rgba);
            }
        };

        // stroke grows inward, one ring per pixel of width
        for inset in 0..i64::from(width) {
            let (lx, ty, rx, by) = (x0 + inset, y0 + inset, x1 - inset, y1 - inset);
            if rx < lx || by < ty {
                break;
            }
            // only the on-canvas span of each edge is walked
            for x in lx.max(0)..=rx.min(w - 1) {
                put(x, ty);
                put(x, by);
            }
            for y in ty.max(0)..=by.min(h - 1) {
                put(lx, y);
                put(rx, y);
            }
        }
        Ok(())
    }
}

/// Device-pixel rectangle computed for one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceRect {
    pub top_left: (f64, f64),
    pub bottom_right: (f64, f64),
}

/// Counters from one render pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub drawn: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Paints the visible descendants of a tree, never the root itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentationRenderer {
    scale: DisplayScale,
}

impl SegmentationRenderer {
    pub fn new(scale: DisplayScale) -> Self {
        Self { scale }
    }

    /// Device rectangle for an element, or `None` when it is not drawn.
    ///
    /// The bottom-right corner is pulled in by one pixel (two vertically for
    /// elements at least two points tall) and then clamped so it never
    /// precedes the top-left corner on either axis.
    pub fn device_rect(&self, element: &Element) -> Option<DeviceRect> {
        let bbox = element.visible_bbox?;
        let size = element.size?;
        if size.is_empty() {
            return None;
        }
        let s = self.scale.factor();
        let height_offset = if size.height < 2.0 { 0.0 } else { 2.0 };

        let top_left = (bbox.x0 as f64 * s, bbox.y0 as f64 * s);
        let mut bottom_right = (
            bbox.x1 as f64 * s - 1.0,
            bbox.y1 as f64 * s - height_offset + 1.0,
        );
        if bottom_right.0 < 0.0 || bottom_right.0 < top_left.0 {
            bottom_right.0 = top_left.0;
        }
        if bottom_right.1 < 0.0 || bottom_right.1 < top_left.1 {
            bottom_right.1 = top_left.1;
        }
        Some(DeviceRect {
            top_left,
            bottom_right,
        })
    }

    /// Walk `root`'s descendants depth-first, left to right, drawing each one.
    ///
    /// Elements without a visible box or with zero size are skipped along with
    /// their descendants. A failed draw is logged and the walk continues into
    /// that element's children.
    #[instrument(level = "debug", skip(self, root, canvas))]
    pub fn render<C: Canvas + ?Sized>(&self, root: &Element, canvas: &mut C) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut stack: Vec<&Element> = root.children.iter().rev().collect();

        while let Some(element) = stack.pop() {
            let Some(rect) = self.device_rect(element) else {
                stats.skipped += 1;
                continue;
            };
            let color = color_for_role(&element.role);
            match canvas.draw_rect_outline(rect.top_left, rect.bottom_right, color, STROKE_WIDTH) {
                Ok(()) => stats.drawn += 1,
                Err(e) => {
                    stats.failed += 1;
                    warn!(
                        "[segmentation] Error drawing rectangle for {} {:?}: {}",
                        element.role, rect, e
                    );
                }
            }
            stack.extend(element.children.iter().rev());
        }

        debug!(
            "[segmentation] Drew {} rectangles ({} skipped, {} failed)",
            stats.drawn, stats.skipped, stats.failed
        );
        stats
    }

    /// Annotate a screenshot (or a blank canvas sized to the root) and save it.
    pub fn segment_to_file(
        &self,
        root: &Element,
        base_image: Option<&Path>,
        output: &Path,
    ) -> Result<RenderStats, ExtractionError> {
        let mut canvas = match base_image {
            Some(path) => image::open(path)?.to_rgba8(),
            None => self.blank_canvas(root),
        };
        let stats = self.render(root, &mut canvas);
        canvas.save(output)?;
        info!(
            "[segmentation] Saving segmented image to {}",
            output.display()
        );
        Ok(stats)
    }

    /// White canvas covering the root's bounding box in device pixels
    pub fn blank_canvas(&self, root: &Element) -> RgbaImage {
        let s = self.scale.factor();
        let (w, h) = root
            .size
            .map(|size| ((size.width * s).ceil(), (size.height * s).ceil()))
            .unwrap_or((1.0, 1.0));
        RgbaImage::from_pixel(
            (w.max(1.0)) as u32,
            (h.max(1.0)) as u32,
            NamedColor::White.rgba(),
        )
    }
}
