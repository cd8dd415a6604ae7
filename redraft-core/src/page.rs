use crate::geometry::Rectangle;
use crate::state::BoundingBox;
use crate::template::TemplatePage;

/// Page margins in points (1/72 inch).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(36.0)
    }
}

/// Standard and custom page sizes, portrait dimensions in points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSize {
    /// 595 x 842 points
    A4,
    /// 612 x 792 points
    Letter,
    /// 612 x 1008 points
    Legal,
    Custom { width: f64, height: f64 },
}

impl PageSize {
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Geometry used to build a page: size, orientation and margins.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageLayout {
    pub size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
        }
    }
}

impl PageLayout {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn landscape(mut self) -> Self {
        self.orientation = Orientation::Landscape;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Width and height after applying the orientation.
    pub fn dimensions(&self) -> (f64, f64) {
        let (width, height) = self.size.dimensions();
        match self.orientation {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        }
    }

    pub fn media_box(&self) -> Rectangle {
        let (width, height) = self.dimensions();
        Rectangle::from_position_and_size(0.0, 0.0, width, height)
    }

    /// The area inside the margins, the root frame of the bounds axis.
    pub fn margin_box(&self) -> BoundingBox {
        let (width, height) = self.dimensions();
        BoundingBox::new(
            self.margins.left,
            height - self.margins.top,
            (width - self.margins.left - self.margins.right).max(0.0),
            (height - self.margins.top - self.margins.bottom).max(0.0),
        )
    }
}

/// Options for [`crate::Document::start_new_page`].
///
/// Without a layout the page inherits the layout currently on top of the
/// layout axis.
#[derive(Clone, Debug, Default)]
pub struct PageOptions {
    pub layout: Option<PageLayout>,
    pub template: Option<TemplatePage>,
}

impl PageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: PageLayout) -> Self {
        Self {
            layout: Some(layout),
            template: None,
        }
    }

    pub fn from_template(template: TemplatePage) -> Self {
        Self {
            layout: template.layout,
            template: Some(template),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_dimensions() {
        assert_eq!(PageSize::A4.dimensions(), (595.0, 842.0));
        assert_eq!(PageSize::Letter.dimensions(), (612.0, 792.0));
        assert_eq!(
            PageSize::Custom {
                width: 100.0,
                height: 50.0
            }
            .dimensions(),
            (100.0, 50.0)
        );
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let layout = PageLayout::new(PageSize::Letter).landscape();
        assert_eq!(layout.dimensions(), (792.0, 612.0));
        assert_eq!(layout.media_box().to_array(), [0.0, 0.0, 792.0, 612.0]);
    }

    #[test]
    fn test_margin_box() {
        let layout = PageLayout::new(PageSize::Letter).with_margins(Margins::uniform(72.0));
        let bounds = layout.margin_box();

        assert_eq!(bounds.left, 72.0);
        assert_eq!(bounds.top, 720.0);
        assert_eq!(bounds.width, 468.0);
        assert_eq!(bounds.height, 648.0);
        assert_eq!(bounds.bottom(), 72.0);
    }

    #[test]
    fn test_margins_larger_than_page_clamp() {
        let layout = PageLayout::new(PageSize::Custom {
            width: 50.0,
            height: 50.0,
        })
        .with_margins(Margins::uniform(40.0));

        assert_eq!(layout.margin_box().width, 0.0);
        assert_eq!(layout.margin_box().height, 0.0);
    }
}
