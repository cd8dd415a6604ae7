//! Drawing-state values pushed on the graphics axis of the state stacks.

mod color;

pub use color::{Color, ColorSpace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineCap {
    Butt = 0,
    Round = 1,
    Square = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineJoin {
    Miter = 0,
    Round = 1,
    Bevel = 2,
}

/// Line dash pattern specification
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineDashPattern {
    /// Array of dash and gap lengths
    pub array: Vec<f64>,
    /// Phase offset
    pub phase: f64,
}

impl LineDashPattern {
    pub fn new(array: Vec<f64>, phase: f64) -> Self {
        Self { array, phase }
    }

    pub fn solid() -> Self {
        Self::default()
    }

    pub fn dashed(dash_length: f64, gap_length: f64) -> Self {
        Self {
            array: vec![dash_length, gap_length],
            phase: 0.0,
        }
    }

    pub fn to_pdf_string(&self) -> String {
        if self.array.is_empty() {
            "[] 0".to_string()
        } else {
            let array_str = self
                .array
                .iter()
                .map(|&x| format!("{x:.2}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("[{array_str}] {:.2}", self.phase)
        }
    }
}

/// One frame of drawing state.
///
/// Frames are plain values: a `q` pushes a copy of the current frame and a
/// `Q` pops it, so the stack mirrors the content stream's save/restore
/// nesting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphicState {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub fill_color_space: ColorSpace,
    pub stroke_color_space: ColorSpace,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub dash: LineDashPattern,
}

impl Default for GraphicState {
    fn default() -> Self {
        Self {
            fill_color: Color::black(),
            stroke_color: Color::black(),
            fill_color_space: ColorSpace::DeviceGray,
            stroke_color_space: ColorSpace::DeviceGray,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            dash: LineDashPattern::solid(),
        }
    }
}

impl GraphicState {
    pub fn with_fill_color(mut self, color: Color) -> Self {
        self.fill_color_space = color.color_space();
        self.fill_color = color;
        self
    }

    pub fn with_stroke_color(mut self, color: Color) -> Self {
        self.stroke_color_space = color.color_space();
        self.stroke_color = color;
        self
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width.max(0.0);
        self
    }

    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    pub fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    pub fn with_dash(mut self, dash: LineDashPattern) -> Self {
        self.dash = dash;
        self
    }

    /// Selecting a color space resets the fill color to that space's
    /// initial color.
    pub fn with_fill_color_space(mut self, space: ColorSpace) -> Self {
        self.fill_color_space = space;
        self.fill_color = space.initial_color();
        self
    }

    pub fn with_stroke_color_space(mut self, space: ColorSpace) -> Self {
        self.stroke_color_space = space;
        self.stroke_color = space.initial_color();
        self
    }
}
