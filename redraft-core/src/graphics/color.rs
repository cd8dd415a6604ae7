/// Represents a color in PDF documents.
///
/// Supports RGB, Grayscale, and CMYK color spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// RGB color (red, green, blue) with values from 0.0 to 1.0
    Rgb(f64, f64, f64),
    /// Grayscale color with value from 0.0 (black) to 1.0 (white)
    Gray(f64),
    /// CMYK color (cyan, magenta, yellow, key/black) with values from 0.0 to 1.0
    Cmyk(f64, f64, f64, f64),
}

/// Device color spaces a color can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorSpace {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRgb => "DeviceRGB",
            ColorSpace::DeviceCmyk => "DeviceCMYK",
        }
    }

    /// Black in this space, the color a `cs` or `CS` operator selects.
    pub fn initial_color(&self) -> Color {
        match self {
            ColorSpace::DeviceGray => Color::Gray(0.0),
            ColorSpace::DeviceRgb => Color::Rgb(0.0, 0.0, 0.0),
            ColorSpace::DeviceCmyk => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl Color {
    /// Creates an RGB color with values clamped to 0.0-1.0.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    /// Creates a grayscale color with value clamped to 0.0-1.0.
    pub fn gray(value: f64) -> Self {
        Color::Gray(value.clamp(0.0, 1.0))
    }

    /// Creates a CMYK color with values clamped to 0.0-1.0.
    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Color::Cmyk(
            c.clamp(0.0, 1.0),
            m.clamp(0.0, 1.0),
            y.clamp(0.0, 1.0),
            k.clamp(0.0, 1.0),
        )
    }

    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    pub fn white() -> Self {
        Color::Gray(1.0)
    }

    pub fn red() -> Self {
        Color::Rgb(1.0, 0.0, 0.0)
    }

    pub fn green() -> Self {
        Color::Rgb(0.0, 1.0, 0.0)
    }

    pub fn blue() -> Self {
        Color::Rgb(0.0, 0.0, 1.0)
    }

    pub fn color_space(&self) -> ColorSpace {
        match self {
            Color::Rgb(..) => ColorSpace::DeviceRgb,
            Color::Gray(_) => ColorSpace::DeviceGray,
            Color::Cmyk(..) => ColorSpace::DeviceCmyk,
        }
    }

    /// Operands followed by the fill (`stroke == false`) or stroke operator.
    pub(crate) fn operator(&self, stroke: bool) -> String {
        match (self, stroke) {
            (Color::Rgb(r, g, b), false) => format!("{r:.3} {g:.3} {b:.3} rg"),
            (Color::Rgb(r, g, b), true) => format!("{r:.3} {g:.3} {b:.3} RG"),
            (Color::Gray(v), false) => format!("{v:.3} g"),
            (Color::Gray(v), true) => format!("{v:.3} G"),
            (Color::Cmyk(c, m, y, k), false) => format!("{c:.3} {m:.3} {y:.3} {k:.3} k"),
            (Color::Cmyk(c, m, y, k), true) => format!("{c:.3} {m:.3} {y:.3} {k:.3} K"),
        }
    }
}
