//! Content stream operators and the drawing helpers built on them.

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::geometry::Rectangle;
use crate::graphics::{Color, ColorSpace, LineCap, LineDashPattern, LineJoin};
use crate::objects::{Dictionary, Object};
use crate::state::{Axis, BoundingBox, Frame, Indent};

/// Resource name of the font used by [`Document::text`].
pub const DEFAULT_FONT_NAME: &str = "F1";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
/// Line height as a multiple of the font size.
pub const LEADING_FACTOR: f64 = 1.2;

/// Accumulates content stream operators.
#[derive(Debug, Clone, Default)]
pub struct ContentBuilder {
    operations: String,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.operations.push_str("q\n");
        self
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.operations.push_str("Q\n");
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push_line(format!("{x:.2} {y:.2} m"))
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push_line(format!("{x:.2} {y:.2} l"))
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.push_line(format!("{x:.2} {y:.2} {width:.2} {height:.2} re"))
    }

    pub fn fill(&mut self) -> &mut Self {
        self.operations.push_str("f\n");
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.operations.push_str("S\n");
        self
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.push_line(format!("{width:.2} w"))
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        self.push_line(format!("{} J", cap as u8))
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> &mut Self {
        self.push_line(format!("{} j", join as u8))
    }

    pub fn set_dash(&mut self, dash: &LineDashPattern) -> &mut Self {
        self.push_line(format!("{} d", dash.to_pdf_string()))
    }

    pub fn set_fill_color_space(&mut self, space: ColorSpace) -> &mut Self {
        self.push_line(format!("/{} cs", space.pdf_name()))
    }

    pub fn set_stroke_color_space(&mut self, space: ColorSpace) -> &mut Self {
        self.push_line(format!("/{} CS", space.pdf_name()))
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        self.push_line(color.operator(false))
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        self.push_line(color.operator(true))
    }

    /// A complete text object showing `text` at `(x, y)`.
    pub fn text(&mut self, font: &str, size: f64, x: f64, y: f64, text: &str) -> &mut Self {
        self.operations.push_str("BT\n");
        self.push_line(format!("/{font} {size} Tf"));
        self.push_line(format!("{x:.2} {y:.2} Td"));
        self.operations.push('(');
        for byte in encode_win_ansi(text) {
            match byte {
                b'(' => self.operations.push_str("\\("),
                b')' => self.operations.push_str("\\)"),
                b'\\' => self.operations.push_str("\\\\"),
                b'\n' => self.operations.push_str("\\n"),
                b'\r' => self.operations.push_str("\\r"),
                b'\t' => self.operations.push_str("\\t"),
                0x20..=0x7E => self.operations.push(byte as char),
                _ => self.operations.push_str(&format!("\\{byte:03o}")),
            }
        }
        self.operations.push_str(") Tj\nET\n");
        self
    }

    pub fn operations(&self) -> &str {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.operations.into_bytes()
    }

    fn push_line(&mut self, line: String) -> &mut Self {
        self.operations.push_str(&line);
        self.operations.push('\n');
        self
    }
}

/// Latin-1 subset of WinAnsiEncoding; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ 0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Strings shown by the `Tj` operators of a content stream, in order.
pub fn text_runs(content: &[u8]) -> Vec<String> {
    let mut runs = Vec::new();
    let mut pos = 0;
    while pos < content.len() {
        if content[pos] != b'(' {
            pos += 1;
            continue;
        }
        let (literal, end) = read_literal(content, pos + 1);
        pos = end;
        while pos < content.len() && content[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if content[pos..].starts_with(b"Tj") {
            runs.push(literal.iter().map(|&b| b as char).collect());
            pos += 2;
        }
    }
    runs
}

/// Reads a literal string body starting after its opening parenthesis.
/// Returns the decoded bytes and the position after the closing one.
fn read_literal(content: &[u8], mut pos: usize) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let mut depth = 0usize;
    while pos < content.len() {
        let byte = content[pos];
        pos += 1;
        match byte {
            b'\\' => {
                let Some(&escaped) = content.get(pos) else {
                    break;
                };
                pos += 1;
                match escaped {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'0'..=b'7' => {
                        let mut value = u32::from(escaped - b'0');
                        for _ in 0..2 {
                            match content.get(pos) {
                                Some(&d @ b'0'..=b'7') => {
                                    value = value * 8 + u32::from(d - b'0');
                                    pos += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push((value & 0xFF) as u8);
                    }
                    other => out.push(other),
                }
            }
            b'(' => {
                depth += 1;
                out.push(byte);
            }
            b')' if depth == 0 => return (out, pos),
            b')' => {
                depth -= 1;
                out.push(byte);
            }
            _ => out.push(byte),
        }
    }
    (out, pos)
}

impl Document {
    fn append(&mut self, builder: ContentBuilder) -> Result<()> {
        self.add_content(&builder.into_bytes())
    }

    /// Writes one line of Helvetica text at the layout cursor, offset by the
    /// current bounds and indent, then moves the cursor down one line.
    pub fn text(&mut self, text: &str) -> Result<()> {
        self.ensure_default_font()?;
        let bounds = self.stacks.bounds();
        let indent = self.stacks.indent();
        let x = bounds.left + indent.left;
        let baseline = self.y() - DEFAULT_FONT_SIZE;

        let mut builder = ContentBuilder::new();
        builder.text(DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE, x, baseline, text);
        self.append(builder)?;
        self.move_down(DEFAULT_FONT_SIZE * LEADING_FACTOR);
        Ok(())
    }

    /// Adds a rectangle to the current path.
    pub fn rectangle(&mut self, rect: Rectangle) -> Result<()> {
        let mut builder = ContentBuilder::new();
        builder.rect(
            rect.lower_left.x,
            rect.lower_left.y,
            rect.width(),
            rect.height(),
        );
        self.append(builder)
    }

    /// Begins a new subpath at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        let mut builder = ContentBuilder::new();
        builder.move_to(x, y);
        self.append(builder)
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> Result<()> {
        let mut builder = ContentBuilder::new();
        builder.line_to(x, y);
        self.append(builder)
    }

    pub fn fill(&mut self) -> Result<()> {
        let mut builder = ContentBuilder::new();
        builder.fill();
        self.append(builder)
    }

    pub fn stroke(&mut self) -> Result<()> {
        let mut builder = ContentBuilder::new();
        builder.stroke();
        self.append(builder)
    }

    pub fn set_fill_color(&mut self, color: Color) -> Result<()> {
        let state = self.stacks.graphics().with_fill_color(color);
        let mut builder = ContentBuilder::new();
        builder.set_fill_color(color);
        self.append(builder)?;
        self.stacks.replace_top(Frame::Graphics(state));
        Ok(())
    }

    pub fn set_stroke_color(&mut self, color: Color) -> Result<()> {
        let state = self.stacks.graphics().with_stroke_color(color);
        let mut builder = ContentBuilder::new();
        builder.set_stroke_color(color);
        self.append(builder)?;
        self.stacks.replace_top(Frame::Graphics(state));
        Ok(())
    }

    pub fn set_line_width(&mut self, width: f64) -> Result<()> {
        let state = self.stacks.graphics().with_line_width(width);
        let mut builder = ContentBuilder::new();
        builder.set_line_width(width);
        self.append(builder)?;
        self.stacks.replace_top(Frame::Graphics(state));
        Ok(())
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> Result<()> {
        let state = self.stacks.graphics().with_line_cap(cap);
        let mut builder = ContentBuilder::new();
        builder.set_line_cap(cap);
        self.append(builder)?;
        self.stacks.replace_top(Frame::Graphics(state));
        Ok(())
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> Result<()> {
        let state = self.stacks.graphics().with_line_join(join);
        let mut builder = ContentBuilder::new();
        builder.set_line_join(join);
        self.append(builder)?;
        self.stacks.replace_top(Frame::Graphics(state));
        Ok(())
    }

    pub fn set_dash(&mut self, dash: LineDashPattern) -> Result<()> {
        let mut builder = ContentBuilder::new();
        builder.set_dash(&dash);
        self.append(builder)?;
        let state = self.stacks.graphics().with_dash(dash);
        self.stacks.replace_top(Frame::Graphics(state));
        Ok(())
    }

    pub fn set_fill_color_space(&mut self, space: ColorSpace) -> Result<()> {
        let state = self.stacks.graphics().with_fill_color_space(space);
        let mut builder = ContentBuilder::new();
        builder.set_fill_color_space(space);
        self.append(builder)?;
        self.stacks.replace_top(Frame::Graphics(state));
        Ok(())
    }

    pub fn set_stroke_color_space(&mut self, space: ColorSpace) -> Result<()> {
        let state = self.stacks.graphics().with_stroke_color_space(space);
        let mut builder = ContentBuilder::new();
        builder.set_stroke_color_space(space);
        self.append(builder)?;
        self.stacks.replace_top(Frame::Graphics(state));
        Ok(())
    }

    /// Pushes a copy of the current graphics state and emits `q`.
    pub fn save_graphics_state(&mut self) -> Result<()> {
        let mut builder = ContentBuilder::new();
        builder.save_state();
        self.append(builder)?;
        let current = self.stacks.graphics();
        self.stacks.push(Frame::Graphics(current));
        Ok(())
    }

    /// Pops the graphics state and emits `Q`. The root state cannot be
    /// popped.
    pub fn restore_graphics_state(&mut self) -> Result<()> {
        if self.stacks.depth(Axis::Graphics) <= 1 {
            return Err(PdfError::StateStackUnderflow(Axis::Graphics));
        }
        let mut builder = ContentBuilder::new();
        builder.restore_state();
        self.append(builder)?;
        self.stacks.pop(Axis::Graphics)?;
        Ok(())
    }

    /// Runs `body` with `rect` as the current bounds, starting at its top.
    /// Afterwards the bounds are popped and the cursor sits at the bottom
    /// of `rect`.
    pub fn bounding_box<T, E, F>(&mut self, rect: BoundingBox, body: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Document) -> std::result::Result<T, E>,
        E: From<PdfError>,
    {
        self.stacks.push(Frame::Bounds(rect));
        self.move_to_y(rect.top);
        let result = body(self);
        self.stacks.pop(Axis::Bounds)?;
        if result.is_ok() {
            self.move_to_y(rect.bottom());
        }
        result
    }

    /// Runs `body` with the indent widened by `left` and `right`.
    pub fn indent<T, E, F>(&mut self, left: f64, right: f64, body: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Document) -> std::result::Result<T, E>,
        E: From<PdfError>,
    {
        let current = self.stacks.indent();
        self.stacks.push(Frame::Indent(Indent::new(
            current.left + left,
            current.right + right,
        )));
        let result = body(self);
        self.stacks.pop(Axis::Indent)?;
        result
    }

    fn ensure_default_font(&mut self) -> Result<()> {
        let number = self.current_page()?;
        let resources_id = self.page_resources_id(number)?;
        let registered = self
            .store
            .dictionary(resources_id)?
            .get_dict("Font")
            .is_some_and(|fonts| fonts.contains_key(DEFAULT_FONT_NAME));
        if registered {
            return Ok(());
        }

        let mut font = Dictionary::new();
        font.set("Type", Object::name("Font"));
        font.set("Subtype", Object::name("Type1"));
        font.set("BaseFont", Object::name("Helvetica"));
        font.set("Encoding", Object::name("WinAnsiEncoding"));
        let font_id = self.store.insert(font);
        self.add_page_resource("Font", DEFAULT_FONT_NAME, font_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageOptions;
    use crate::transaction::TxResult;

    #[test]
    fn test_builder_formats_operators() {
        let mut builder = ContentBuilder::new();
        builder
            .save_state()
            .set_line_width(2.0)
            .set_fill_color(Color::rgb(1.0, 0.0, 0.0))
            .rect(10.0, 20.0, 30.0, 40.0)
            .fill()
            .restore_state();

        assert_eq!(
            builder.operations(),
            "q\n2.00 w\n1.000 0.000 0.000 rg\n10.00 20.00 30.00 40.00 re\nf\nQ\n"
        );
    }

    #[test]
    fn test_text_escapes_and_roundtrips_through_text_runs() {
        let mut builder = ContentBuilder::new();
        builder.text("F1", 12.0, 0.0, 0.0, "a (b) \\ c");
        builder.text("F1", 12.0, 0.0, 0.0, "caf\u{e9}");

        assert_eq!(
            text_runs(builder.operations().as_bytes()),
            vec!["a (b) \\ c".to_string(), "caf\u{e9}".to_string()]
        );
    }

    #[test]
    fn test_text_runs_ignores_other_strings() {
        let content = b"BT (shown) Tj ET\n[(kerned)] TJ\n(x) '\n";
        assert_eq!(text_runs(content), vec!["shown".to_string()]);
    }

    #[test]
    fn test_document_text_moves_cursor_and_registers_font() {
        let mut doc = Document::new();
        let top = doc.y();
        doc.text("hello").unwrap();
        doc.text("world").unwrap();

        assert_eq!(
            text_runs(&doc.page_content(1).unwrap()),
            vec!["hello".to_string(), "world".to_string()]
        );
        assert_eq!(doc.y(), top - 2.0 * DEFAULT_FONT_SIZE * LEADING_FACTOR);

        let resources = doc
            .store()
            .dictionary(doc.page_resources_id(1).unwrap())
            .unwrap();
        let fonts = resources.get_dict("Font").unwrap();
        assert_eq!(fonts.len(), 1);
        assert!(doc.store().validate_references().is_ok());
    }

    #[test]
    fn test_graphics_state_push_and_pop() {
        let mut doc = Document::new();
        doc.save_graphics_state().unwrap();
        doc.set_fill_color(Color::red()).unwrap();
        assert_eq!(doc.stacks().graphics().fill_color, Color::red());

        doc.restore_graphics_state().unwrap();
        assert_eq!(doc.stacks().graphics().fill_color, Color::black());
        assert!(matches!(
            doc.restore_graphics_state(),
            Err(PdfError::StateStackUnderflow(Axis::Graphics))
        ));
        assert_eq!(doc.page_content(1).unwrap(), b"q\n1.000 0.000 0.000 rg\nQ\n");
    }

    #[test]
    fn test_stroke_settings_update_graphics_frame() {
        let mut doc = Document::new();
        doc.set_stroke_color_space(ColorSpace::DeviceRgb).unwrap();
        doc.set_line_cap(LineCap::Round).unwrap();
        doc.set_line_join(LineJoin::Bevel).unwrap();
        doc.set_dash(LineDashPattern::dashed(3.0, 1.0)).unwrap();
        doc.move_to(0.0, 0.0).unwrap();
        doc.line_to(10.0, 5.0).unwrap();
        doc.stroke().unwrap();

        let state = doc.stacks().graphics();
        assert_eq!(state.stroke_color_space, ColorSpace::DeviceRgb);
        assert_eq!(state.stroke_color, Color::Rgb(0.0, 0.0, 0.0));
        assert_eq!(state.line_cap, LineCap::Round);
        assert_eq!(state.line_join, LineJoin::Bevel);
        assert_eq!(state.dash, LineDashPattern::dashed(3.0, 1.0));
        assert_eq!(
            doc.page_content(1).unwrap(),
            b"/DeviceRGB CS\n1 J\n2 j\n[3.00 1.00] 0.00 d\n0.00 0.00 m\n10.00 5.00 l\nS\n"
        );
    }

    #[test]
    fn test_bounding_box_scopes_bounds() {
        let mut doc = Document::new();
        let outer = doc.stacks().bounds();
        let rect = BoundingBox::new(100.0, 500.0, 200.0, 100.0);

        let inside = doc
            .bounding_box(rect, |doc| -> Result<BoundingBox> { Ok(doc.stacks().bounds()) })
            .unwrap();

        assert_eq!(inside, rect);
        assert_eq!(doc.stacks().bounds(), outer);
        assert_eq!(doc.y(), 400.0);
    }

    #[test]
    fn test_indent_accumulates() {
        let mut doc = Document::new();
        let nested = doc
            .indent(10.0, 0.0, |doc| doc.indent(5.0, 2.0, |doc| -> Result<Indent> {
                Ok(doc.stacks().indent())
            }))
            .unwrap();

        assert_eq!(nested, Indent::new(15.0, 2.0));
        assert_eq!(doc.stacks().depth(Axis::Indent), 0);
    }

    #[test]
    fn test_rollback_passes_through_bounding_box() {
        let mut doc = Document::new();
        let rect = BoundingBox::new(0.0, 300.0, 100.0, 100.0);
        let committed = doc
            .transaction(|tx| {
                tx.bounding_box(rect, |doc| -> TxResult {
                    doc.text("inside")?;
                    doc.rollback()
                })
            })
            .unwrap();

        assert!(!committed);
        assert_eq!(doc.stacks().depth(Axis::Bounds), 1);
        assert!(text_runs(&doc.page_content(1).unwrap()).is_empty());
    }

    #[test]
    fn test_text_without_page_fails() {
        let mut doc = Document::with_options(crate::document::DocumentOptions {
            skip_first_page: true,
            ..Default::default()
        });
        assert!(matches!(doc.text("x"), Err(PdfError::NoCurrentPage)));

        doc.start_new_page(PageOptions::default()).unwrap();
        assert!(doc.text("x").is_ok());
    }
}
