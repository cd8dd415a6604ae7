//! Per-document state stacks.
//!
//! Each axis is an independent stack of plain-value frames. The graphics,
//! bounds and layout axes carry a document-level root frame that can be
//! replaced but never popped; the indent axis starts empty.

use crate::error::{PdfError, Result};
use crate::graphics::GraphicState;
use crate::page::PageLayout;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Graphics,
    Bounds,
    Indent,
    Layout,
}

impl Axis {
    fn has_root(&self) -> bool {
        !matches!(self, Axis::Indent)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A layout rectangle in page coordinates, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top - self.height
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y <= self.top && y >= self.bottom()
    }
}

/// Left and right indentation applied inside the current bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Indent {
    pub left: f64,
    pub right: f64,
}

impl Indent {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Graphics(GraphicState),
    Bounds(BoundingBox),
    Indent(Indent),
    Layout(PageLayout),
}

impl Frame {
    pub fn axis(&self) -> Axis {
        match self {
            Frame::Graphics(_) => Axis::Graphics,
            Frame::Bounds(_) => Axis::Bounds,
            Frame::Indent(_) => Axis::Indent,
            Frame::Layout(_) => Axis::Layout,
        }
    }

    /// The frame reported by [`StateStacks::current`] for an empty axis.
    pub fn neutral(axis: Axis) -> Self {
        match axis {
            Axis::Graphics => Frame::Graphics(GraphicState::default()),
            Axis::Bounds => Frame::Bounds(BoundingBox::default()),
            Axis::Indent => Frame::Indent(Indent::default()),
            Axis::Layout => Frame::Layout(PageLayout::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateStacks {
    graphics: Vec<GraphicState>,
    bounds: Vec<BoundingBox>,
    indents: Vec<Indent>,
    layouts: Vec<PageLayout>,
}

impl Default for StateStacks {
    fn default() -> Self {
        Self::new(PageLayout::default())
    }
}

impl StateStacks {
    /// Creates stacks whose rooted axes start at `layout` and its margin box.
    pub fn new(layout: PageLayout) -> Self {
        Self {
            graphics: vec![GraphicState::default()],
            bounds: vec![layout.margin_box()],
            indents: Vec::new(),
            layouts: vec![layout],
        }
    }

    pub fn push(&mut self, frame: Frame) {
        match frame {
            Frame::Graphics(state) => self.graphics.push(state),
            Frame::Bounds(bounds) => self.bounds.push(bounds),
            Frame::Indent(indent) => self.indents.push(indent),
            Frame::Layout(layout) => self.layouts.push(layout),
        }
    }

    /// Pops the top frame. Root frames and empty axes underflow.
    pub fn pop(&mut self, axis: Axis) -> Result<Frame> {
        let floor = usize::from(axis.has_root());
        if self.depth(axis) <= floor {
            return Err(PdfError::StateStackUnderflow(axis));
        }
        let frame = match axis {
            Axis::Graphics => self.graphics.pop().map(Frame::Graphics),
            Axis::Bounds => self.bounds.pop().map(Frame::Bounds),
            Axis::Indent => self.indents.pop().map(Frame::Indent),
            Axis::Layout => self.layouts.pop().map(Frame::Layout),
        };
        frame.ok_or(PdfError::StateStackUnderflow(axis))
    }

    pub fn current(&self, axis: Axis) -> Frame {
        let top = match axis {
            Axis::Graphics => self.graphics.last().cloned().map(Frame::Graphics),
            Axis::Bounds => self.bounds.last().copied().map(Frame::Bounds),
            Axis::Indent => self.indents.last().copied().map(Frame::Indent),
            Axis::Layout => self.layouts.last().copied().map(Frame::Layout),
        };
        top.unwrap_or_else(|| Frame::neutral(axis))
    }

    pub fn depth(&self, axis: Axis) -> usize {
        match axis {
            Axis::Graphics => self.graphics.len(),
            Axis::Bounds => self.bounds.len(),
            Axis::Indent => self.indents.len(),
            Axis::Layout => self.layouts.len(),
        }
    }

    /// Replaces the top frame of the frame's axis, pushing if the axis is
    /// empty.
    pub fn replace_top(&mut self, frame: Frame) {
        match frame {
            Frame::Graphics(state) => replace_last(&mut self.graphics, state),
            Frame::Bounds(bounds) => replace_last(&mut self.bounds, bounds),
            Frame::Indent(indent) => replace_last(&mut self.indents, indent),
            Frame::Layout(layout) => replace_last(&mut self.layouts, layout),
        }
    }

    /// Replaces the bottom frame of the frame's axis, pushing if the axis
    /// is empty.
    pub fn replace_root(&mut self, frame: Frame) {
        match frame {
            Frame::Graphics(state) => replace_first(&mut self.graphics, state),
            Frame::Bounds(bounds) => replace_first(&mut self.bounds, bounds),
            Frame::Indent(indent) => replace_first(&mut self.indents, indent),
            Frame::Layout(layout) => replace_first(&mut self.layouts, layout),
        }
    }

    pub fn graphics(&self) -> GraphicState {
        self.graphics.last().cloned().unwrap_or_default()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds.last().copied().unwrap_or_default()
    }

    pub fn indent(&self) -> Indent {
        self.indents.last().copied().unwrap_or_default()
    }

    pub fn layout(&self) -> PageLayout {
        self.layouts.last().copied().unwrap_or_default()
    }

    /// The bottom frame of the bounds axis: the current page's margin box.
    pub fn margin_box(&self) -> BoundingBox {
        self.bounds.first().copied().unwrap_or_default()
    }

    pub(crate) fn byte_size(&self) -> usize {
        self.graphics.len() * std::mem::size_of::<GraphicState>()
            + self.bounds.len() * std::mem::size_of::<BoundingBox>()
            + self.indents.len() * std::mem::size_of::<Indent>()
            + self.layouts.len() * std::mem::size_of::<PageLayout>()
    }
}

fn replace_last<T>(stack: &mut Vec<T>, value: T) {
    match stack.last_mut() {
        Some(top) => *top = value,
        None => stack.push(value),
    }
}

fn replace_first<T>(stack: &mut Vec<T>, value: T) {
    match stack.first_mut() {
        Some(root) => *root = value,
        None => stack.push(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Color;
    use crate::page::PageSize;

    #[test]
    fn test_new_stacks_have_roots() {
        let stacks = StateStacks::default();

        assert_eq!(stacks.depth(Axis::Graphics), 1);
        assert_eq!(stacks.depth(Axis::Bounds), 1);
        assert_eq!(stacks.depth(Axis::Layout), 1);
        assert_eq!(stacks.depth(Axis::Indent), 0);
        assert_eq!(stacks.bounds(), PageLayout::default().margin_box());
    }

    #[test]
    fn test_push_pop_by_axis() {
        let mut stacks = StateStacks::default();
        let inner = BoundingBox::new(100.0, 500.0, 200.0, 100.0);

        stacks.push(Frame::Bounds(inner));
        assert_eq!(stacks.current(Axis::Bounds), Frame::Bounds(inner));

        let popped = stacks.pop(Axis::Bounds).unwrap();
        assert_eq!(popped, Frame::Bounds(inner));
        assert_eq!(stacks.bounds(), PageLayout::default().margin_box());
    }

    #[test]
    fn test_root_frames_do_not_pop() {
        let mut stacks = StateStacks::default();

        for axis in [Axis::Graphics, Axis::Bounds, Axis::Layout, Axis::Indent] {
            assert!(matches!(
                stacks.pop(axis),
                Err(PdfError::StateStackUnderflow(a)) if a == axis
            ));
        }
    }

    #[test]
    fn test_empty_indent_is_neutral() {
        let stacks = StateStacks::default();
        assert_eq!(stacks.current(Axis::Indent), Frame::Indent(Indent::default()));
    }

    #[test]
    fn test_replace_top_and_root() {
        let mut stacks = StateStacks::default();
        stacks.push(Frame::Graphics(GraphicState::default()));
        stacks.replace_top(Frame::Graphics(
            GraphicState::default().with_fill_color(Color::red()),
        ));

        assert_eq!(stacks.graphics().fill_color, Color::red());
        stacks.pop(Axis::Graphics).unwrap();
        assert_eq!(stacks.graphics().fill_color, Color::black());

        let letter = PageLayout::new(PageSize::Letter);
        stacks.replace_root(Frame::Layout(letter));
        assert_eq!(stacks.layout(), letter);
        assert_eq!(stacks.depth(Axis::Layout), 1);
    }

    #[test]
    fn test_bounding_box_edges() {
        let bounds = BoundingBox::new(10.0, 100.0, 50.0, 40.0);
        assert_eq!(bounds.right(), 60.0);
        assert_eq!(bounds.bottom(), 60.0);
        assert!(bounds.contains_y(80.0));
        assert!(!bounds.contains_y(120.0));
    }
}
