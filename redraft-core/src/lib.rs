//! # redraft
//!
//! Transactional PDF document construction. Build pages, content streams
//! and metadata speculatively, then keep the result or roll it back.
//!
//! ## Features
//!
//! - **Object store**: every record is addressed by a stable identifier that
//!   survives rollback
//! - **State stacks**: graphics state, bounding boxes, indentation and page
//!   layout, each restored to its exact depth on rollback
//! - **Nested transactions**: an inner rollback only reverts the inner
//!   scope; an outer rollback reverts everything inside it
//! - **Templates**: pages imported with several content streams keep them
//!   separate and restore each one independently
//!
//! ## Quick Start
//!
//! ```rust
//! use redraft::{Document, PageOptions, Result};
//!
//! # fn main() -> Result<()> {
//! let mut doc = Document::new();
//! doc.set_title("Report")?;
//! doc.text("Summary")?;
//!
//! // Try to fit a section on the current page; start a new one otherwise.
//! let fits = doc.transaction(|tx| {
//!     for line in ["one", "two", "three"] {
//!         tx.text(line)?;
//!     }
//!     if tx.y() < tx.stacks().bounds().bottom() {
//!         return tx.rollback();
//!     }
//!     Ok(())
//! })?;
//!
//! if !fits {
//!     doc.start_new_page(PageOptions::default())?;
//! }
//! let pdf = doc.to_bytes()?;
//! assert!(pdf.starts_with(b"%PDF-1.7"));
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod cursor;
pub mod document;
pub mod error;
pub mod geometry;
pub mod graphics;
pub mod objects;
pub mod page;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod template;
pub mod transaction;
pub mod writer;

pub use content::{text_runs, ContentBuilder};
pub use cursor::DocumentCursor;
pub use document::{Document, DocumentMetadata, DocumentOptions};
pub use error::{PdfError, Result};
pub use geometry::{Point, Rectangle};
pub use graphics::{Color, ColorSpace, GraphicState, LineCap, LineDashPattern, LineJoin};
pub use objects::{Dictionary, Object, ObjectId, Record, Stream};
pub use page::{Margins, Orientation, PageLayout, PageOptions, PageSize};
pub use snapshot::TransactionSnapshot;
pub use state::{Axis, BoundingBox, Frame, Indent, StateStacks};
pub use store::ObjectStore;
pub use template::TemplatePage;
pub use transaction::{Interrupt, Outcome, RollbackSignal, Transaction, TransactionState, TxResult};
pub use writer::PdfWriter;

/// Current version of redraft
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
