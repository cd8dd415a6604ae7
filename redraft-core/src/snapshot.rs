//! Point-in-time copies of a document's mutable state.
//!
//! A snapshot is a full deep copy: every store slot, every state stack, the
//! cursor and the per-page layouts. Transactions are short-lived construction scopes, so
//! copying is linear in the size of the document and needs no diffing.

use crate::cursor::DocumentCursor;
use crate::document::Document;
use crate::page::PageLayout;
use crate::state::StateStacks;
use crate::store::Slot;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct TransactionSnapshot {
    slots: Vec<Slot>,
    stacks: StateStacks,
    cursor: DocumentCursor,
    page_layouts: Vec<PageLayout>,
}

impl TransactionSnapshot {
    pub fn capture(document: &Document) -> Self {
        let snapshot = Self {
            slots: document.store.slots().to_vec(),
            stacks: document.stacks.clone(),
            cursor: document.cursor,
            page_layouts: document.page_layouts.clone(),
        };
        trace!(
            slots = snapshot.slots.len(),
            bytes = snapshot.byte_size(),
            "captured snapshot"
        );
        snapshot
    }

    /// Writes the captured state back into `document`.
    ///
    /// Records are overwritten in place, so identifiers and the references
    /// between surviving records are untouched. Identifiers issued after
    /// the capture are retired. Restoring the same snapshot twice leaves the
    /// same final state.
    pub fn restore(&self, document: &mut Document) {
        let issued_since = (document.store.max_number() as usize).saturating_sub(self.slots.len());
        document.store.restore_slots(&self.slots);
        document.stacks.clone_from(&self.stacks);
        document.cursor = self.cursor;
        document.page_layouts.clone_from(&self.page_layouts);
        trace!(
            slots = self.slots.len(),
            retired = issued_since,
            page_count = self.cursor.page_count(),
            "restored snapshot"
        );
    }

    /// Number of identifiers issued when the snapshot was taken.
    pub fn issued(&self) -> usize {
        self.slots.len()
    }

    pub fn cursor(&self) -> &DocumentCursor {
        &self.cursor
    }

    /// Approximate size of the copied state in bytes.
    pub fn byte_size(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Live(record) => record.byte_size(),
                Slot::Reserved | Slot::Retired => 0,
            })
            .sum::<usize>()
            + self.stacks.byte_size()
            + self.page_layouts.len() * std::mem::size_of::<PageLayout>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Dictionary;
    use crate::page::{PageLayout, PageOptions, PageSize};
    use crate::state::{Axis, BoundingBox, Frame};

    #[test]
    fn test_restore_reverts_content_and_pages() {
        let mut doc = Document::new();
        doc.add_content(b"kept\n").unwrap();
        let snapshot = TransactionSnapshot::capture(&doc);

        doc.add_content(b"dropped\n").unwrap();
        let new_page = doc.start_new_page(PageOptions::default()).unwrap();
        snapshot.restore(&mut doc);

        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.page_content(1).unwrap(), b"kept\n");
        assert!(doc.store().is_retired(new_page));
        assert!(doc.store().validate_references().is_ok());
    }

    #[test]
    fn test_restore_reverts_stacks_and_cursor() {
        let mut doc = Document::new();
        let snapshot = TransactionSnapshot::capture(&doc);
        let before_bounds = doc.stacks().bounds();
        let before_y = doc.y();

        doc.stacks_mut()
            .push(Frame::Bounds(BoundingBox::new(0.0, 100.0, 10.0, 10.0)));
        doc.stacks_mut()
            .push(Frame::Bounds(BoundingBox::new(0.0, 50.0, 5.0, 5.0)));
        doc.start_new_page(PageOptions::with_layout(PageLayout::new(PageSize::Legal)))
            .unwrap();
        doc.move_down(120.0);
        snapshot.restore(&mut doc);

        assert_eq!(doc.stacks().depth(Axis::Bounds), 1);
        assert_eq!(doc.stacks().bounds(), before_bounds);
        assert_eq!(doc.stacks().layout().size, PageSize::A4);
        assert_eq!(doc.y(), before_y);
    }

    #[test]
    fn test_restore_is_idempotent() {
        let mut doc = Document::new();
        let snapshot = TransactionSnapshot::capture(&doc);

        doc.add_content(b"x").unwrap();
        doc.store_mut().insert(Dictionary::new());
        snapshot.restore(&mut doc);
        let first = doc.to_bytes().unwrap();
        snapshot.restore(&mut doc);
        let second = doc.to_bytes().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_is_independent_of_later_edits() {
        let mut doc = Document::new();
        doc.add_content(b"a").unwrap();
        let snapshot = TransactionSnapshot::capture(&doc);
        let size = snapshot.byte_size();

        doc.add_content(&[b'b'; 1000]).unwrap();

        assert_eq!(snapshot.byte_size(), size);
        assert_eq!(snapshot.cursor().page_count(), 1);
    }
}
