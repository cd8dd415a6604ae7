//! Identifier registry and object store.
//!
//! Records live in an arena indexed by object number. An identifier is
//! never removed from the arena: rollback overwrites slot contents and
//! marks slots issued inside the rolled-back scope as retired, so every
//! reference held by a surviving record keeps pointing at the same slot.

use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId, Record, Stream};
use tracing::trace;

/// One arena cell.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    /// Allocated, no payload written yet.
    Reserved,
    Live(Record),
    /// Issued inside a rolled-back scope; never reused.
    Retired,
}

impl Slot {
    fn byte_size(&self) -> usize {
        match self {
            Slot::Live(record) => record.byte_size(),
            Slot::Reserved | Slot::Retired => 0,
        }
    }
}

/// Owns every record of a document, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    slots: Vec<Slot>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Issues a fresh identifier. The slot stays reserved until a payload
    /// is written with [`ObjectStore::replace_payload`].
    pub fn allocate(&mut self) -> ObjectId {
        self.slots.push(Slot::Reserved);
        let id = ObjectId::new(self.slots.len() as u32, 0);
        trace!(%id, "allocated object identifier");
        id
    }

    /// Allocates an identifier and stores `record` under it.
    pub fn insert(&mut self, record: impl Into<Record>) -> ObjectId {
        let id = self.allocate();
        self.slots[Self::index(id)] = Slot::Live(record.into());
        id
    }

    pub fn get(&self, id: ObjectId) -> Result<&Record> {
        match self.slot(id)? {
            Slot::Live(record) => Ok(record),
            Slot::Reserved => Err(PdfError::UnresolvedReference(id)),
            Slot::Retired => Err(PdfError::RetiredIdentifier(id)),
        }
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut Record> {
        match self.slot_mut(id)? {
            Slot::Live(record) => Ok(record),
            Slot::Reserved => Err(PdfError::UnresolvedReference(id)),
            Slot::Retired => Err(PdfError::RetiredIdentifier(id)),
        }
    }

    /// Overwrites the payload under `id` in place and returns the previous
    /// one. A reserved slot reports an empty dictionary as its previous
    /// payload.
    pub fn replace_payload(&mut self, id: ObjectId, record: impl Into<Record>) -> Result<Record> {
        let slot = self.slot_mut(id)?;
        let previous = match std::mem::replace(slot, Slot::Live(record.into())) {
            Slot::Live(previous) => previous,
            Slot::Reserved => Record::Dictionary(Dictionary::new()),
            Slot::Retired => {
                *slot = Slot::Retired;
                return Err(PdfError::RetiredIdentifier(id));
            }
        };
        Ok(previous)
    }

    pub fn dictionary(&self, id: ObjectId) -> Result<&Dictionary> {
        match self.get(id)? {
            Record::Dictionary(dict) => Ok(dict),
            Record::Stream(_) => Err(PdfError::UnexpectedRecord {
                id,
                expected: "dictionary",
            }),
        }
    }

    pub fn dictionary_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        match self.get_mut(id)? {
            Record::Dictionary(dict) => Ok(dict),
            Record::Stream(_) => Err(PdfError::UnexpectedRecord {
                id,
                expected: "dictionary",
            }),
        }
    }

    pub fn stream(&self, id: ObjectId) -> Result<&Stream> {
        self.get(id)?
            .as_stream()
            .ok_or(PdfError::UnexpectedRecord {
                id,
                expected: "stream",
            })
    }

    pub fn stream_mut(&mut self, id: ObjectId) -> Result<&mut Stream> {
        self.get_mut(id)?
            .as_stream_mut()
            .ok_or(PdfError::UnexpectedRecord {
                id,
                expected: "stream",
            })
    }

    /// Follows an `Object::Reference`.
    pub fn resolve(&self, object: &Object) -> Result<&Record> {
        match object {
            Object::Reference(id) => self.get(*id),
            _ => Err(PdfError::InvalidStructure(
                "expected an indirect reference".to_string(),
            )),
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        matches!(self.slot(id), Ok(Slot::Live(_)))
    }

    pub fn is_retired(&self, id: ObjectId) -> bool {
        matches!(self.slot(id), Ok(Slot::Retired))
    }

    /// Live records in identifier order. Reserved and retired numbers are
    /// skipped.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Record)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Live(record) => Some((ObjectId::new(i as u32 + 1, 0), record)),
            Slot::Reserved | Slot::Retired => None,
        })
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest object number ever issued, including retired ones.
    pub fn max_number(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Checks that every reference held by a live record resolves to a
    /// live record.
    pub fn validate_references(&self) -> Result<()> {
        for (from, record) in self.iter() {
            let mut dangling = None;
            record.for_each_reference(&mut |to| {
                if dangling.is_none() && !self.contains(to) {
                    dangling = Some(to);
                }
            });
            if let Some(to) = dangling {
                return Err(PdfError::DanglingReference { from, to });
            }
        }
        Ok(())
    }

    /// Writes the first payload into a slot returned by `allocate`. Slots
    /// that are not reserved are left untouched.
    pub(crate) fn fill_reserved(&mut self, id: ObjectId, record: impl Into<Record>) {
        if let Ok(slot) = self.slot_mut(id) {
            if matches!(slot, Slot::Reserved) {
                *slot = Slot::Live(record.into());
            }
        }
    }

    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub(crate) fn byte_size(&self) -> usize {
        self.slots.iter().map(Slot::byte_size).sum()
    }

    /// Writes captured slot contents back in place. Slots issued after the
    /// capture are retired.
    pub(crate) fn restore_slots(&mut self, captured: &[Slot]) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            match captured.get(i) {
                Some(saved) => {
                    if slot != saved {
                        slot.clone_from(saved);
                    }
                }
                None => {
                    if *slot != Slot::Retired {
                        trace!(number = i + 1, "retiring object identifier");
                        *slot = Slot::Retired;
                    }
                }
            }
        }
    }

    fn index(id: ObjectId) -> usize {
        id.number() as usize - 1
    }

    fn slot(&self, id: ObjectId) -> Result<&Slot> {
        if id.number() == 0 || id.generation() != 0 {
            return Err(PdfError::UnknownIdentifier(id));
        }
        self.slots
            .get(Self::index(id))
            .ok_or(PdfError::UnknownIdentifier(id))
    }

    fn slot_mut(&mut self, id: ObjectId) -> Result<&mut Slot> {
        if id.number() == 0 || id.generation() != 0 {
            return Err(PdfError::UnknownIdentifier(id));
        }
        self.slots
            .get_mut(Self::index(id))
            .ok_or(PdfError::UnknownIdentifier(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_issues_increasing_numbers() {
        let mut store = ObjectStore::new();
        let a = store.allocate();
        let b = store.allocate();

        assert_eq!(a, ObjectId::new(1, 0));
        assert_eq!(b, ObjectId::new(2, 0));
        assert_eq!(store.max_number(), 2);
    }

    #[test]
    fn test_reserved_slot_is_unresolved() {
        let mut store = ObjectStore::new();
        let id = store.allocate();

        assert!(matches!(store.get(id), Err(PdfError::UnresolvedReference(_))));
        assert!(!store.contains(id));
    }

    #[test]
    fn test_unknown_identifier() {
        let store = ObjectStore::new();
        assert!(matches!(
            store.get(ObjectId::new(1, 0)),
            Err(PdfError::UnknownIdentifier(_))
        ));
        assert!(matches!(
            store.get(ObjectId::new(0, 0)),
            Err(PdfError::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn test_replace_payload_keeps_identifier() {
        let mut store = ObjectStore::new();
        let id = store.insert(Stream::new(b"old".to_vec()));

        let previous = store
            .replace_payload(id, Stream::new(b"new".to_vec()))
            .unwrap();

        assert_eq!(previous.as_stream().unwrap().data(), b"old");
        assert_eq!(store.stream(id).unwrap().data(), b"new");
        assert_eq!(store.max_number(), 1);
    }

    #[test]
    fn test_replace_payload_fills_reserved_slot() {
        let mut store = ObjectStore::new();
        let id = store.allocate();

        let previous = store.replace_payload(id, Dictionary::new()).unwrap();
        assert_eq!(previous, Record::Dictionary(Dictionary::new()));
        assert!(store.contains(id));
    }

    #[test]
    fn test_typed_access_reports_kind_mismatch() {
        let mut store = ObjectStore::new();
        let id = store.insert(Dictionary::new());

        assert!(store.dictionary(id).is_ok());
        assert!(matches!(
            store.stream(id),
            Err(PdfError::UnexpectedRecord {
                expected: "stream",
                ..
            })
        ));
    }

    #[test]
    fn test_restore_retires_later_slots() {
        let mut store = ObjectStore::new();
        let kept = store.insert(Stream::new(b"a".to_vec()));
        let captured = store.slots().to_vec();

        store.stream_mut(kept).unwrap().append(b"b");
        let later = store.insert(Dictionary::new());
        store.restore_slots(&captured);

        assert_eq!(store.stream(kept).unwrap().data(), b"a");
        assert!(store.is_retired(later));
        assert!(matches!(
            store.replace_payload(later, Dictionary::new()),
            Err(PdfError::RetiredIdentifier(_))
        ));
        assert!(store.is_retired(later));

        // Retired numbers are not handed out again.
        let next = store.allocate();
        assert_eq!(next.number(), 3);
    }

    #[test]
    fn test_validate_references() {
        let mut store = ObjectStore::new();
        let target = store.insert(Stream::new(Vec::new()));
        let mut page = Dictionary::new();
        page.set("Contents", target);
        let page_id = store.insert(page);

        assert!(store.validate_references().is_ok());

        let mut broken = Dictionary::new();
        broken.set("Contents", ObjectId::new(99, 0));
        store.replace_payload(page_id, broken).unwrap();

        assert!(matches!(
            store.validate_references(),
            Err(PdfError::DanglingReference { to, .. }) if to.number() == 99
        ));
    }

    #[test]
    fn test_iter_skips_gaps() {
        let mut store = ObjectStore::new();
        store.insert(Dictionary::new());
        store.allocate();
        store.insert(Dictionary::new());

        let numbers: Vec<_> = store.iter().map(|(id, _)| id.number()).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(store.len(), 2);
    }
}
