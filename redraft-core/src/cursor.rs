use crate::objects::ObjectId;

/// Where the document is writing: page position, page count, the stream
/// receiving new content and the vertical layout cursor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocumentCursor {
    /// 1-based; 0 while the document has no page.
    pub(crate) page_number: u32,
    pub(crate) page_count: u32,
    pub(crate) content: Option<ObjectId>,
    pub(crate) y: f64,
}

impl DocumentCursor {
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn content(&self) -> Option<ObjectId> {
        self.content
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub(crate) fn enter_page(&mut self, number: u32, content: ObjectId, top: f64) {
        self.page_number = number;
        self.content = Some(content);
        self.y = top;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cursor_has_no_page() {
        let cursor = DocumentCursor::default();
        assert_eq!(cursor.page_number(), 0);
        assert_eq!(cursor.page_count(), 0);
        assert!(cursor.content().is_none());
    }

    #[test]
    fn test_enter_page() {
        let mut cursor = DocumentCursor {
            page_count: 2,
            ..Default::default()
        };
        cursor.enter_page(2, ObjectId::new(9, 0), 806.0);

        assert_eq!(cursor.page_number(), 2);
        assert_eq!(cursor.content(), Some(ObjectId::new(9, 0)));
        assert_eq!(cursor.y(), 806.0);
    }
}
