//! Pages imported from an existing document's object graph.
//!
//! A template page contributes one content stream record per source
//! stream, followed by an authored stream that receives new content, so a
//! page built from a template always has more than one content stream.

use crate::objects::Dictionary;
use crate::page::PageLayout;

#[derive(Debug, Clone, Default)]
pub struct TemplatePage {
    /// Layout of the source page; `None` inherits the document's current
    /// layout.
    pub layout: Option<PageLayout>,
    /// Raw content streams, in drawing order.
    pub streams: Vec<Vec<u8>>,
    /// Seed for the page's resource dictionary.
    pub resources: Dictionary,
}

impl TemplatePage {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    pub fn with_stream(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.streams.push(data.into());
        self
    }

    pub fn with_resources(mut self, resources: Dictionary) -> Self {
        self.resources = resources;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageSize;

    #[test]
    fn test_builder_collects_streams_in_order() {
        let template = TemplatePage::new(PageLayout::new(PageSize::Letter))
            .with_stream("0 0 m 10 10 l S")
            .with_stream(b"BT ET".to_vec());

        assert_eq!(template.streams.len(), 2);
        assert_eq!(template.streams[0], b"0 0 m 10 10 l S");
        assert_eq!(template.layout.map(|l| l.size), Some(PageSize::Letter));
    }
}
