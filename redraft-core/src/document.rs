use crate::cursor::DocumentCursor;
use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId, Stream};
use crate::page::{PageLayout, PageOptions};
use crate::state::{Frame, StateStacks};
use crate::store::ObjectStore;
use crate::template::TemplatePage;
use crate::transaction::OpenTransaction;
use crate::writer::{self, PdfWriter};
use chrono::{DateTime, Utc};
use tracing::trace;

/// A PDF document under construction.
///
/// All state lives here: the object store, the state stacks, the cursor
/// and the stack of open transactions. Drawing operations mutate these
/// directly; a transaction can revert every one of those mutations.
///
/// # Example
///
/// ```rust
/// use redraft::{Document, PageOptions};
///
/// let mut doc = Document::new();
/// doc.text("kept")?;
///
/// let committed = doc.transaction(|tx| {
///     tx.start_new_page(PageOptions::default())?;
///     tx.text("discarded")?;
///     tx.rollback()
/// })?;
///
/// assert!(!committed);
/// assert_eq!(doc.page_count(), 1);
/// # Ok::<(), redraft::PdfError>(())
/// ```
pub struct Document {
    pub(crate) store: ObjectStore,
    pub(crate) stacks: StateStacks,
    pub(crate) cursor: DocumentCursor,
    /// Layout each page was built with, indexed by page number - 1.
    pub(crate) page_layouts: Vec<PageLayout>,
    pub(crate) transactions: Vec<OpenTransaction>,
    pub(crate) next_token: u64,
    catalog_id: ObjectId,
    pages_id: ObjectId,
    info_id: ObjectId,
}

/// Metadata for a PDF document.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    /// Software that created the original document
    pub creator: Option<String>,
    /// Software that produced the PDF
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub modification_date: Option<DateTime<Utc>>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            title: None,
            author: None,
            subject: None,
            keywords: None,
            creator: Some("redraft".to_string()),
            producer: Some(format!("redraft v{}", env!("CARGO_PKG_VERSION"))),
            creation_date: Some(now),
            modification_date: Some(now),
        }
    }
}

impl DocumentMetadata {
    fn to_info_dictionary(&self) -> Dictionary {
        let mut info = Dictionary::new();
        let strings = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Keywords", &self.keywords),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                info.set(key, value.as_str());
            }
        }
        if let Some(date) = self.creation_date {
            info.set("CreationDate", format_pdf_date(date));
        }
        if let Some(date) = self.modification_date {
            info.set("ModDate", format_pdf_date(date));
        }
        info
    }
}

/// Construction options for [`Document::with_options`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DocumentOptions {
    /// Layout of the first page and of every page started without one.
    pub layout: PageLayout,
    pub metadata: DocumentMetadata,
    /// Leave the page tree empty instead of starting the first page.
    pub skip_first_page: bool,
}

impl DocumentOptions {
    /// Parses options from JSON. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with one A4 page.
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    pub fn with_options(options: DocumentOptions) -> Self {
        Self::build(options, Vec::new())
    }

    /// Creates a document whose page tree starts with `pages`, imported in
    /// order. The first page is skipped when at least one template page is
    /// given.
    pub fn from_template(options: DocumentOptions, pages: Vec<TemplatePage>) -> Self {
        Self::build(options, pages)
    }

    fn build(options: DocumentOptions, templates: Vec<TemplatePage>) -> Self {
        let mut store = ObjectStore::new();
        let catalog_id = store.allocate();
        let pages_id = store.allocate();
        let info_id = store.insert(options.metadata.to_info_dictionary());
        let mut stacks = StateStacks::new(options.layout);
        let mut cursor = DocumentCursor::default();

        let mut first_pages: Vec<Option<TemplatePage>> = templates.into_iter().map(Some).collect();
        if first_pages.is_empty() && !options.skip_first_page {
            first_pages.push(None);
        }

        let mut kids = Vec::with_capacity(first_pages.len());
        let mut page_layouts = Vec::with_capacity(first_pages.len());
        let mut last_content = None;
        for template in first_pages {
            let layout = template
                .as_ref()
                .and_then(|t| t.layout)
                .unwrap_or(options.layout);
            let (page_id, content_id) =
                build_page(&mut store, pages_id, &layout, template.as_ref());
            kids.push(Object::Reference(page_id));
            page_layouts.push(layout);
            last_content = Some((content_id, layout));
        }

        let count = kids.len() as u32;
        let mut pages = Dictionary::new();
        pages.set("Type", Object::name("Pages"));
        pages.set("Kids", Object::Array(kids));
        pages.set("Count", count);
        store.fill_reserved(pages_id, pages);

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::name("Catalog"));
        catalog.set("Pages", pages_id);
        store.fill_reserved(catalog_id, catalog);

        cursor.page_count = count;
        if let Some((content_id, layout)) = last_content {
            enter_layout(&mut stacks, layout);
            cursor.enter_page(count, content_id, layout.margin_box().top);
        }

        Self {
            store,
            stacks,
            cursor,
            page_layouts,
            transactions: Vec::new(),
            next_token: 1,
            catalog_id,
            pages_id,
            info_id,
        }
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Direct access to the records. Callers must only hold on to
    /// identifiers across a transaction boundary, never to borrowed payloads.
    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    pub fn stacks(&self) -> &StateStacks {
        &self.stacks
    }

    pub fn stacks_mut(&mut self) -> &mut StateStacks {
        &mut self.stacks
    }

    pub fn cursor(&self) -> &DocumentCursor {
        &self.cursor
    }

    pub fn catalog_id(&self) -> ObjectId {
        self.catalog_id
    }

    pub fn pages_id(&self) -> ObjectId {
        self.pages_id
    }

    pub fn info_id(&self) -> ObjectId {
        self.info_id
    }

    /// Gets the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.cursor.page_count
    }

    /// The 1-based number of the page receiving content, 0 if none.
    pub fn page_number(&self) -> u32 {
        self.cursor.page_number
    }

    /// Appends a new page after the last page and makes it current.
    ///
    /// Without an explicit layout the layout currently on top of the layout
    /// axis is reused. An explicit layout replaces the layout root. In both
    /// cases the bounds root becomes the new page's margin box and the
    /// layout cursor moves to its top.
    pub fn start_new_page(&mut self, options: PageOptions) -> Result<ObjectId> {
        let layout = options.layout.unwrap_or_else(|| self.stacks.layout());
        match options.layout {
            Some(layout) => enter_layout(&mut self.stacks, layout),
            None => self.stacks.replace_root(Frame::Bounds(layout.margin_box())),
        }

        let (page_id, content_id) = build_page(
            &mut self.store,
            self.pages_id,
            &layout,
            options.template.as_ref(),
        );

        let pages = self.store.dictionary_mut(self.pages_id)?;
        let kids = pages
            .get_array_mut("Kids")
            .ok_or_else(|| PdfError::InvalidStructure("page tree has no Kids".to_string()))?;
        kids.push(Object::Reference(page_id));
        let count = kids.len() as u32;
        pages.set("Count", count);

        self.cursor.page_count = count;
        self.page_layouts.push(layout);
        self.cursor.enter_page(count, content_id, layout.margin_box().top);
        trace!(%page_id, page = count, "started new page");
        Ok(page_id)
    }

    /// Moves the cursor to an existing page; new content goes to that
    /// page's authored stream.
    ///
    /// The layout and bounds roots switch to the layout the page was built
    /// with, and the layout cursor moves to the top of its margin box.
    pub fn go_to_page(&mut self, number: u32) -> Result<()> {
        let content_id = self
            .page_content_ids(number)?
            .last()
            .copied()
            .ok_or_else(|| PdfError::InvalidStructure(format!("page {number} has no contents")))?;
        let layout = self.page_layout(number)?;
        enter_layout(&mut self.stacks, layout);
        self.cursor.enter_page(number, content_id, layout.margin_box().top);
        trace!(page = number, "returned to page");
        Ok(())
    }

    /// The layout page `number` was built with.
    pub fn page_layout(&self, number: u32) -> Result<PageLayout> {
        number
            .checked_sub(1)
            .and_then(|index| self.page_layouts.get(index as usize).copied())
            .ok_or(PdfError::InvalidPageNumber(number))
    }

    pub fn page_ids(&self) -> Result<Vec<ObjectId>> {
        let pages = self.store.dictionary(self.pages_id)?;
        let kids = pages
            .get("Kids")
            .and_then(Object::as_array)
            .ok_or_else(|| PdfError::InvalidStructure("page tree has no Kids".to_string()))?;
        kids.iter()
            .map(|kid| {
                kid.as_reference().ok_or_else(|| {
                    PdfError::InvalidStructure("page tree kid is not a reference".to_string())
                })
            })
            .collect()
    }

    pub fn page_id(&self, number: u32) -> Result<ObjectId> {
        let ids = self.page_ids()?;
        number
            .checked_sub(1)
            .and_then(|index| ids.get(index as usize).copied())
            .ok_or(PdfError::InvalidPageNumber(number))
    }

    /// Content stream identifiers of a page, in drawing order.
    pub fn page_content_ids(&self, number: u32) -> Result<Vec<ObjectId>> {
        let page = self.store.dictionary(self.page_id(number)?)?;
        match page.get("Contents") {
            Some(Object::Reference(id)) => Ok(vec![*id]),
            Some(Object::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_reference().ok_or_else(|| {
                        PdfError::InvalidStructure("Contents entry is not a reference".to_string())
                    })
                })
                .collect(),
            _ => Err(PdfError::InvalidStructure(format!(
                "page {number} has no Contents"
            ))),
        }
    }

    /// All content of a page, streams joined by newlines.
    pub fn page_content(&self, number: u32) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for (i, id) in self.page_content_ids(number)?.into_iter().enumerate() {
            if i > 0 {
                content.push(b'\n');
            }
            content.extend_from_slice(self.store.stream(id)?.data());
        }
        Ok(content)
    }

    /// Where new drawing bytes are appended.
    pub fn current_page_content_id(&self) -> Result<ObjectId> {
        self.cursor.content.ok_or(PdfError::NoCurrentPage)
    }

    /// Appends raw operator bytes to the current content stream.
    pub fn add_content(&mut self, bytes: &[u8]) -> Result<()> {
        let id = self.current_page_content_id()?;
        self.store.stream_mut(id)?.append(bytes);
        Ok(())
    }

    pub fn page_resources_id(&self, number: u32) -> Result<ObjectId> {
        let page_id = self.page_id(number)?;
        self.store
            .dictionary(page_id)?
            .get_reference("Resources")
            .ok_or_else(|| PdfError::InvalidStructure(format!("page {number} has no Resources")))
    }

    /// Registers `value` as `/category /name` in the current page's
    /// resource dictionary.
    pub fn add_page_resource(
        &mut self,
        category: &str,
        name: &str,
        value: impl Into<Object>,
    ) -> Result<()> {
        let number = self.current_page()?;
        let resources_id = self.page_resources_id(number)?;
        self.store
            .dictionary_mut(resources_id)?
            .dict_entry(category)
            .set(name, value);
        Ok(())
    }

    /// The layout cursor.
    pub fn y(&self) -> f64 {
        self.cursor.y
    }

    pub fn move_to_y(&mut self, y: f64) {
        self.cursor.y = y;
    }

    pub fn move_down(&mut self, dy: f64) {
        self.cursor.y -= dy;
    }

    /// Registers a named destination pointing at the top of `page_number`.
    pub fn add_destination(&mut self, name: &str, page_number: u32) -> Result<()> {
        let page_id = self.page_id(page_number)?;
        let dests_id = self.dests_id()?;
        let dests = self.store.dictionary_mut(dests_id)?;
        if dests.get("Names").and_then(Object::as_array).is_none() {
            dests.set("Names", Object::Array(Vec::new()));
        }
        let names = dests
            .get_array_mut("Names")
            .ok_or_else(|| PdfError::InvalidStructure("Dests has no Names".to_string()))?;

        let destination = Object::Array(vec![
            Object::Reference(page_id),
            Object::name("XYZ"),
            Object::Null,
            Object::Null,
            Object::Null,
        ]);

        // Name tree leaves are key/value pairs sorted by key.
        let mut index = 0;
        while index + 1 < names.len() {
            match names[index].as_string() {
                Some(key) if key == name => {
                    names[index + 1] = destination;
                    return Ok(());
                }
                Some(key) if key > name => break,
                _ => index += 2,
            }
        }
        names.insert(index, Object::String(name.to_string()));
        names.insert(index + 1, destination);
        Ok(())
    }

    /// Named destinations in key order, with the page each points at.
    pub fn destinations(&self) -> Result<Vec<(String, ObjectId)>> {
        let Some(dests_id) = self.existing_dests_id()? else {
            return Ok(Vec::new());
        };
        let names = self
            .store
            .dictionary(dests_id)?
            .get("Names")
            .and_then(Object::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(names
            .chunks(2)
            .filter_map(|pair| match pair {
                [Object::String(key), Object::Array(dest)] => dest
                    .first()
                    .and_then(Object::as_reference)
                    .map(|page| (key.clone(), page)),
                _ => None,
            })
            .collect())
    }

    fn existing_dests_id(&self) -> Result<Option<ObjectId>> {
        let catalog = self.store.dictionary(self.catalog_id)?;
        let Some(names_id) = catalog.get_reference("Names") else {
            return Ok(None);
        };
        Ok(self.store.dictionary(names_id)?.get_reference("Dests"))
    }

    fn dests_id(&mut self) -> Result<ObjectId> {
        if let Some(id) = self.existing_dests_id()? {
            return Ok(id);
        }
        let existing = self.store.dictionary(self.catalog_id)?.get_reference("Names");
        let names_id = match existing {
            Some(id) => id,
            None => {
                let id = self.store.insert(Dictionary::new());
                self.store.dictionary_mut(self.catalog_id)?.set("Names", id);
                id
            }
        };
        let dests_id = self.store.insert(Dictionary::new());
        self.store.dictionary_mut(names_id)?.set("Dests", dests_id);
        Ok(dests_id)
    }

    pub fn info(&self) -> Result<&Dictionary> {
        self.store.dictionary(self.info_id)
    }

    fn set_info(&mut self, key: &str, value: impl Into<Object>) -> Result<()> {
        self.store.dictionary_mut(self.info_id)?.set(key, value);
        Ok(())
    }

    pub fn title(&self) -> Option<String> {
        self.info()
            .ok()
            .and_then(|info| info.get("Title"))
            .and_then(Object::as_string)
            .map(str::to_string)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.set_info("Title", title.into())
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> Result<()> {
        self.set_info("Author", author.into())
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> Result<()> {
        self.set_info("Subject", subject.into())
    }

    pub fn set_keywords(&mut self, keywords: impl Into<String>) -> Result<()> {
        self.set_info("Keywords", keywords.into())
    }

    pub fn set_creator(&mut self, creator: impl Into<String>) -> Result<()> {
        self.set_info("Creator", creator.into())
    }

    pub fn set_producer(&mut self, producer: impl Into<String>) -> Result<()> {
        self.set_info("Producer", producer.into())
    }

    pub fn set_creation_date(&mut self, date: DateTime<Utc>) -> Result<()> {
        self.set_info("CreationDate", format_pdf_date(date))
    }

    pub fn set_modification_date(&mut self, date: DateTime<Utc>) -> Result<()> {
        self.set_info("ModDate", format_pdf_date(date))
    }

    /// Serializes the document into memory.
    ///
    /// # Errors
    ///
    /// Fails with `TransactionMisuse` while a transaction is open.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        PdfWriter::new_with_writer(&mut buffer).write_document(self)?;
        Ok(buffer)
    }

    /// Saves the document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction is open or the file cannot be
    /// created or written.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        writer::ensure_closed(self)?;
        let mut writer = PdfWriter::new(path)?;
        writer.write_document(self)
    }

    pub(crate) fn current_page(&self) -> Result<u32> {
        match self.cursor.page_number {
            0 => Err(PdfError::NoCurrentPage),
            number => Ok(number),
        }
    }
}

/// Makes `layout` the root of the layout axis and its margin box the root
/// of the bounds axis. Pushed frames above either root stay in place.
fn enter_layout(stacks: &mut StateStacks, layout: PageLayout) {
    stacks.replace_root(Frame::Layout(layout));
    stacks.replace_root(Frame::Bounds(layout.margin_box()));
}

/// Inserts the resource dictionary, content streams and page dictionary
/// for one page. Returns the page and its authored content stream.
fn build_page(
    store: &mut ObjectStore,
    pages_id: ObjectId,
    layout: &PageLayout,
    template: Option<&TemplatePage>,
) -> (ObjectId, ObjectId) {
    let mut resources = template
        .map(|t| t.resources.clone())
        .unwrap_or_default();
    if !resources.contains_key("ProcSet") {
        resources.set(
            "ProcSet",
            vec![Object::name("PDF"), Object::name("Text")],
        );
    }
    let resources_id = store.insert(resources);

    let mut contents: Vec<Object> = template
        .map(|t| {
            t.streams
                .iter()
                .map(|data| Object::Reference(store.insert(Stream::new(data.clone()))))
                .collect()
        })
        .unwrap_or_default();
    let content_id = store.insert(Stream::new(Vec::new()));
    contents.push(Object::Reference(content_id));

    let mut page = Dictionary::new();
    page.set("Type", Object::name("Page"));
    page.set("Parent", pages_id);
    page.set(
        "MediaBox",
        layout
            .media_box()
            .to_array()
            .iter()
            .map(|v| Object::Real(*v))
            .collect::<Vec<_>>(),
    );
    page.set("Resources", resources_id);
    if contents.len() == 1 {
        page.set("Contents", content_id);
    } else {
        page.set("Contents", contents);
    }
    (store.insert(page), content_id)
}

/// Format a DateTime as a PDF date string (D:YYYYMMDDHHmmSSOHH'mm)
pub(crate) fn format_pdf_date(date: DateTime<Utc>) -> String {
    let formatted = date.format("D:%Y%m%d%H%M%S");
    format!("{formatted}+00'00")
}
