//! The open document handle.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use once_cell::unsync::OnceCell;

use super::actions::parse_dest;
use super::backend::{self, dict_get, dict_get_dict, integer, name_str, name_tree_lookup};
use super::labels::{label_to_index, PageLabels};
use super::options::OpenOptions;
use super::outline::OutlineTree;
use crate::config::GlobalParams;
use crate::decode::{decode_date, decode_text_object};
use crate::detect::{detect_format_from_bytes, PdfFormat};
use crate::error::{Error, LoadErrorCode, Result};
use crate::model::{
    Destination, Metadata, MetadataField, MetadataValue, Page, PageLayout, PageMode, Permissions,
    ViewerPreferences,
};
use crate::render::OutputDevice;

/// Locator reported for documents opened from memory.
const MEMORY_LOCATOR: &str = "<memory>";

/// An open PDF document.
///
/// Cloning the handle is cheap and shares the parsed document; it is
/// released when the last handle (including outline cursors, font scanners,
/// pages and export jobs) is dropped.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

struct DocumentInner {
    pdf: RefCell<LopdfDocument>,
    locator: String,
    format: PdfFormat,
    encrypted: bool,
    permissions: Permissions,
    page_ids: Vec<ObjectId>,
    device: OutputDevice,
    labels: OnceCell<Option<PageLabels>>,
    outline: RefCell<Option<OutlineTree>>,
}

impl Document {
    /// Open a document from a file.
    ///
    /// Encrypted documents are decrypted with `password`, or with the empty
    /// password when none is given.
    pub fn open<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<Self> {
        Self::open_with_options(path, OpenOptions::new().with_optional_password(password))
    }

    /// Open a document from a file with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let locator = path.display().to_string();
        let data = fs::read(path).map_err(|e| Error::load_io(&e, locator.as_str()))?;
        Self::load(&data, locator, &options)
    }

    /// Open a document from memory.
    pub fn from_bytes(data: &[u8], password: Option<&str>) -> Result<Self> {
        let options = OpenOptions::new().with_optional_password(password);
        Self::load(data, MEMORY_LOCATOR.to_string(), &options)
    }

    fn load(data: &[u8], locator: String, options: &OpenOptions) -> Result<Self> {
        // Loading a document always makes sure the process tables exist.
        GlobalParams::global();

        let format = detect_format_from_bytes(data).map_err(|e| match e {
            Error::UnsupportedVersion(_) => Error::load(LoadErrorCode::UnsupportedVersion, locator.as_str()),
            _ => Error::load(LoadErrorCode::Damaged, locator.as_str()),
        })?;

        let mut pdf = LopdfDocument::load_mem(data).map_err(|e| Error::from_lopdf(e, &locator))?;

        // lopdf applies an empty user password while loading and drops
        // `/Encrypt` from the trailer; the decoded state is all that is left.
        let implicitly_decrypted = pdf.encryption_state.is_some();
        let encrypted = implicitly_decrypted || pdf.is_encrypted();
        let permissions = match &pdf.encryption_state {
            Some(state) => Permissions::from_bits(state.permissions().p_value() as i64),
            None if encrypted => encryption_permissions(&pdf),
            None => Permissions::FULL,
        };

        match (encrypted, implicitly_decrypted, options.password.as_deref()) {
            (false, _, _) => {}
            (true, true, None) => log::debug!("Decrypted '{}' with the empty password", locator),
            (true, true, Some(password)) => {
                if !authenticate_decrypted(&pdf, password) {
                    log::debug!("Password rejected for '{}'", locator);
                    return Err(Error::Encrypted);
                }
                log::debug!("Decrypted '{}'", locator);
            }
            (true, false, password) => {
                if let Err(e) = pdf.decrypt(password.unwrap_or("")) {
                    log::debug!("Decryption of '{}' failed: {}", locator, e);
                    return Err(Error::Encrypted);
                }
                log::debug!("Decrypted '{}'", locator);
            }
        }

        if backend::catalog(&pdf).is_none() {
            return Err(Error::load(LoadErrorCode::BadCatalog, locator));
        }

        let page_ids: Vec<ObjectId> = pdf.get_pages().into_values().collect();
        let device = OutputDevice::start_doc(&pdf, &page_ids);

        log::debug!(
            "Opened '{}': PDF-{}, {} pages",
            locator,
            format.version,
            page_ids.len()
        );

        Ok(Self {
            inner: Rc::new(DocumentInner {
                pdf: RefCell::new(pdf),
                locator,
                format,
                encrypted,
                permissions,
                page_ids,
                device,
                labels: OnceCell::new(),
                outline: RefCell::new(None),
            }),
        })
    }

    /// Write the current object graph to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let save_error = |reason: String| Error::Save {
            path: path.display().to_string(),
            reason,
        };

        let file = File::create(path).map_err(|e| save_error(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        self.inner
            .pdf
            .borrow_mut()
            .save_to(&mut writer)
            .map_err(|e| save_error(e.to_string()))?;
        writer.flush().map_err(|e| save_error(e.to_string()))?;

        log::debug!("Saved '{}' to {}", self.inner.locator, path.display());
        Ok(())
    }

    /// Where the document was loaded from.
    pub fn locator(&self) -> &str {
        &self.inner.locator
    }

    /// Header version, e.g. "1.7".
    pub fn version(&self) -> &str {
        &self.inner.format.version
    }

    pub fn is_linearized(&self) -> bool {
        self.inner.format.linearized
    }

    /// Whether the file was encrypted on disk.
    pub fn is_encrypted(&self) -> bool {
        self.inner.encrypted
    }

    pub fn page_count(&self) -> usize {
        self.inner.page_ids.len()
    }

    /// Page at a 0-based index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.page_count()`.
    pub fn page(&self, index: usize) -> Page {
        match self.get_page(index) {
            Ok(page) => page,
            Err(e) => panic!("{}", e),
        }
    }

    /// Page at a 0-based index.
    ///
    /// Fails with [`Error::PageOutOfRange`] if `index >= self.page_count()`.
    pub fn get_page(&self, index: usize) -> Result<Page> {
        let out_of_range = || Error::PageOutOfRange(index.saturating_add(1), self.page_count());
        let id = *self.inner.page_ids.get(index).ok_or_else(out_of_range)?;
        let geometry = *self.inner.device.page(index).ok_or_else(out_of_range)?;
        Ok(Page::new(self.clone(), index, id, geometry))
    }

    /// Page carrying the printable label `label`.
    pub fn page_by_label(&self, label: &str) -> Option<Page> {
        let index = label_to_index(self.labels(), label, self.page_count())?;
        self.get_page(index).ok()
    }

    /// Printable label of the page at a 0-based index, if the document has
    /// a label table covering it.
    pub fn page_label(&self, index: usize) -> Option<String> {
        if index >= self.page_count() {
            return None;
        }
        self.labels()?.label(index)
    }

    fn labels(&self) -> Option<&PageLabels> {
        self.inner
            .labels
            .get_or_init(|| {
                let pdf = self.pdf();
                backend::catalog(&pdf).and_then(|catalog| PageLabels::from_catalog(&pdf, catalog))
            })
            .as_ref()
    }

    /// Resolve a named destination through `/Dests` or the `/Names` tree.
    pub fn find_dest(&self, name: &str) -> Option<Destination> {
        let pdf = self.pdf();
        let catalog = backend::catalog(&pdf)?;
        let key = name.as_bytes();

        let value = dict_get_dict(&pdf, catalog, b"Dests")
            .and_then(|dests| dests.get(key).ok())
            .or_else(|| {
                let names = dict_get_dict(&pdf, catalog, b"Names")?;
                let tree = dict_get_dict(&pdf, names, b"Dests")?;
                name_tree_lookup(&pdf, tree, key)
            })?;

        match parse_dest(&pdf, value, &self.inner.page_ids)? {
            // A named destination must resolve to an explicit one.
            Destination::Named(_) => None,
            dest => Some(dest),
        }
    }

    /// Compute every metadata field.
    pub fn metadata(&self) -> Metadata {
        let text = |field| self.metadata_field(field).and_then(|v| v.as_text().map(str::to_string));
        let date = |field| self.metadata_field(field).and_then(|v| v.as_date());

        Metadata {
            title: text(MetadataField::Title),
            format: text(MetadataField::Format),
            author: text(MetadataField::Author),
            subject: text(MetadataField::Subject),
            keywords: text(MetadataField::Keywords),
            creator: text(MetadataField::Creator),
            producer: text(MetadataField::Producer),
            created: date(MetadataField::CreationDate),
            modified: date(MetadataField::ModDate),
            linearized: self.is_linearized(),
            page_layout: self.page_layout(),
            page_mode: self.page_mode(),
            viewer_preferences: self.viewer_preferences(),
            permissions: self.permissions(),
        }
    }

    /// Compute a single metadata field. Absent text and date fields are `None`.
    pub fn metadata_field(&self, field: MetadataField) -> Option<MetadataValue> {
        match field {
            MetadataField::Format => Some(MetadataValue::Text(format!("PDF-{}", self.version()))),
            MetadataField::CreationDate | MetadataField::ModDate => {
                let key = field.info_key()?;
                self.info_value(key, |obj| match obj {
                    Object::String(bytes, _) => decode_date(bytes),
                    _ => None,
                })
                .map(MetadataValue::Date)
            }
            MetadataField::Linearized => Some(MetadataValue::Flag(self.is_linearized())),
            MetadataField::PageLayout => Some(MetadataValue::PageLayout(self.page_layout())),
            MetadataField::PageMode => Some(MetadataValue::PageMode(self.page_mode())),
            MetadataField::ViewerPreferences => {
                Some(MetadataValue::ViewerPreferences(self.viewer_preferences()))
            }
            MetadataField::Permissions => Some(MetadataValue::Permissions(self.permissions())),
            text_field => {
                let key = text_field.info_key()?;
                self.info_value(key, decode_text_object).map(MetadataValue::Text)
            }
        }
    }

    fn info_value<T>(&self, key: &[u8], decode: impl Fn(&Object) -> Option<T>) -> Option<T> {
        let pdf = self.pdf();
        let info = backend::info_dict(&pdf)?;
        dict_get(&pdf, info, key).and_then(decode)
    }

    pub fn title(&self) -> Option<String> {
        self.text_field(MetadataField::Title)
    }

    pub fn author(&self) -> Option<String> {
        self.text_field(MetadataField::Author)
    }

    pub fn subject(&self) -> Option<String> {
        self.text_field(MetadataField::Subject)
    }

    pub fn keywords(&self) -> Option<String> {
        self.text_field(MetadataField::Keywords)
    }

    pub fn creator(&self) -> Option<String> {
        self.text_field(MetadataField::Creator)
    }

    pub fn producer(&self) -> Option<String> {
        self.text_field(MetadataField::Producer)
    }

    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        self.metadata_field(MetadataField::CreationDate)?.as_date()
    }

    pub fn modification_date(&self) -> Option<DateTime<Utc>> {
        self.metadata_field(MetadataField::ModDate)?.as_date()
    }

    fn text_field(&self, field: MetadataField) -> Option<String> {
        match self.metadata_field(field)? {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn page_layout(&self) -> PageLayout {
        self.catalog_name(b"PageLayout")
            .map(|name| PageLayout::from_name(&name))
            .unwrap_or_default()
    }

    pub fn page_mode(&self) -> PageMode {
        self.catalog_name(b"PageMode")
            .map(|name| PageMode::from_name(&name))
            .unwrap_or_default()
    }

    fn catalog_name(&self, key: &[u8]) -> Option<String> {
        let pdf = self.pdf();
        let catalog = backend::catalog(&pdf)?;
        dict_get(&pdf, catalog, key).and_then(name_str)
    }

    pub fn viewer_preferences(&self) -> ViewerPreferences {
        let pdf = self.pdf();
        let Some(prefs) = backend::catalog(&pdf).and_then(|c| dict_get_dict(&pdf, c, b"ViewerPreferences"))
        else {
            return ViewerPreferences::default();
        };

        let flag = |key: &[u8]| matches!(dict_get(&pdf, prefs, key), Some(Object::Boolean(true)));
        ViewerPreferences {
            hide_toolbar: flag(b"HideToolbar"),
            hide_menubar: flag(b"HideMenubar"),
            hide_window_ui: flag(b"HideWindowUI"),
            fit_window: flag(b"FitWindow"),
            center_window: flag(b"CenterWindow"),
            display_doc_title: flag(b"DisplayDocTitle"),
            direction_rtl: dict_get(&pdf, prefs, b"Direction")
                .and_then(name_str)
                .is_some_and(|direction| direction == "R2L"),
        }
    }

    /// Permissions granted by the security handler.
    pub fn permissions(&self) -> Permissions {
        self.inner.permissions
    }

    /// Number of live handles sharing this document.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Whether two handles share the same open document.
    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the parsed object graph.
    pub(crate) fn pdf(&self) -> Ref<'_, LopdfDocument> {
        self.inner.pdf.borrow()
    }

    pub(crate) fn page_ids(&self) -> &[ObjectId] {
        &self.inner.page_ids
    }

    pub(crate) fn device(&self) -> &OutputDevice {
        &self.inner.device
    }

    /// The document's outline arena, built on first use.
    pub(crate) fn outline(&self) -> RefMut<'_, OutlineTree> {
        let mut slot = self.inner.outline.borrow_mut();
        if slot.is_none() {
            let pdf = self.pdf();
            *slot = Some(OutlineTree::load(&pdf, &self.inner.page_ids));
        }
        RefMut::map(slot, |tree| tree.get_or_insert_with(OutlineTree::default))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("locator", &self.inner.locator)
            .field("version", &self.inner.format.version)
            .field("pages", &self.inner.page_ids.len())
            .field("encrypted", &self.inner.encrypted)
            .finish()
    }
}

/// `/P` of the trailer's encryption dictionary.
/// Check `password` against a document lopdf already decrypted on load.
///
/// The encryption dictionary is rebuilt from the decoded state next to the
/// original file identifier, so the supplied password is authenticated as
/// user or owner password instead of being ignored.
fn authenticate_decrypted(pdf: &LopdfDocument, password: &str) -> bool {
    let Some(state) = pdf.encryption_state.as_ref() else {
        return false;
    };
    let Ok(encrypt) = state.encode() else {
        return false;
    };

    let mut check = LopdfDocument::with_version(pdf.version.as_str());
    let encrypt_id = check.add_object(encrypt);
    check.trailer.set("Encrypt", encrypt_id);
    if let Ok(file_id) = pdf.trailer.get(b"ID") {
        check.trailer.set("ID", file_id.clone());
    }
    check.authenticate_password(password).is_ok()
}

fn encryption_permissions(pdf: &LopdfDocument) -> Permissions {
    let encrypt: Option<&Dictionary> = dict_get_dict(pdf, &pdf.trailer, b"Encrypt");
    encrypt
        .and_then(|dict| dict_get(pdf, dict, b"P"))
        .and_then(integer)
        .map(Permissions::from_bits)
        .unwrap_or(Permissions::FULL)
}
