//! PDF reader using lopdf.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::detect::{pdf_version_from_bytes, pdf_version_from_path};
use crate::error::{Error, Result};
use crate::model::RawFragment;

use super::content::{self, TextDecoder};
use super::DocumentReader;

/// US Letter height, used when a page has no usable MediaBox.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Parent links followed when looking up inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Reads positioned text runs from a PDF document.
pub struct PdfReader {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    version: String,
}

impl PdfReader {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let version = pdf_version_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        Ok(Self::from_document(doc, version))
    }

    /// Read a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let version = pdf_version_from_bytes(data)?;
        // No file behind the bytes, so lopdf I/O errors are parse failures too.
        let doc = LopdfDocument::load_mem(data)
            .map_err(|e| Error::UnreadableDocument(e.to_string()))?;
        Ok(Self::from_document(doc, version))
    }

    /// Read a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn from_document(doc: LopdfDocument, version: String) -> Self {
        let pages = doc.get_pages();
        log::debug!("Loaded PDF {} with {} pages", version, pages.len());
        Self {
            doc,
            pages,
            version,
        }
    }

    /// PDF version from the file header (e.g., "1.7").
    pub fn version(&self) -> &str {
        &self.version
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        self.pages.get(&page_number).copied().ok_or_else(|| {
            Error::UnreadableDocument(format!(
                "page {} is out of range (document has {} pages)",
                page_number,
                self.pages.len()
            ))
        })
    }

    /// Page height from the (possibly inherited) MediaBox.
    fn page_height(&self, page_id: ObjectId) -> f32 {
        self.inherited_attribute(page_id, b"MediaBox")
            .and_then(|obj| self.resolve(obj).as_array().ok())
            .filter(|array| array.len() >= 4)
            .and_then(|array| {
                let bottom = content::get_number(self.resolve(&array[1]))?;
                let top = content::get_number(self.resolve(&array[3]))?;
                Some((top - bottom).abs())
            })
            .filter(|height| *height > 0.0)
            .unwrap_or(DEFAULT_PAGE_HEIGHT)
    }

    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Concatenated, decompressed content streams of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            log::warn!("Page object {:?} has no content stream", page_id);
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Stream(s) => Ok(stream_bytes(s)),
                Object::Array(arr) => self.concat_streams(arr),
                _ => Err(Error::UnreadableDocument(
                    "invalid content stream".to_string(),
                )),
            },
            Object::Array(arr) => self.concat_streams(arr),
            _ => Err(Error::UnreadableDocument(
                "invalid content stream".to_string(),
            )),
        }
    }

    fn concat_streams(&self, parts: &[Object]) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for part in parts {
            if let Object::Stream(s) = self.resolve(part) {
                content.extend_from_slice(&stream_bytes(s));
                content.push(b' ');
            }
        }
        Ok(content)
    }
}

impl DocumentReader for PdfReader {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_fragments(&self, page_number: u32) -> Result<Vec<RawFragment>> {
        let page_id = self.page_id(page_number)?;
        let data = self.page_content(page_id)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let operations = lopdf::content::Content::decode(&data)
            .map_err(|e| {
                Error::UnreadableDocument(format!("page {}: {}", page_number, e))
            })?
            .operations;

        let fonts = PageFonts::new(&self.doc, self.doc.get_page_fonts(page_id)?);
        let runs = content::walk_operations(&operations, &fonts);
        Ok(content::into_reading_order(runs, self.page_height(page_id)))
    }
}

/// Stream data, decompressed when the stream declares filters.
fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Font dictionaries of one page, keyed by resource name.
struct PageFonts<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    base_fonts: HashMap<Vec<u8>, String>,
}

impl<'a> PageFonts<'a> {
    fn new(doc: &'a LopdfDocument, fonts: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        let base_fonts = fonts
            .iter()
            .filter_map(|(name, dict)| {
                let base = dict.get(b"BaseFont").ok()?.as_name().ok()?;
                Some((name.clone(), String::from_utf8_lossy(base).to_string()))
            })
            .collect();
        Self {
            doc,
            fonts,
            base_fonts,
        }
    }
}

impl TextDecoder for PageFonts<'_> {
    fn base_font(&self, resource: &[u8]) -> String {
        self.base_fonts
            .get(resource)
            .cloned()
            .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string())
    }

    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String {
        if let Some(font_dict) = self.fonts.get(resource) {
            if let Ok(encoding) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        content::decode_text_simple(bytes)
    }
}
