//! PDF access behind a small trait.
//!
//! The fragment interpreter only needs three things from a PDF library:
//! the page list, each page's content operations and a way to turn shown
//! strings into text. [`LopdfBackend`] provides them over lopdf; tests
//! provide them over canned operations.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Content-stream operand, reduced to what text positioning reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer or real
    Number(f32),
    /// Resource name such as a font key
    Name(Vec<u8>),
    /// Shown string bytes, still font-encoded
    Bytes(Vec<u8>),
    /// `TJ` arrays
    Array(Vec<Operand>),
    Other,
}

impl Operand {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&Object> for Operand {
    fn from(obj: &Object) -> Self {
        match obj {
            Object::Integer(i) => Operand::Number(*i as f32),
            Object::Real(r) => Operand::Number(*r),
            Object::Name(n) => Operand::Name(n.clone()),
            Object::String(bytes, _) => Operand::Bytes(bytes.clone()),
            Object::Array(items) => Operand::Array(items.iter().map(Operand::from).collect()),
            _ => Operand::Other,
        }
    }
}

/// One content-stream operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<Operand>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Source of page content for the statement parser.
pub trait PdfBackend {
    /// Pages in document order, keyed by 1-based page number.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Decoded operations of every content stream of a page, concatenated.
    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>>;

    /// Text of a shown string in the page font `font`.
    fn decode_text(&self, page: PageId, font: &[u8], bytes: &[u8]) -> String;
}

/// Best-effort decoding for strings whose font encoding is unknown:
/// UTF-16BE with BOM, then UTF-8, then Latin-1.
pub fn decode_fallback(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_owned(),
            Err(_) => bytes.iter().copied().map(char::from).collect(),
        },
    }
}

/// Validate the `%PDF-x.y` header and return `x.y`.
pub fn check_pdf_header(data: &[u8]) -> Result<String> {
    let Some(rest) = data.strip_prefix(b"%PDF-") else {
        return Err(Error::UnknownFormat);
    };
    let Some(version) = rest.get(..3) else {
        return Err(Error::UnknownFormat);
    };

    let version_text = String::from_utf8_lossy(version).into_owned();
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => Ok(version_text),
        _ => Err(Error::UnsupportedVersion(version_text)),
    }
}

/// Check if bytes look like a PDF this crate can open.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    check_pdf_header(data).is_ok()
}

/// [`PdfBackend`] over a loaded `lopdf::Document`.
pub struct LopdfBackend {
    doc: Document,
}

impl LopdfBackend {
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_bytes(&std::fs::read(path)?)
    }

    /// Load a statement from memory; the header is checked before lopdf
    /// sees the data.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let version = check_pdf_header(data)?;
        let doc = Document::load_mem(data)?;
        if doc.is_encrypted() {
            log::warn!("LopdfBackend: statement is encrypted, some pages may not decode");
        }
        log::debug!(
            "LopdfBackend: PDF {} with {} pages",
            version,
            doc.get_pages().len()
        );
        Ok(Self { doc })
    }

    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// PDF version from the document header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Bytes of one content stream; unfiltered streams are returned as is.
    fn stream_bytes(&self, id: ObjectId) -> Result<Vec<u8>> {
        match self.doc.get_object(id)? {
            Object::Stream(stream) => Ok(stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone())),
            _ => Err(Error::PdfParse(format!(
                "content object {} {} is not a stream",
                id.0, id.1
            ))),
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>> {
        let page_dict = self.doc.get_dictionary(page)?;

        // No Contents entry: a blank page.
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let ids: Vec<ObjectId> = match contents {
            Object::Reference(id) => vec![*id],
            Object::Array(items) => items
                .iter()
                .filter_map(|item| item.as_reference().ok())
                .collect(),
            _ => return Err(Error::PdfParse("malformed Contents entry".to_string())),
        };

        let mut data = Vec::new();
        for id in ids {
            data.extend(self.stream_bytes(id)?);
            data.push(b'\n');
        }

        let content = Content::decode(&data)?;
        Ok(content
            .operations
            .iter()
            .map(|op| ContentOp::new(op.operator.clone(), op.operands.iter().map(Operand::from).collect()))
            .collect())
    }

    fn decode_text(&self, page: PageId, font: &[u8], bytes: &[u8]) -> String {
        let encoded = self
            .doc
            .get_page_fonts(page)
            .ok()
            .and_then(|fonts| fonts.get(font).copied())
            .and_then(|dict| dict.get_font_encoding(&self.doc).ok())
            .and_then(|encoding| Document::decode_text(&encoding, bytes).ok());
        encoded.unwrap_or_else(|| decode_fallback(bytes))
    }
}
