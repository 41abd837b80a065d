// SPDX-License-Identifier: MPL-2.0
//! Catalog sources and the document model they parse into.
//!
//! Every on-disk format (Qt Linguist `.ts`, TOML, compiled CBOR) is read into
//! a [`CatalogDocument`]: a language tag and, per context, a flat list of
//! messages. A plural message appears once per form, each copy carrying its
//! `plural_index`.

use super::ts;
use crate::config::CATALOG_EXTENSIONS;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Version written into compiled catalogs. Readers reject other versions.
pub const COMPILED_FORMAT_VERSION: u32 = 1;

/// Translator workflow state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageStatus {
    #[default]
    Finished,
    Unfinished,
    /// Obsolete or vanished: kept in the file but no longer used by the UI.
    Obsolete,
}

impl MessageStatus {
    fn is_finished(&self) -> bool {
        *self == MessageStatus::Finished
    }
}

/// Where a source string was extracted from. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One translation record of a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDoc {
    pub source: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural_index: Option<usize>,
    #[serde(default, skip_serializing_if = "MessageStatus::is_finished")]
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl MessageDoc {
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            disambiguation: None,
            plural_index: None,
            status: MessageStatus::Finished,
            location: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDoc {
    pub name: String,
    #[serde(default, rename = "message", skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageDoc>,
}

/// Parsed form of a catalog source, shared by all formats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Language declared by the file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, rename = "context", skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<ContextDoc>,
}

impl CatalogDocument {
    /// Total number of message records across all contexts.
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }
}

#[derive(Serialize, Deserialize)]
struct CompiledDocument {
    format_version: u32,
    document: CatalogDocument,
}

/// Encoding of a catalog source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Qt Linguist XML.
    Ts,
    Toml,
    /// CBOR written by [`super::Catalog::compile`].
    Compiled,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "xml" => Some(SourceFormat::Ts),
            "toml" => Some(SourceFormat::Toml),
            "cbor" => Some(SourceFormat::Compiled),
            _ => None,
        }
    }

    /// Guesses the format from content: XML starts with `<`, a compiled
    /// catalog with a CBOR map header, anything else is read as TOML.
    pub fn sniff(bytes: &[u8]) -> Self {
        let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        if matches!(body.first(), Some(0xA0..=0xBF)) {
            return SourceFormat::Compiled;
        }
        match body.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'<') => SourceFormat::Ts,
            _ => SourceFormat::Toml,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SourceFormat::Ts => CATALOG_EXTENSIONS[0],
            SourceFormat::Toml => CATALOG_EXTENSIONS[1],
            SourceFormat::Compiled => CATALOG_EXTENSIONS[2],
        }
    }
}

/// Raw bytes of one catalog plus where they came from.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    origin: String,
    format: SourceFormat,
    bytes: Cow<'static, [u8]>,
}

impl CatalogSource {
    /// Reads a catalog file. The format comes from the extension, or from the
    /// content when the extension is unknown.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(SourceFormat::from_extension)
            .unwrap_or_else(|| SourceFormat::sniff(&bytes));
        Ok(Self {
            origin: path.display().to_string(),
            format,
            bytes: Cow::Owned(bytes),
        })
    }

    pub fn from_text(
        origin: impl Into<String>,
        format: SourceFormat,
        text: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            format,
            bytes: Cow::Owned(text.into().into_bytes()),
        }
    }

    pub fn from_bytes(
        origin: impl Into<String>,
        format: SourceFormat,
        bytes: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        Self {
            origin: origin.into(),
            format,
            bytes: bytes.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Parses the source into a document.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedCatalog`] when the bytes are not a well-formed
    /// document of the source's format.
    pub fn parse(&self) -> Result<CatalogDocument> {
        match self.format {
            SourceFormat::Ts => ts::parse(&self.origin, self.text()?),
            SourceFormat::Toml => {
                toml::from_str(self.text()?).map_err(|e| Error::malformed(&self.origin, e))
            }
            SourceFormat::Compiled => {
                let compiled: CompiledDocument = ciborium::from_reader(self.bytes.as_ref())
                    .map_err(|e| Error::malformed(&self.origin, e))?;
                if compiled.format_version != COMPILED_FORMAT_VERSION {
                    return Err(Error::malformed(
                        &self.origin,
                        format!(
                            "compiled format version {} is not supported",
                            compiled.format_version
                        ),
                    ));
                }
                Ok(compiled.document)
            }
        }
    }

    fn text(&self) -> Result<&str> {
        let text =
            std::str::from_utf8(&self.bytes).map_err(|e| Error::malformed(&self.origin, e))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
    }
}

/// Writes `document` in the compiled format.
pub(crate) fn write_compiled<W: std::io::Write>(
    document: CatalogDocument,
    writer: W,
) -> Result<()> {
    let compiled = CompiledDocument {
        format_version: COMPILED_FORMAT_VERSION,
        document,
    };
    ciborium::into_writer(&compiled, writer).map_err(|e| Error::Io(e.to_string()))
}
