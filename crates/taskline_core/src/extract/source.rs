//! Import sources: decoding raw documents into scannable text.
//!
//! # Responsibility
//! - Decode plain text, HTML, `.docx` and `.pdf` into a text buffer.
//! - Run extraction over the decoded text and build a bounded preview.
//!
//! # Invariants
//! - The preview is capped at 5000 characters; extraction always sees the
//!   full decoded text.
//! - A document that cannot be decoded is an error, never a panic.

use crate::extract::label::collapse_whitespace;
use crate::extract::{extract_dates, ExtractedOccurrence};
use crate::model::date::CanonicalDate;
use log::{info, warn};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const TEXT_PREVIEW_MAX_CHARS: usize = 5000;
const DOCX_BODY_PART: &str = "word/document.xml";

static SCRIPT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").expect("valid script block regex"));
static STYLE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").expect("valid style block regex"));
static MARKUP_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The bytes are not a readable document of the named format.
    DecodeFailed {
        format: SourceFormat,
        message: String,
    },
    /// The page did not answer within the fetch timeout.
    FetchTimedOut,
    /// Any other fetch failure: bad URL, DNS, refused connection, TLS.
    FetchFailed(String),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeFailed { format, message } => {
                write!(f, "cannot decode {} document: {message}", format.as_str())
            }
            Self::FetchTimedOut => write!(f, "page fetch timed out; try again"),
            Self::FetchFailed(message) => write!(f, "page fetch failed: {message}"),
        }
    }
}

impl Error for ImportError {}

/// Decodable source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    PlainText,
    Html,
    Docx,
    Pdf,
}

impl SourceFormat {
    /// Picks a format from a file name's extension (case-insensitive).
    ///
    /// Unknown extensions are read as plain text.
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "docx" => Self::Docx,
            "pdf" => Self::Pdf,
            "html" | "htm" => Self::Html,
            _ => Self::PlainText,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Html => "html",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }
}

/// Decoded text preview plus the dates found in the full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub text_preview: String,
    pub dates: Vec<ExtractedOccurrence>,
}

/// Removes script/style blocks and tags, then collapses whitespace.
pub fn strip_markup(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK_RE.replace_all(html, " ");
    let without_styles = STYLE_BLOCK_RE.replace_all(&without_scripts, " ");
    let without_tags = MARKUP_TAG_RE.replace_all(&without_styles, " ");
    collapse_whitespace(&without_tags)
}

/// Decodes raw bytes into text.
///
/// Plain text and HTML never fail: invalid UTF-8 sequences become U+FFFD.
pub fn decode(format: SourceFormat, bytes: &[u8]) -> Result<String, ImportError> {
    match format {
        SourceFormat::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
        SourceFormat::Html => Ok(strip_markup(&String::from_utf8_lossy(bytes))),
        SourceFormat::Docx => decode_docx(bytes),
        SourceFormat::Pdf => decode_pdf(bytes),
    }
}

/// Scans already-decoded text.
pub fn scan_text(text: &str, today: CanonicalDate) -> ImportOutcome {
    ImportOutcome {
        text_preview: text.chars().take(TEXT_PREVIEW_MAX_CHARS).collect(),
        dates: extract_dates(text, today),
    }
}

/// Decodes a named document and scans it for dates.
pub fn import_document(
    file_name: &str,
    bytes: &[u8],
    today: CanonicalDate,
) -> Result<ImportOutcome, ImportError> {
    let format = SourceFormat::from_file_name(file_name);
    let text = match decode(format, bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                "event=import_document module=extract status=error error_code=decode_failed format={} bytes={}",
                format.as_str(),
                bytes.len()
            );
            return Err(err);
        }
    };
    let outcome = scan_text(&text, today);
    info!(
        "event=import_document module=extract status=ok format={} bytes={} dates={}",
        format.as_str(),
        bytes.len(),
        outcome.dates.len()
    );
    Ok(outcome)
}

// Paragraph text lives in `w:t` runs; tabs and breaks are empty elements.
fn decode_docx(bytes: &[u8]) -> Result<String, ImportError> {
    let failed = |message: String| ImportError::DecodeFailed {
        format: SourceFormat::Docx,
        message,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|err| failed(err.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(|err| failed(format!("{DOCX_BODY_PART}: {err}")))?
        .read_to_string(&mut xml)
        .map_err(|err| failed(format!("{DOCX_BODY_PART}: {err}")))?;

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) => {
                if element.local_name().as_ref() == b"t" {
                    in_run_text = true;
                }
            }
            Ok(Event::End(element)) => match element.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(element)) => match element.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(run)) if in_run_text => {
                let unescaped = run.unescape().map_err(|err| failed(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(failed(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn decode_pdf(bytes: &[u8]) -> Result<String, ImportError> {
    let failed = |message: String| ImportError::DecodeFailed {
        format: SourceFormat::Pdf,
        message,
    };

    // The PDF decoder panics on some malformed inputs.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(failed(err.to_string())),
        Err(_) => Err(failed("decoder aborted on malformed input".to_string())),
    }
}
