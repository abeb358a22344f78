/*!
 * Screenplay import: text acquisition and segmentation.
 *
 * PDF text is extracted page by page with `pdf-extract`, each page followed
 * by a newline, and handed to the segmenter. Extraction failures are fatal
 * for the import and are never retried.
 */

use anyhow::{Context, Result};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::errors::ImportError;
use crate::file_utils::{FileManager, FileType};
use crate::screenplay::{Segmentation, Segmenter};

/// A screenplay that has been read and segmented
#[derive(Debug, Clone)]
pub struct ImportedScript {
    /// File the text came from
    pub source_file: PathBuf,

    /// SHA-256 of the source file bytes, hex encoded
    pub source_hash: String,

    /// Segmenter output
    pub segmentation: Segmentation,
}

/// Extract text from in-memory PDF bytes, one newline after each page
pub fn extract_text_from_pdf_bytes(bytes: &[u8]) -> Result<String, ImportError> {
    // pdf-extract panics on some malformed documents instead of returning an error
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ImportError::Extraction("PDF parser aborted on malformed input".to_string()))?
        .map_err(|e| ImportError::Extraction(e.to_string()))?;

    debug!("Extracted text from {} PDF pages", pages.len());

    let mut text = String::new();
    for page in pages.iter().filter(|page| !page.is_empty()) {
        text.push_str(page);
        text.push('\n');
    }

    Ok(text)
}

/// Read a PDF file and extract its text
pub fn extract_text_from_pdf<P: AsRef<Path>>(path: P) -> Result<String, ImportError> {
    let bytes = read_source(path.as_ref())?;
    extract_text_from_pdf_bytes(&bytes)
}

/// Hex encoded SHA-256 of `bytes`
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Read, extract and segment a screenplay.
///
/// PDF files go through text extraction; plain text files are segmented as is.
pub fn import_screenplay<P: AsRef<Path>>(path: P, segmenter: &Segmenter) -> Result<ImportedScript, ImportError> {
    let path = path.as_ref();
    let bytes = read_source(path)?;

    let text = match FileManager::detect_file_type(path) {
        FileType::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
        FileType::Pdf => extract_text_from_pdf_bytes(&bytes)?,
        FileType::Unknown => {
            warn!("Unrecognized extension for {:?}, trying PDF extraction", path);
            extract_text_from_pdf_bytes(&bytes)?
        }
    };

    if text.trim().is_empty() {
        return Err(ImportError::EmptyDocument(path.display().to_string()));
    }

    let segmentation = segmenter.segment(&text);

    info!(
        "Imported {:?}: {} scenes{}",
        path.file_name().unwrap_or_default(),
        segmentation.scenes.len(),
        if segmentation.used_fallback { " (no scene headings found)" } else { "" }
    );

    Ok(ImportedScript {
        source_file: path.to_path_buf(),
        source_hash: hash_bytes(&bytes),
        segmentation,
    })
}

/// Run [`import_screenplay`] on the blocking thread pool
pub async fn import_screenplay_async(path: PathBuf, segmenter: Segmenter) -> Result<ImportedScript> {
    tokio::task::spawn_blocking(move || import_screenplay(&path, &segmenter))
        .await
        .context("Import task panicked")?
        .map_err(anyhow::Error::from)
}

fn read_source(path: &Path) -> Result<Vec<u8>, ImportError> {
    std::fs::read(path).map_err(|e| ImportError::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
