use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::cli::ExtractBackend;

#[derive(Debug, Clone)]
pub struct PdfInput {
    pub path: Option<PathBuf>,
    pub bytes: Vec<u8>,
}

impl PdfInput {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { path: None, bytes }
    }

    pub fn label(&self) -> String {
        self.path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

pub fn load_pdf(path: &Path, max_bytes: u64) -> Result<PdfInput> {
    if path.as_os_str() == "-" {
        let bytes = read_limited(std::io::stdin().lock(), max_bytes)?;
        ensure_pdf_header(&bytes, "<stdin>")?;
        return Ok(PdfInput::from_bytes(bytes));
    }

    let metadata =
        fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    if !metadata.is_file() {
        bail!("not a file: {}", path.display());
    }
    if metadata.len() > max_bytes {
        bail!(
            "{} is {} bytes, above the {} byte limit",
            path.display(),
            metadata.len(),
            max_bytes
        );
    }

    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    ensure_pdf_header(&bytes, &path.display().to_string())?;

    Ok(PdfInput {
        path: Some(path.to_path_buf()),
        bytes,
    })
}

fn read_limited(reader: impl Read, max_bytes: u64) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .context("failed to read PDF from stdin")?;
    if bytes.len() as u64 > max_bytes {
        bail!("stdin PDF is above the {max_bytes} byte limit");
    }
    Ok(bytes)
}

fn ensure_pdf_header(bytes: &[u8], label: &str) -> Result<()> {
    if !bytes.starts_with(b"%PDF") {
        bail!("{label} does not look like a PDF (missing %PDF header)");
    }
    Ok(())
}

pub fn extract_pages(input: &PdfInput, backend: ExtractBackend) -> Result<Vec<String>> {
    let pages = match backend {
        ExtractBackend::Native => extract_pages_native(&input.bytes)
            .with_context(|| format!("failed to extract text from {}", input.label()))?,
        ExtractBackend::Pdftotext => match &input.path {
            Some(path) => extract_pages_with_pdftotext(path)?,
            None => extract_buffer_with_pdftotext(&input.bytes)?,
        },
    };

    debug!(
        backend = backend.as_str(),
        pages = pages.len(),
        "extracted page text"
    );
    Ok(pages)
}

fn extract_pages_native(bytes: &[u8]) -> Result<Vec<String>> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|err| anyhow::anyhow!("pdf-extract failed: {err}"))?;

    Ok(pages
        .into_iter()
        .map(|page| page.replace('\u{0000}', ""))
        .collect())
}

fn extract_buffer_with_pdftotext(bytes: &[u8]) -> Result<Vec<String>> {
    let mut file = tempfile::Builder::new()
        .prefix("actcheck_")
        .suffix(".pdf")
        .tempfile()
        .context("failed to create temporary PDF file")?;
    file.write_all(bytes)
        .context("failed to write temporary PDF file")?;
    file.flush().context("failed to flush temporary PDF file")?;

    extract_pages_with_pdftotext(file.path())
}

fn extract_pages_with_pdftotext(pdf_path: &Path) -> Result<Vec<String>> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    Ok(split_form_feed_pages(&raw))
}

fn split_form_feed_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    // pdftotext terminates every page with a form feed, leaving a trailing empty chunk.
    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    if pages.is_empty() {
        warn!("pdftotext produced no page text");
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_form_feed_pages_drops_trailing_empty_chunks() {
        let pages = split_form_feed_pages("first page\n\u{000C}second\u{0000} page\n\u{000C}\n");
        assert_eq!(pages, vec!["first page\n", "second page\n"]);
    }

    #[test]
    fn split_form_feed_pages_keeps_interior_empty_pages() {
        let pages = split_form_feed_pages("one\u{000C}\u{000C}three\u{000C}");
        assert_eq!(pages, vec!["one", "", "three"]);
    }

    #[test]
    fn load_pdf_rejects_files_over_limit() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"%PDF-1.7\n0123456789").expect("write");

        let err = load_pdf(file.path(), 4).expect_err("file above limit should fail");
        assert!(err.to_string().contains("byte limit"));
    }

    #[test]
    fn load_pdf_rejects_non_pdf_content() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"plain text, not a pdf").expect("write");

        let err = load_pdf(file.path(), 1024).expect_err("non-pdf should fail");
        assert!(err.to_string().contains("%PDF"));
    }

    #[test]
    fn load_pdf_keeps_path_and_bytes() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"%PDF-1.4\n%%EOF\n").expect("write");

        let input = load_pdf(file.path(), 1024).expect("pdf should load");
        assert_eq!(input.path.as_deref(), Some(file.path()));
        assert!(input.bytes.starts_with(b"%PDF-1.4"));
    }

    #[test]
    fn read_limited_rejects_streams_over_limit() {
        let err = read_limited(&b"%PDF-1.7 and more"[..], 8).expect_err("over limit");
        assert!(err.to_string().contains("byte limit"));

        let bytes = read_limited(&b"%PDF-1.7"[..], 8).expect("at limit");
        assert_eq!(bytes, b"%PDF-1.7");
    }

    #[test]
    fn native_backend_reports_corrupt_pdf_with_context() {
        let input = PdfInput::from_bytes(b"%PDF-1.4\nthis is not a real document".to_vec());
        let err = extract_pages(&input, ExtractBackend::Native).expect_err("corrupt pdf");
        assert!(format!("{err:#}").contains("failed to extract text from <memory>"));
    }
}
