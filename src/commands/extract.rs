use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{ExtractArgs, SourceArgs};
use crate::pdf::{DocumentText, PdfInput, extract_pages, load_pdf, normalize_pages};
use crate::util::write_text;

const SHORT_TEXT_CHARS: usize = 100;

pub fn run(args: ExtractArgs) -> Result<()> {
    let (_, document) = extract_document(&args.source)?;

    match &args.output {
        Some(path) => {
            write_text(path, &document.text)?;
            info!(path = %path.display(), "wrote normalized text");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(document.text.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .context("failed to write normalized text to stdout")?;
        }
    }

    Ok(())
}

pub fn extract_document(source: &SourceArgs) -> Result<(PdfInput, DocumentText)> {
    let input = load_pdf(&source.pdf, source.max_bytes)?;
    info!(
        source = %input.label(),
        bytes = input.bytes.len(),
        backend = source.backend.as_str(),
        "extracting text from PDF"
    );

    let pages = extract_pages(&input, source.backend)?;
    let document = normalize_pages(&pages)?;

    info!(
        pages = document.stats.pages_total,
        skipped_empty = document.stats.pages_skipped_empty,
        headers_removed = document.stats.header_spans_removed,
        noise_lines_dropped = document.stats.noise_lines_dropped,
        chars = document.char_count(),
        "text extracted"
    );
    warn_if_short(&document);

    Ok((input, document))
}

fn warn_if_short(document: &DocumentText) -> bool {
    let short = document.char_count() < SHORT_TEXT_CHARS;
    if short {
        warn!(
            chars = document.char_count(),
            "extracted text is very short; the PDF may be scanned or image-only"
        );
    }
    short
}
