use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

const PAGE_SEPARATOR: &str = "\n\n";
const FOOTER_MARKERS: [&str; 2] = ["Crown copyright", "Stationery Office"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeStats {
    pub pages_total: usize,
    pub pages_skipped_empty: usize,
    pub header_spans_removed: usize,
    pub noise_lines_dropped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentText {
    pub text: String,
    pub stats: NormalizeStats,
}

impl DocumentText {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedPage {
    pub text: String,
    pub header_removed: bool,
    pub noise_lines_dropped: usize,
}

#[derive(Debug, Clone)]
pub struct PageNormalizer {
    act_header: Regex,
    blank_run: Regex,
}

impl PageNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // "Universal Credit Act 2025 (c. 22)" and anything before it on the line.
            act_header: Regex::new(r".*Act \d{4}\s+\(c\.\s*\d+\)")
                .context("failed to compile Act header regex")?,
            blank_run: Regex::new(r"\n\s*\n").context("failed to compile blank-run regex")?,
        })
    }

    pub fn clean_page(&self, page: &str) -> CleanedPage {
        // Only the first citation on a page is removed.
        let without_header = self.act_header.replace(page, "");
        let header_removed = without_header.len() != page.len();

        let mut noise_lines_dropped = 0usize;
        let lines = without_header
            .split('\n')
            .filter(|line| {
                let keep = !line_is_noise(line);
                if !keep {
                    noise_lines_dropped += 1;
                }
                keep
            })
            .collect::<Vec<&str>>();

        CleanedPage {
            text: self.collapse_blank_runs(&lines.join("\n")),
            header_removed,
            noise_lines_dropped,
        }
    }

    pub fn collapse_blank_runs(&self, text: &str) -> String {
        self.blank_run.replace_all(text, "\n\n").into_owned()
    }

    pub fn normalize<S: AsRef<str>>(&self, pages: &[S]) -> DocumentText {
        let mut stats = NormalizeStats {
            pages_total: pages.len(),
            ..NormalizeStats::default()
        };
        let mut cleaned = Vec::with_capacity(pages.len());

        for page in pages {
            let page = page.as_ref();
            if page.trim().is_empty() {
                stats.pages_skipped_empty += 1;
                continue;
            }

            let page = self.clean_page(page);
            if page.header_removed {
                stats.header_spans_removed += 1;
            }
            stats.noise_lines_dropped += page.noise_lines_dropped;
            cleaned.push(page.text);
        }

        DocumentText {
            text: cleaned.join(PAGE_SEPARATOR),
            stats,
        }
    }
}

fn line_is_noise(line: &str) -> bool {
    let stripped = line.trim();
    if stripped.is_empty() {
        return true;
    }

    if stripped.chars().all(|character| character.is_ascii_digit()) {
        return true;
    }

    FOOTER_MARKERS
        .iter()
        .any(|marker| stripped.contains(marker))
}

pub fn normalize_pages<S: AsRef<str>>(pages: &[S]) -> Result<DocumentText> {
    Ok(PageNormalizer::new()?.normalize(pages))
}
