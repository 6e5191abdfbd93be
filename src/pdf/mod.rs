mod extract;
mod normalize;

pub use extract::{PdfInput, extract_pages, load_pdf};
pub use normalize::{DocumentText, NormalizeStats, normalize_pages};
