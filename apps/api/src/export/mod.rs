// Document export: PDF (headless Chromium over the stored HTML) and Word
// (paragraph assembly from the content snapshot). PDF rendering is blocking
// and runs inside tokio::task::spawn_blocking.

pub mod assets;
pub mod docx;
pub mod handlers;
pub mod pdf;

pub use assets::AssetStore;
pub use pdf::{ChromePdfRenderer, PdfRenderer};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
