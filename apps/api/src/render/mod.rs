// Document rendering: ResumeRecord → PDF / DOCX bytes.
// Both renderers draw from the same `Outline` so section order and wording
// never diverge between formats.

pub mod docx;
pub mod metrics;
pub mod outline;
pub mod pdf;

use thiserror::Error;

use crate::models::ResumeRecord;

use outline::build_outline;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to generate PDF: {0}")]
    Pdf(String),

    #[error("Failed to generate DOCX: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// Renders a record in the requested format.
pub fn render(record: &ResumeRecord, format: DocumentFormat) -> Result<Vec<u8>, RenderError> {
    let outline = build_outline(record);
    match format {
        DocumentFormat::Pdf => pdf::render_pdf(&outline),
        DocumentFormat::Docx => docx::render_docx(&outline),
    }
}
