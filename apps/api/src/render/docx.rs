use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use super::outline::{Block, Outline};
use super::RenderError;

// docx-rs sizes are in half-points.
const TITLE_SIZE: usize = 36;
const HEADING_SIZE: usize = 26;
const ENTRY_SIZE: usize = 22;
const BODY_SIZE: usize = 21;

const BULLET: &str = "• ";

pub fn render_docx(outline: &Outline) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new().add_paragraph(paragraph(&outline.title, TITLE_SIZE, true));

    if let Some(contact) = &outline.contact {
        docx = docx.add_paragraph(paragraph(contact, BODY_SIZE, false));
    }

    for section in &outline.sections {
        docx = docx.add_paragraph(paragraph(section.heading, HEADING_SIZE, true));
        for block in &section.blocks {
            let para = match block {
                Block::EntryTitle(text) => paragraph(text, ENTRY_SIZE, true),
                Block::Detail(text) => Paragraph::new()
                    .add_run(Run::new().add_text(text.as_str()).size(BODY_SIZE).italic()),
                Block::Paragraph(text) => paragraph(text, BODY_SIZE, false),
                Block::Bullet(text) => paragraph(&format!("{BULLET}{text}"), BODY_SIZE, false),
            };
            docx = docx.add_paragraph(para);
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| RenderError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}

fn paragraph(text: &str, size: usize, bold: bool) -> Paragraph {
    let mut run = Run::new().add_text(text).size(size);
    if bold {
        run = run.bold();
    }
    Paragraph::new().add_run(run)
}
