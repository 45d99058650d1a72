//! PDF renderer: A4 pages, Helvetica base fonts, greedy line wrapping.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::metrics::{get_metrics, BaseFont};
use super::outline::{Block, Outline};
use super::RenderError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const TEXT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const BULLET_INDENT_MM: f32 = 5.0;
const MM_PER_PT: f32 = 25.4 / 72.0;
const LEADING: f32 = 1.3;

const TITLE_PT: f32 = 20.0;
const CONTACT_PT: f32 = 10.0;
const HEADING_PT: f32 = 13.0;
const ENTRY_PT: f32 = 11.0;
const BODY_PT: f32 = 10.5;

pub fn render_pdf(outline: &Outline) -> Result<Vec<u8>, RenderError> {
    let mut writer = PdfWriter::new(&outline.title)?;

    writer.write_wrapped(&outline.title, BaseFont::HelveticaBold, TITLE_PT, 0.0);
    if let Some(contact) = &outline.contact {
        writer.write_wrapped(contact, BaseFont::Helvetica, CONTACT_PT, 0.0);
    }

    for section in &outline.sections {
        writer.gap(4.0);
        writer.write_wrapped(section.heading, BaseFont::HelveticaBold, HEADING_PT, 0.0);
        writer.gap(1.0);

        for block in &section.blocks {
            match block {
                Block::EntryTitle(text) => {
                    writer.gap(1.5);
                    writer.write_wrapped(text, BaseFont::HelveticaBold, ENTRY_PT, 0.0);
                }
                Block::Detail(text) | Block::Paragraph(text) => {
                    writer.write_wrapped(text, BaseFont::Helvetica, BODY_PT, 0.0)
                }
                Block::Bullet(text) => writer.write_bullet(text),
            }
        }
    }

    writer
        .doc
        .save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Baseline of the next line, measured from the bottom edge.
    cursor_mm: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            pdf_text(title),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn gap(&mut self, mm: f32) {
        self.cursor_mm -= mm;
    }

    fn write_wrapped(&mut self, text: &str, font: BaseFont, size_pt: f32, indent_mm: f32) {
        let text = pdf_text(text);
        let width_em = (TEXT_WIDTH_MM - indent_mm) / (size_pt * MM_PER_PT);
        for line in get_metrics(font).wrap(&text, width_em) {
            self.write_line(&line, font, size_pt, MARGIN_MM + indent_mm);
        }
    }

    fn write_bullet(&mut self, text: &str) {
        let text = pdf_text(text);
        let width_em = (TEXT_WIDTH_MM - BULLET_INDENT_MM) / (BODY_PT * MM_PER_PT);
        for (i, line) in get_metrics(BaseFont::Helvetica)
            .wrap(&text, width_em)
            .into_iter()
            .enumerate()
        {
            let x = MARGIN_MM + BULLET_INDENT_MM;
            self.write_line(&line, BaseFont::Helvetica, BODY_PT, x);
            if i == 0 {
                self.layer.use_text(
                    "-",
                    BODY_PT,
                    Mm(MARGIN_MM + 1.0),
                    Mm(self.cursor_mm),
                    &self.regular,
                );
            }
        }
    }

    fn write_line(&mut self, line: &str, font: BaseFont, size_pt: f32, x_mm: f32) {
        let height = line_height_mm(size_pt);
        if self.cursor_mm - height < MARGIN_MM {
            self.new_page();
        }
        self.cursor_mm -= height;
        let font_ref = match font {
            BaseFont::Helvetica => &self.regular,
            BaseFont::HelveticaBold => &self.bold,
        };
        self.layer
            .use_text(line, size_pt, Mm(x_mm), Mm(self.cursor_mm), font_ref);
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor_mm = PAGE_HEIGHT_MM - MARGIN_MM;
    }
}

fn line_height_mm(size_pt: f32) -> f32 {
    size_pt * MM_PER_PT * LEADING
}

/// Maps text onto what the built-in fonts can show: typographic punctuation
/// becomes ASCII, other characters outside Latin-1 become '?'.
fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2022}' => '*',
            '\t' | '\n' | '\r' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}
