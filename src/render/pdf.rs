use super::{text_width, Align, Command, DrawOp, Half, PageSize, Paint, Point, Surface};
use crate::style::{FontFace, Rgb};
use pdf_writer::{Content, Finish, Name, Pdf, Ref, Str};
use std::fmt;
use thiserror::Error;

/// Control point distance for approximating a quarter circle with a cubic
/// Bézier curve
const KAPPA: f32 = 0.552_284_8;

struct Page {
    size: PageSize,
    content: Content,
}

/// A [`Surface`] that builds a PDF document in memory.  Text is set in the
/// standard Type1 fonts, so only printable ASCII can be drawn.
pub(crate) struct PdfSurface {
    pages: Vec<Page>,
    fonts: Vec<FontFace>,
}

impl fmt::Debug for PdfSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfSurface")
            .field("pages", &self.pages.len())
            .field("fonts", &self.fonts)
            .finish()
    }
}

impl PdfSurface {
    pub(crate) fn new() -> PdfSurface {
        PdfSurface {
            pages: Vec::new(),
            fonts: Vec::new(),
        }
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn font_name(&mut self, face: FontFace) -> String {
        let i = match self.fonts.iter().position(|&f| f == face) {
            Some(i) => i,
            None => {
                self.fonts.push(face);
                self.fonts.len() - 1
            }
        };
        resource_name(i)
    }

    /// Serializes the document
    pub(crate) fn finish(self) -> Vec<u8> {
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let tree_id = alloc.bump();
        let font_ids = self.fonts.iter().map(|_| alloc.bump()).collect::<Vec<_>>();
        let page_ids = self
            .pages
            .iter()
            .map(|_| (alloc.bump(), alloc.bump()))
            .collect::<Vec<_>>();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids(page_ids.iter().map(|&(page_id, _)| page_id))
            .count(i32::try_from(page_ids.len()).unwrap_or(i32::MAX));
        for (face, &font_id) in std::iter::zip(&self.fonts, &font_ids) {
            pdf.type1_font(font_id)
                .base_font(Name(face.base_name().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }
        let font_names = (0..font_ids.len()).map(resource_name).collect::<Vec<_>>();
        for (page, &(page_id, content_id)) in std::iter::zip(self.pages, &page_ids) {
            let mut writer = pdf.page(page_id);
            writer
                .media_box(pdf_writer::Rect::new(
                    0.0,
                    0.0,
                    page.size.width,
                    page.size.height,
                ))
                .parent(tree_id)
                .contents(content_id);
            let mut resources = writer.resources();
            let mut fonts = resources.fonts();
            for (name, &font_id) in std::iter::zip(&font_names, &font_ids) {
                fonts.pair(Name(name.as_bytes()), font_id);
            }
            fonts.finish();
            resources.finish();
            writer.finish();
            pdf.stream(content_id, &page.content.finish());
        }
        pdf.finish()
    }
}

impl Surface for PdfSurface {
    type Error = PdfError;

    fn begin_page(&mut self, size: PageSize) -> Result<(), PdfError> {
        self.pages.push(Page {
            size,
            content: Content::new(),
        });
        Ok(())
    }

    fn draw(&mut self, command: Command) -> Result<(), PdfError> {
        if self.pages.is_empty() {
            return Err(PdfError::NoPage);
        }
        let font = match &command.op {
            DrawOp::Text { text, font, .. } => {
                check_encodable(text)?;
                Some((self.font_name(font.face), font.size))
            }
            _ => None,
        };
        let content = &mut self.pages.last_mut().ok_or(PdfError::NoPage)?.content;
        match command.op {
            DrawOp::FillRect { rect, color } => {
                set_fill(content, color);
                content
                    .rect(rect.x, rect.y, rect.width, rect.height)
                    .fill_nonzero();
            }
            DrawOp::StrokeRect {
                rect,
                color,
                width,
                dash,
            } => {
                content.save_state();
                set_stroke(content, color);
                content.set_line_width(width);
                if let Some(dash) = dash {
                    content.set_dash_pattern([dash, dash], 0.0);
                }
                content
                    .rect(rect.x, rect.y, rect.width, rect.height)
                    .stroke();
                content.restore_state();
            }
            DrawOp::Text {
                text,
                at,
                align,
                font: text_font,
                color,
            } => {
                let x = match align {
                    Align::Left => at.x,
                    Align::Center => at.x - text_width(&text, text_font) / 2.0,
                };
                if let Some((name, size)) = font {
                    set_fill(content, color);
                    content
                        .begin_text()
                        .set_font(Name(name.as_bytes()), size)
                        .next_line(x, at.y)
                        .show(Str(text.as_bytes()))
                        .end_text();
                }
            }
            DrawOp::Circle {
                center,
                radius,
                color,
                paint,
            } => {
                // Graphics state must be set before the path object begins
                content.save_state();
                set_fill(content, color);
                set_stroke(content, color);
                match paint {
                    Paint::Stroke(width) => {
                        content.set_line_width(width);
                        circle_path(content, center, radius);
                        content.stroke();
                    }
                    Paint::FillStroke(width) => {
                        content.set_line_width(width);
                        circle_path(content, center, radius);
                        content.fill_nonzero_and_stroke();
                    }
                }
                content.restore_state();
            }
            DrawOp::HalfDisc {
                center,
                radius,
                half,
                color,
            } => {
                set_fill(content, color);
                half_disc_path(content, center, radius, half);
                content.fill_nonzero();
            }
            DrawOp::SetFillColor(color) => set_fill(content, color),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum PdfError {
    #[error("cannot draw before a page has been started")]
    NoPage,
    #[error("text {0:?} cannot be set in a standard PDF font; only printable ASCII is supported")]
    Unencodable(String),
}

fn resource_name(i: usize) -> String {
    format!("F{}", i + 1)
}

fn check_encodable(text: &str) -> Result<(), PdfError> {
    if text.chars().all(|ch| matches!(ch, ' '..='~')) {
        Ok(())
    } else {
        Err(PdfError::Unencodable(text.to_owned()))
    }
}

fn set_fill(content: &mut Content, color: Rgb) {
    let [r, g, b] = color.unit();
    content.set_fill_rgb(r, g, b);
}

fn set_stroke(content: &mut Content, color: Rgb) {
    let [r, g, b] = color.unit();
    content.set_stroke_rgb(r, g, b);
}

fn circle_path(content: &mut Content, c: Point, r: f32) {
    let k = KAPPA * r;
    content
        .move_to(c.x + r, c.y)
        .cubic_to(c.x + r, c.y + k, c.x + k, c.y + r, c.x, c.y + r)
        .cubic_to(c.x - k, c.y + r, c.x - r, c.y + k, c.x - r, c.y)
        .cubic_to(c.x - r, c.y - k, c.x - k, c.y - r, c.x, c.y - r)
        .cubic_to(c.x + k, c.y - r, c.x + r, c.y - k, c.x + r, c.y)
        .close_path();
}

/// The half of a disc on one side of its vertical diameter
fn half_disc_path(content: &mut Content, c: Point, r: f32, half: Half) {
    let k = KAPPA * r;
    let (s, rk) = match half {
        Half::Right => (r, k),
        Half::Left => (-r, -k),
    };
    content
        .move_to(c.x, c.y - r)
        .line_to(c.x, c.y + r)
        .cubic_to(c.x + rk, c.y + r, c.x + s, c.y + k, c.x + s, c.y)
        .cubic_to(c.x + s, c.y - k, c.x + rk, c.y - r, c.x, c.y - r)
        .close_path();
}
