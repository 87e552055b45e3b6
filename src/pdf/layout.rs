use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

use crate::error::{DocError, Result};
use crate::pdf::logo::Logo;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;
/// Content past this line moves to a fresh page.
pub const MAX_Y: f32 = 270.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const PT_TO_MM: f32 = 0.352_778;

/// Cursor-based writer over an A4 document. The cursor runs top-down in
/// millimetres from the page's top edge; the flip to PDF's bottom-left
/// origin happens at the single point where text and shapes are emitted.
pub struct Composer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
    pages: usize,
}

impl Composer {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DocError::PdfRender(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DocError::PdfRender(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor: MARGIN,
            pages: 1,
        })
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Break to a new page if `needed` millimetres do not fit above the
    /// break line. Called before every emitted row or line.
    pub fn ensure_space(&mut self, needed: f32) {
        if self.cursor + needed > MAX_Y {
            self.new_page();
        }
    }

    pub fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.cursor = MARGIN;
    }

    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    /// Text with its left edge at `x`, baseline at the current cursor.
    pub fn text(&self, x: f32, content: &str, size: f32, bold: bool) {
        self.layer.use_text(
            content,
            size,
            Mm(x),
            Mm(PAGE_HEIGHT - self.cursor),
            self.font(bold),
        );
    }

    /// Text with its right edge at `x`.
    pub fn text_right(&self, x: f32, content: &str, size: f32, bold: bool) {
        self.text(x - text_width(content, size), content, size, bold);
    }

    /// Text centred between `left` and `right`.
    pub fn text_centered(&self, left: f32, right: f32, content: &str, size: f32, bold: bool) {
        let x = left + ((right - left) - text_width(content, size)) / 2.0;
        self.text(x, content, size, bold);
    }

    pub fn set_fill_color(&self, r: f32, g: f32, b: f32) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    pub fn set_stroke(&self, r: f32, g: f32, b: f32, thickness: f32) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(r, g, b, None)));
        self.layer.set_outline_thickness(thickness);
    }

    /// Horizontal rule at the current cursor.
    pub fn rule(&self, x1: f32, x2: f32) {
        self.line(x1, self.cursor, x2, self.cursor);
    }

    pub fn line(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(PAGE_HEIGHT - y1)), false),
                (Point::new(Mm(x2), Mm(PAGE_HEIGHT - y2)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    /// Filled rectangle whose top edge sits at `y_top`.
    pub fn fill_rect(&self, x: f32, y_top: f32, width: f32, height: f32) {
        let rect = Polygon {
            rings: vec![vec![
                (Point::new(Mm(x), Mm(PAGE_HEIGHT - y_top)), false),
                (Point::new(Mm(x + width), Mm(PAGE_HEIGHT - y_top)), false),
                (
                    Point::new(Mm(x + width), Mm(PAGE_HEIGHT - y_top - height)),
                    false,
                ),
                (Point::new(Mm(x), Mm(PAGE_HEIGHT - y_top - height)), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        };
        self.layer.add_polygon(rect);
    }

    /// Bordered but unfilled rectangle, used for the logo placeholder.
    pub fn stroke_rect(&self, x: f32, y_top: f32, width: f32, height: f32) {
        let rect = Polygon {
            rings: vec![vec![
                (Point::new(Mm(x), Mm(PAGE_HEIGHT - y_top)), false),
                (Point::new(Mm(x + width), Mm(PAGE_HEIGHT - y_top)), false),
                (
                    Point::new(Mm(x + width), Mm(PAGE_HEIGHT - y_top - height)),
                    false,
                ),
                (Point::new(Mm(x), Mm(PAGE_HEIGHT - y_top - height)), false),
            ]],
            mode: PaintMode::Stroke,
            winding_order: WindingOrder::NonZero,
        };
        self.layer.add_polygon(rect);
    }

    /// Place a decoded logo with its top-left corner at (x, y_top),
    /// scaled to the given size in millimetres.
    pub fn image(&self, logo: &Logo, x: f32, y_top: f32, width: f32, height: f32) {
        let image = logo.to_pdf_image();
        // At 72 dpi one pixel is one point, so the scale is target points
        // over pixel count.
        let scale_x = width / PT_TO_MM / logo.width as f32;
        let scale_y = height / PT_TO_MM / logo.height as f32;
        image.add_to_layer(
            self.layer.clone(),
            printpdf::ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(PAGE_HEIGHT - y_top - height)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(72.0),
                ..Default::default()
            },
        );
    }

    pub fn save_to_bytes(self) -> Result<Vec<u8>> {
        let mut writer = std::io::BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| DocError::PdfRender(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| DocError::PdfRender(e.to_string()))
    }
}

/// Approximate width of a Helvetica glyph in thousandths of an em.
/// Close enough for alignment and wrapping of invoice text.
fn char_units(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 278.0,
        'f' | 't' | 'I' | 'r' | '(' | ')' | '[' | ']' | '/' | ' ' => 333.0,
        'm' | 'M' | 'W' => 889.0,
        'w' => 722.0,
        'A' | 'B' | 'C' | 'D' | 'E' | 'F' | 'G' | 'H' | 'K' | 'N' | 'O' | 'P' | 'Q' | 'R'
        | 'S' | 'T' | 'U' | 'V' | 'X' | 'Y' | 'Z' => 700.0,
        '0'..='9' | '$' => 556.0,
        '-' => 333.0,
        _ => 556.0,
    }
}

/// Estimated rendered width in millimetres.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: f32 = text.chars().map(char_units).sum();
    units / 1000.0 * size * PT_TO_MM
}

/// Greedy word wrap against a width in millimetres. Words longer than
/// the full width are broken mid-word.
pub fn wrap_text(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, size) <= max_width {
                current = candidate;
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                if text_width(word, size) <= max_width {
                    current = word.to_string();
                } else {
                    // Hard-break an oversized word.
                    let mut piece = String::new();
                    for c in word.chars() {
                        piece.push(c);
                        if text_width(&piece, size) > max_width {
                            piece.pop();
                            lines.push(std::mem::take(&mut piece));
                            piece.push(c);
                        }
                    }
                    current = piece;
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Clip to one line, appending "..." when anything is cut.
pub fn truncate_to_width(text: &str, max_width: f32, size: f32) -> String {
    if text_width(text, size) <= max_width {
        return text.to_string();
    }
    let ellipsis = "...";
    let budget = max_width - text_width(ellipsis, size);
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if text_width(&out, size) > budget {
            out.pop();
            break;
        }
    }
    out.push_str(ellipsis);
    out
}
