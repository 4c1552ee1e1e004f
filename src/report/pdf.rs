//! PDF output for composed report pages
//!
//! Pages are laid out in points with the origin at the bottom-left corner and
//! drawn through printpdf. Text uses the embedded TrueType faces from
//! `metrics`, so any character those faces cover is rendered as written.

use super::metrics::Font;
use chrono::NaiveDateTime;
use log::debug;
use printpdf::path::PaintMode;
use printpdf::{
    Actions, BorderArray, IndirectFontRef, Line, LineCapStyle, LineJoinStyle, LinkAnnotation, Mm,
    OffsetDateTime, PdfLayerReference, Point, Pt, Rect, Rgb,
};

/// A4 in points
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

const LAYER_NAME: &str = "Cotação";
const PRODUCER: &str = "health_quote";

/// RGB color with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// `0x0052cc` style literal
    pub fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as f32 / 255.0,
            g: ((value >> 8) & 0xff) as f32 / 255.0,
            b: (value & 0xff) as f32 / 255.0,
        }
    }

    fn to_printpdf(self) -> printpdf::Color {
        printpdf::Color::Rgb(Rgb::new(self.r, self.g, self.b, None))
    }
}

/// Drawing operation in page coordinates (origin bottom-left, points)
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
    },
    Polyline {
        points: Vec<(f32, f32)>,
        color: Color,
        line_width: f32,
    },
    Link {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        uri: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<Op>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Text runs in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
    Rect::new(mm(x), mm(y), mm(x + width), mm(y + height))
}

/// Font handles registered with one printpdf document
struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

fn draw(layer: &PdfLayerReference, page: &Page, fonts: &Fonts) {
    layer.set_line_cap_style(LineCapStyle::Round);
    layer.set_line_join_style(LineJoinStyle::Round);

    for op in &page.ops {
        match op {
            Op::Text { x, y, font, size, color, text } => {
                if let Some(missing) = text.chars().find(|c| !font.has_glyph(*c)) {
                    debug!("no glyph for {:?} in {:?}", missing, text);
                }
                layer.set_fill_color(color.to_printpdf());
                layer.use_text(text.as_str(), *size, mm(*x), mm(*y), fonts.get(*font));
            }
            Op::Rect { x, y, width, height, fill, stroke } => {
                let mode = match (fill, stroke) {
                    (Some(_), Some(_)) => PaintMode::FillStroke,
                    (Some(_), None) => PaintMode::Fill,
                    (None, Some(_)) => PaintMode::Stroke,
                    (None, None) => continue,
                };
                if let Some(fill) = fill {
                    layer.set_fill_color(fill.to_printpdf());
                }
                if let Some((color, line_width)) = stroke {
                    layer.set_outline_color(color.to_printpdf());
                    layer.set_outline_thickness(*line_width);
                }
                layer.add_rect(rect(*x, *y, *width, *height).with_mode(mode));
            }
            Op::Polyline { points, color, line_width } => {
                if points.len() < 2 {
                    continue;
                }
                layer.set_outline_color(color.to_printpdf());
                layer.set_outline_thickness(*line_width);
                layer.add_line(Line {
                    points: points.iter().map(|(x, y)| (Point::new(mm(*x), mm(*y)), false)).collect(),
                    is_closed: false,
                });
            }
            Op::Link { x, y, width, height, uri } => {
                layer.add_link_annotation(LinkAnnotation::new(
                    rect(*x, *y, *width, *height),
                    Some(BorderArray::Solid([0.0, 0.0, 0.0])),
                    None,
                    Actions::uri(uri.clone()),
                    None,
                ));
            }
        }
    }
}

/// Composed pages plus the document metadata
#[derive(Debug, Clone)]
pub struct QuoteDocument {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub created_at: NaiveDateTime,
    pub pages: Vec<Page>,
}

impl QuoteDocument {
    pub fn new(title: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            title: title.into(),
            created_at,
            pages: Vec::new(),
        }
    }

    /// Serialize to PDF bytes. An empty page list still yields one blank page.
    pub fn to_bytes(&self) -> Result<Vec<u8>, printpdf::Error> {
        let (width, height) = (mm(self.width), mm(self.height));
        let (doc, first_page, first_layer) =
            printpdf::PdfDocument::new(self.title.as_str(), width, height, LAYER_NAME);

        let mut doc = doc.with_producer(PRODUCER).with_creator(PRODUCER);
        if let Ok(stamp) = OffsetDateTime::from_unix_timestamp(self.created_at.and_utc().timestamp()) {
            doc = doc
                .with_creation_date(stamp)
                .with_mod_date(stamp)
                .with_metadata_date(stamp);
        }

        let fonts = Fonts {
            regular: doc.add_external_font(Font::Regular.data())?,
            bold: doc.add_external_font(Font::Bold.data())?,
        };

        for (i, page) in self.pages.iter().enumerate() {
            let layer = if i == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) = doc.add_page(width, height, LAYER_NAME);
                doc.get_page(page_index).get_layer(layer_index)
            };
            draw(&layer, page, &fonts);
        }

        doc.save_to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use printpdf::lopdf;

    fn created_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(14, 30, 0).unwrap()
    }

    fn sample() -> QuoteDocument {
        let mut doc = QuoteDocument::new("Cotação", created_at());
        let mut first = Page::default();
        first.push(Op::Text {
            x: 30.0,
            y: 800.0,
            font: Font::Bold,
            size: 12.0,
            color: Color::hex(0x003a9e),
            text: "Preço (mensal) ✓ Łódź".into(),
        });
        first.push(Op::Rect {
            x: 30.0,
            y: 700.0,
            width: 100.0,
            height: 50.0,
            fill: Some(Color::hex(0xffffff)),
            stroke: Some((Color::hex(0xd1d5db), 0.5)),
        });
        first.push(Op::Link { x: 30.0, y: 650.0, width: 200.0, height: 12.0, uri: "https://www.unimed.com.br/rede".into() });
        let mut second = Page::default();
        second.push(Op::Polyline { points: vec![(0.0, 0.0), (5.0, 5.0)], color: Color::hex(0x10b981), line_width: 1.5 });
        second.push(Op::Text {
            x: 30.0,
            y: 40.0,
            font: Font::Regular,
            size: 8.0,
            color: Color::hex(0x999999),
            text: "Página 2 de 2".into(),
        });
        doc.pages = vec![first, second];
        doc
    }

    fn parse(bytes: &[u8]) -> lopdf::Document {
        lopdf::Document::load_mem(bytes).unwrap()
    }

    #[test]
    fn test_color_hex() {
        let c = Color::hex(0xff0000);
        assert_eq!((c.r, c.g, c.b), (1.0, 0.0, 0.0));
        let c = Color::hex(0x0052cc);
        assert!((c.b - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_page_texts() {
        let doc = sample();
        assert_eq!(doc.pages[0].texts().collect::<Vec<_>>(), vec!["Preço (mensal) ✓ Łódź"]);
        assert_eq!(doc.pages[1].texts().collect::<Vec<_>>(), vec!["Página 2 de 2"]);
    }

    #[test]
    fn test_document_parses_back() {
        let bytes = sample().to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let parsed = parse(&bytes);
        assert_eq!(parsed.get_pages().len(), 2);

        let info = parsed.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = parsed.get_dictionary(info).unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), "Cotação".as_bytes());
        assert_eq!(info.get(b"Producer").unwrap().as_str().unwrap(), b"health_quote");
    }

    #[test]
    fn test_link_annotation_on_first_page() {
        let parsed = parse(&sample().to_bytes().unwrap());
        let pages = parsed.get_pages();
        let annots = |number: u32| {
            let page = parsed.get_dictionary(pages[&number]).unwrap();
            page.get(b"Annots").unwrap().as_array().unwrap().len()
        };
        assert_eq!(annots(1), 1);
        assert_eq!(annots(2), 0);
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let doc = QuoteDocument::new("Vazio", created_at());
        let parsed = parse(&doc.to_bytes().unwrap());
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn test_both_faces_embedded() {
        let parsed = parse(&sample().to_bytes().unwrap());
        let embedded = parsed
            .objects
            .values()
            .filter_map(|object| object.as_dict().ok())
            .filter(|dict| dict.has(b"FontFile2"))
            .count();
        assert_eq!(embedded, 2);
    }
}
