//! Minimal single-font-family page canvas on top of `lopdf`.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.
//! Text uses the standard Helvetica faces with WinAnsi encoding, so no font
//! files are embedded.

use lopdf::{
    Dictionary, Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};

use super::DocumentResult;
use crate::utils::text::fold_accent;

pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;
pub const CM: f32 = 28.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl Font {
    const ALL: [Font; 4] = [Font::Regular, Font::Bold, Font::Oblique, Font::BoldOblique];

    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Oblique => "F3",
            Self::BoldOblique => "F4",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Oblique => "Helvetica-Oblique",
            Self::BoldOblique => "Helvetica-BoldOblique",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldOblique)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);

    /// `0xRRGGBB`.
    pub const fn hex(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        )
    }
}

// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722, 722, 667,
    611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500,
    222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722, 722, 667,
    611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556,
    278, 889, 611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let table = if font.is_bold() {
        &HELVETICA_BOLD
    } else {
        &HELVETICA
    };

    let units: u32 = text
        .chars()
        .map(|c| {
            let c = fold_accent(c);
            match c as u32 {
                code @ 32..=126 => table[(code - 32) as usize] as u32,
                _ => 556,
            }
        })
        .sum();

    units as f32 * size / 1000.0
}

/// Encodes `text` as WinAnsi bytes; unmappable characters become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Drawing operations for a single page.
#[derive(Debug)]
pub struct Page {
    width: f32,
    height: f32,
    operations: Vec<Operation>,
}

impl Page {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            operations: Vec::new(),
        }
    }

    pub fn a4_portrait() -> Self {
        Self::new(A4_WIDTH, A4_HEIGHT)
    }

    pub fn a4_landscape() -> Self {
        Self::new(A4_HEIGHT, A4_WIDTH)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        self.fill_color(color);
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource().into(), Object::Real(size)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Centres `text` horizontally on the page.
    pub fn text_centered(&mut self, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        let x = (self.width - text_width(text, font, size)) / 2.0;
        self.text(x.max(0.0), y, font, size, color, text);
    }

    /// Centres `text` inside the horizontal span `[x, x + width]`.
    pub fn text_in(&mut self, x: f32, width: f32, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        let offset = (width - text_width(text, font, size)) / 2.0;
        self.text(x + offset.max(0.0), y, font, size, color, text);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.fill_color(color);
        self.operations.extend([
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(y),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("f", vec![]),
        ]);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line: f32, color: Rgb) {
        self.stroke_style(line, color);
        self.operations.extend([
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(y),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("S", vec![]),
        ]);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), line: f32, color: Rgb) {
        self.stroke_style(line, color);
        self.operations.extend([
            Operation::new("m", vec![Object::Real(from.0), Object::Real(from.1)]),
            Operation::new("l", vec![Object::Real(to.0), Object::Real(to.1)]),
            Operation::new("S", vec![]),
        ]);
    }

    fn fill_color(&mut self, Rgb(r, g, b): Rgb) {
        self.operations.push(Operation::new(
            "rg",
            vec![Object::Real(r), Object::Real(g), Object::Real(b)],
        ));
    }

    fn stroke_style(&mut self, line: f32, Rgb(r, g, b): Rgb) {
        self.operations.extend([
            Operation::new("w", vec![Object::Real(line)]),
            Operation::new(
                "RG",
                vec![Object::Real(r), Object::Real(g), Object::Real(b)],
            ),
        ]);
    }
}

/// Assembles pages into a PDF and returns its bytes.
pub fn render(pages: Vec<Page>, title: &str) -> DocumentResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in &pages {
        let content = Content {
            operations: page.operations.clone(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.width),
                Object::Real(page.height),
            ],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "Resources" => resources_id,
        }),
    );

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi(title)),
        "Producer" => Object::string_literal("ergo"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn win_ansi_keeps_spanish_letters() {
        assert_eq!(win_ansi("Ñandú"), vec![0xd1, b'a', b'n', b'd', 0xfa]);
        assert_eq!(win_ansi("N°"), vec![b'N', 0xb0]);
        assert_eq!(win_ansi("a—b"), vec![b'a', 0x97, b'b']);
        assert_eq!(win_ansi("→"), vec![b'?']);
    }

    #[test]
    fn bold_text_is_wider() {
        let regular = text_width("Capacitación", Font::Regular, 12.0);
        let bold = text_width("Capacitación", Font::Bold, 12.0);
        assert!(bold > regular);
        assert!((text_width("0", Font::Regular, 10.0) - 5.56).abs() < 0.001);
    }

    #[test]
    fn renders_a_pdf() {
        let mut page = Page::a4_portrait();
        page.text_centered(700.0, Font::Bold, 16.0, Rgb::hex(0x1a365d), "Hola");
        page.line((10.0, 10.0), (100.0, 10.0), 0.5, Rgb::hex(0xa0aec0));

        let bytes = render(vec![page], "Prueba").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}
