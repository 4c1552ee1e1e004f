//! Embedded report fonts and text measurement
//!
//! Both faces are compiled into the binary so the PDF and the layout measure
//! the same glyphs. Advances come from the font's `hmtx` table via ttf-parser.

use std::sync::OnceLock;
use ttf_parser::Face;

static SANS_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static SANS_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Em fraction used when a face cannot be parsed
const FALLBACK_ADVANCE: f32 = 0.6;

/// Fonts used by the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Raw TrueType data embedded into the document
    pub fn data(&self) -> &'static [u8] {
        match self {
            Font::Regular => SANS_REGULAR,
            Font::Bold => SANS_BOLD,
        }
    }

    fn face(&self) -> Option<&'static Face<'static>> {
        static REGULAR: OnceLock<Option<Face<'static>>> = OnceLock::new();
        static BOLD: OnceLock<Option<Face<'static>>> = OnceLock::new();

        let cell = match self {
            Font::Regular => &REGULAR,
            Font::Bold => &BOLD,
        };
        cell.get_or_init(|| match Face::parse(self.data(), 0) {
            Ok(face) => Some(face),
            Err(e) => {
                log::warn!("cannot parse embedded {:?} font: {}", self, e);
                None
            }
        })
        .as_ref()
    }

    /// Whether the face has a glyph for `c`. Characters without one are
    /// dropped by the PDF writer.
    pub fn has_glyph(&self, c: char) -> bool {
        self.face().map_or(true, |face| face.glyph_index(c).is_some())
    }
}

/// Advance of `c` as a fraction of the font size
pub fn char_advance(font: Font, c: char) -> f32 {
    let Some(face) = font.face() else {
        return FALLBACK_ADVANCE;
    };
    let units_per_em = f32::from(face.units_per_em().max(1));
    face.glyph_index(c)
        .and_then(|glyph| face.glyph_hor_advance(glyph))
        .map_or(0.0, |advance| f32::from(advance) / units_per_em)
}

/// Width of `text` in points
pub fn text_width(font: Font, size: f32, text: &str) -> f32 {
    text.chars().map(|c| char_advance(font, c)).sum::<f32>() * size
}

/// Split an over-long word so every piece fits `max_width`
fn break_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if text_width(font, size, &current) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word wrap. Always returns at least one line.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if text_width(font, size, &candidate) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(font, size, word) <= max_width {
            current = word.to_string();
        } else {
            let mut pieces = break_word(word, font, size, max_width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_faces_parse() {
        for font in [Font::Regular, Font::Bold] {
            assert!(font.face().is_some());
            assert!(font.data().len() > 100_000);
        }
    }

    #[test]
    fn test_advances_follow_the_face() {
        assert!(char_advance(Font::Regular, 'W') > char_advance(Font::Regular, 'i'));
        assert!(char_advance(Font::Bold, 'm') > char_advance(Font::Regular, 'm'));
        // tabular digits
        assert_eq!(char_advance(Font::Regular, '1'), char_advance(Font::Regular, '8'));
        assert!(char_advance(Font::Regular, ' ') > 0.0);
    }

    #[test]
    fn test_text_width() {
        let a = text_width(Font::Regular, 10.0, "R$ ");
        let b = text_width(Font::Regular, 10.0, "522,00");
        assert!((text_width(Font::Regular, 10.0, "R$ 522,00") - (a + b)).abs() < 1e-4);
        assert!((text_width(Font::Regular, 20.0, "522,00") - 2.0 * b).abs() < 1e-4);
        assert_eq!(text_width(Font::Bold, 12.0, ""), 0.0);
    }

    #[test]
    fn test_glyphs_beyond_latin1_are_measured() {
        for c in ['ç', 'ã', 'Ł', 'ő', '€', '✓', '—'] {
            assert!(Font::Regular.has_glyph(c), "{:?} missing", c);
            assert!(char_advance(Font::Regular, c) > 0.0, "{:?} has no width", c);
        }
        assert!(text_width(Font::Bold, 10.0, "Łódź") > text_width(Font::Bold, 10.0, "Łód"));
    }

    #[test]
    fn test_wrap_text() {
        let text = "Consulte os prazos de carência antes de contratar o plano escolhido";
        let lines = wrap_text(text, Font::Regular, 10.0, 120.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(Font::Regular, 10.0, line) <= 120.0);
        }
        assert_eq!(lines.join(" "), text);

        assert_eq!(wrap_text("", Font::Regular, 10.0, 100.0), vec![String::new()]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let url = "https://www.example.com/rede-credenciada/lista-completa-de-prestadores";
        let lines = wrap_text(url, Font::Bold, 11.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), url);
        for line in &lines {
            assert!(text_width(Font::Bold, 11.0, line) <= 100.0);
        }
    }
}
