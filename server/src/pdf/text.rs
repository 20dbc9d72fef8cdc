//! Standard-14 Helvetica metrics, `WinAnsiEncoding`, and line layout.
//!
//! Only the two base fonts are ever referenced, so their advance widths are
//! tabulated here instead of loading AFM files. Widths are in 1/1000 em.

use fields::Alignment;
use fields::layout::wrap_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    #[must_use]
    pub fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }

    /// Preferred `/Font` resource name. Renamed on pages that already use it.
    #[must_use]
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "FM_OVL_R",
            Self::Bold => "FM_OVL_B",
        }
    }
}

// Advance widths for bytes 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Map one character to its `WinAnsiEncoding` byte.
///
/// Latin-1 maps directly; the typographic punctuation of the 0x80 block is
/// translated; anything else becomes `?`. Tabs and other whitespace become a
/// space.
#[must_use]
pub fn win_ansi_byte(c: char) -> u8 {
    if c.is_whitespace() {
        return b' ';
    }
    let code = u32::from(c);
    if (0x20..0x7F).contains(&code) || (0xA0..=0xFF).contains(&code) {
        return u8::try_from(code).unwrap_or(b'?');
    }
    match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

#[must_use]
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

/// Unaccented ASCII letter sharing the glyph width of a Latin-1 letter.
fn latin1_base(byte: u8) -> Option<u8> {
    let base = match byte {
        0xC0..=0xC5 => b'A',
        0xC7 => b'C',
        0xC8..=0xCB => b'E',
        0xCC..=0xCF => b'I',
        0xD0 => b'D',
        0xD1 => b'N',
        0xD2..=0xD6 | 0xD8 => b'O',
        0xD9..=0xDC => b'U',
        0xDD => b'Y',
        0xE0..=0xE5 => b'a',
        0xE7 => b'c',
        0xE8..=0xEB => b'e',
        0xEC..=0xEF => b'i',
        0xF1 => b'n',
        0xF2..=0xF6 => b'o',
        0xF9..=0xFC => b'u',
        0xFD | 0xFF => b'y',
        _ => return None,
    };
    Some(base)
}

fn byte_width(face: Face, byte: u8) -> u16 {
    let table = match face {
        Face::Regular => &HELVETICA_ASCII,
        Face::Bold => &HELVETICA_BOLD_ASCII,
    };
    if (0x20..0x7F).contains(&byte) {
        return table[usize::from(byte - 0x20)];
    }
    if let Some(base) = latin1_base(byte) {
        return table[usize::from(base - 0x20)];
    }
    match byte {
        0xA0 => 278,
        0xC6 | 0x85 | 0x89 | 0x97 | 0x99 => 1000,
        0xE6 => 889,
        0x91 | 0x92 | 0x82 => 222,
        0x95 => 350,
        _ => 556,
    }
}

/// Width of `text` in points when set in `face` at `size`.
#[must_use]
pub fn text_width(face: Face, text: &str, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(byte_width(face, win_ansi_byte(c)))).sum();
    f64::from(units) / 1000.0 * size
}

/// Wrap `text` to `max_width` points, measuring with the font's real widths.
#[must_use]
pub fn layout_lines(face: Face, text: &str, size: f64, max_width: f64) -> Vec<String> {
    wrap_lines(text, max_width, |line| text_width(face, line, size))
}

/// Horizontal start of a line within a box `[x, x + width]`.
///
/// Justified text is set flush left.
#[must_use]
pub fn aligned_x(alignment: Alignment, x: f64, width: f64, line_width: f64) -> f64 {
    let slack = (width - line_width).max(0.0);
    match alignment {
        Alignment::Left | Alignment::Justify => x,
        Alignment::Center => x + slack / 2.0,
        Alignment::Right => x + slack,
    }
}

/// Parse `#rrggbb` or `#rgb` into unit RGB. Anything else is black.
#[must_use]
pub fn parse_color(raw: &str) -> (f32, f32, f32) {
    let hex = raw.trim().trim_start_matches('#');
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_owned(),
        _ => return (0.0, 0.0, 0.0),
    };
    let Ok(num) = u32::from_str_radix(&expanded, 16) else {
        return (0.0, 0.0, 0.0);
    };
    let channel = |shift: u32| f32::from(u8::try_from((num >> shift) & 0xFF).unwrap_or(0)) / 255.0;
    (channel(16), channel(8), channel(0))
}

#[cfg(test)]
#[path = "text_test.rs"]
mod tests;
