//! Text measurement and paragraph reflow for the standard Helvetica faces

/// Millimetres per PDF point
pub const MM_PER_PT: f64 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    /// PostScript name of the standard Type1 face
    pub fn base_font(&self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name used in content streams
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        }
    }
}

// Advance widths (1/1000 em) for U+0020..=U+007E, from the Adobe core font metrics.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

// Advance widths for WinAnsi codes 0x80..=0xFF. Codes WinAnsi leaves
// undefined carry the width of `?`, which is what gets drawn for them.
#[rustfmt::skip]
const HELVETICA_HIGH_WIDTHS: [u16; 128] = [
    556, 556, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 556, 611, 556,
    556, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 556, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD_HIGH_WIDTHS: [u16; 128] = [
    556, 611, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 611, 611, 611,
    611, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 611, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// WinAnsiEncoding code drawn for `c`; anything unencodable becomes `?`
pub(crate) fn win_ansi_code(c: char) -> u8 {
    match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
        _ => b'?',
    }
}

fn char_units(c: char, style: FontStyle) -> u16 {
    let (low, high) = match style {
        FontStyle::Regular => (&HELVETICA_WIDTHS, &HELVETICA_HIGH_WIDTHS),
        FontStyle::Bold => (&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_HIGH_WIDTHS),
    };
    match win_ansi_code(c) {
        code @ 0x20..=0x7E => low[(code - 0x20) as usize],
        code @ 0x80..=0xFF => high[(code - 0x80) as usize],
        _ => low[(b'?' - 0x20) as usize],
    }
}

/// Width of `text` in millimetres when set at `size_pt`
pub fn text_width(text: &str, size_pt: f64, style: FontStyle) -> f64 {
    let units: u32 = text.chars().map(|c| char_units(c, style) as u32).sum();
    units as f64 / 1000.0 * size_pt * MM_PER_PT
}

/// Split `text` into lines no wider than `max_width` millimetres.
///
/// Breaks greedily at whitespace, which gives the fewest lines for a fixed
/// column. Runs of whitespace collapse to one space. Explicit newlines are
/// kept as hard breaks. A word wider than the column on its own is split
/// between characters.
pub fn reflow(text: &str, max_width: f64, size_pt: f64, style: FontStyle) -> Vec<String> {
    let fits = |s: &str| text_width(s, size_pt, style) <= max_width;
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        let mut cur = String::new();
        for word in source_line.split_whitespace() {
            let candidate = if cur.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", cur, word)
            };
            if fits(&candidate) {
                cur = candidate;
                continue;
            }
            if !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
            }
            if fits(word) {
                cur = word.to_string();
            } else {
                let mut pieces = split_long_word(word, &fits);
                cur = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        if !cur.is_empty() {
            lines.push(cur);
        }
    }

    lines
}

fn split_long_word(word: &str, fits: &dyn Fn(&str) -> bool) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut cur = String::new();
    for c in word.chars() {
        cur.push(c);
        if !fits(&cur) && cur.chars().count() > 1 {
            cur.pop();
            pieces.push(std::mem::take(&mut cur));
            cur.push(c);
        }
    }
    if !cur.is_empty() {
        pieces.push(cur);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARA: &str = "Participation in this process is entirely optional. Your privacy is protected throughout, and you may decline or withdraw consent at any time without any impact on the quality or continuity of care.";

    #[test]
    fn width_scales_with_font_size() {
        let w10 = text_width("Hello", 10.0, FontStyle::Regular);
        let w20 = text_width("Hello", 20.0, FontStyle::Regular);
        assert!((w20 - 2.0 * w10).abs() < 1e-9);
        // H e l l o = 722+556+222+222+556 units
        let expected = 2278.0 / 1000.0 * 10.0 * MM_PER_PT;
        assert!((w10 - expected).abs() < 1e-9);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let s = "Fairmont Obstetrics & Gynecology";
        assert!(text_width(s, 11.0, FontStyle::Bold) > text_width(s, 11.0, FontStyle::Regular));
    }

    #[test]
    fn reflow_respects_width_and_keeps_words() {
        let lines = reflow(PARA, 170.0, 10.0, FontStyle::Regular);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(text_width(line, 10.0, FontStyle::Regular) <= 170.0);
        }
        assert_eq!(lines.join(" "), PARA);
    }

    #[test]
    fn reflow_is_idempotent() {
        let first = reflow(PARA, 80.0, 10.0, FontStyle::Regular);
        let second = reflow(&first.join(" "), 80.0, 10.0, FontStyle::Regular);
        assert_eq!(first, second);
    }

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(reflow("Hello world", 170.0, 10.0, FontStyle::Regular), vec!["Hello world"]);
        assert!(reflow("   ", 170.0, 10.0, FontStyle::Regular).is_empty());
    }

    #[test]
    fn long_word_is_split_between_characters() {
        let word = "x".repeat(200);
        let lines = reflow(&word, 20.0, 10.0, FontStyle::Regular);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, 10.0, FontStyle::Regular) <= 20.0);
        }
    }

    #[test]
    fn newlines_are_hard_breaks() {
        let lines = reflow("one\ntwo", 170.0, 10.0, FontStyle::Regular);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn winansi_glyphs_use_their_own_widths() {
        let em = 10.0 * MM_PER_PT;
        assert!((text_width("\u{2014}", 10.0, FontStyle::Regular) - em).abs() < 1e-9);
        assert!((text_width("\u{c6}", 10.0, FontStyle::Bold) - em).abs() < 1e-9);
        assert_eq!(
            text_width("\u{c9}", 10.0, FontStyle::Regular),
            text_width("E", 10.0, FontStyle::Regular)
        );
        // unencodable text is drawn, and measured, as '?'
        assert_eq!(
            text_width("\u{4e2d}\u{6587}", 10.0, FontStyle::Bold),
            text_width("??", 10.0, FontStyle::Bold)
        );
    }

    #[test]
    fn reflow_keeps_wide_glyph_lines_inside_the_column() {
        let dashes = "\u{2014}".repeat(60);
        let lines = reflow(&dashes, 170.0, 10.0, FontStyle::Regular);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.concat(), dashes);

        let text = "\u{c9}l\u{e8}ve \u{152}uvre \u{e0} l\u{2019}h\u{f4}pital \u{2014} consentement \u{e9}clair\u{e9} ".repeat(6);
        for line in reflow(&text, 80.0, 10.0, FontStyle::Regular) {
            assert!(text_width(&line, 10.0, FontStyle::Regular) <= 80.0, "{}", line);
        }
    }
}
