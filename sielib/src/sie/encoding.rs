//! Byte-to-text normalization.
//!
//! SIE files are specified as IBM PC8 (code page 437) but in practice arrive as
//! UTF-8 or ISO-8859-1 as well. Detection is heuristic:
//!
//! 1. Decode as PC8. Box-drawing glyphs never occur in SIE text, so their
//!    presence means the bytes were something else.
//! 2. Re-decode the original bytes as UTF-8.
//! 3. If that produced replacement characters, fall back to ISO-8859-1.
//!
//! Afterwards a fixed table repairs letters that a known buggy export path
//! turned into Greek or mathematical symbols.

use log::debug;
use serde::{Deserialize, Serialize};

/// Characters of PC8 bytes `0x80..=0xFF`.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Latin-1 letters read back through PC8 by the buggy export path.
const REPAIRS: [(char, char); 24] = [
    ('α', 'à'),
    ('Γ', 'â'),
    ('π', 'ã'),
    ('Σ', 'ä'),
    ('σ', 'å'),
    ('τ', 'ç'),
    ('Φ', 'è'),
    ('Θ', 'é'),
    ('Ω', 'ê'),
    ('δ', 'ë'),
    ('∞', 'ì'),
    ('φ', 'í'),
    ('ε', 'î'),
    ('∩', 'ï'),
    ('≡', 'ð'),
    ('≥', 'ò'),
    ('≤', 'ó'),
    ('⌠', 'ô'),
    ('⌡', 'õ'),
    ('÷', 'ö'),
    ('≈', '÷'),
    ('∙', 'ù'),
    ('√', 'û'),
    ('ⁿ', 'ü'),
];

/// Which decoding won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEncoding {
    Pc8,
    Utf8,
    Latin1,
}

/// Encoding used when rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputEncoding {
    #[default]
    Pc8,
    Utf8,
}

fn is_box_drawing(c: char) -> bool {
    ('\u{2500}'..='\u{259f}').contains(&c)
}

/// Leftovers that no legitimate decoding produces.
fn is_anomalous(c: char) -> bool {
    is_box_drawing(c) || ('\u{80}'..='\u{9f}').contains(&c) || c == '\u{fffd}'
}

pub fn decode_pc8(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                CP437_HIGH[(b - 0x80) as usize]
            }
        })
        .collect()
}

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode to PC8; characters outside the code page become `?`.
pub fn encode_pc8(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if c.is_ascii() {
                return c as u8;
            }
            CP437_HIGH
                .iter()
                .position(|&p| p == c)
                .map_or(b'?', |pos| 0x80 + pos as u8)
        })
        .collect()
}

/// Pick the source encoding and decode.
pub fn detect(bytes: &[u8]) -> (String, SourceEncoding) {
    let pc8 = decode_pc8(bytes);
    if !pc8.chars().any(is_box_drawing) {
        return (pc8, SourceEncoding::Pc8);
    }
    let (utf8, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if !had_errors && !utf8.contains('\u{fffd}') {
        return (utf8.into_owned(), SourceEncoding::Utf8);
    }
    (decode_latin1(bytes), SourceEncoding::Latin1)
}

/// Apply the repair table; any other anomalous character becomes `?`.
pub fn repair(text: &str) -> String {
    text.chars()
        .map(|c| match REPAIRS.iter().find(|(bad, _)| *bad == c) {
            Some((_, good)) => *good,
            None if is_anomalous(c) => '?',
            None => c,
        })
        .collect()
}

/// Turn raw bytes into canonical text: decoded, repaired, `\n` line endings,
/// trimmed.
pub fn normalize(bytes: &[u8]) -> String {
    let (text, encoding) = detect(bytes);
    debug!("decoded {} bytes as {:?}", bytes.len(), encoding);
    let text = repair(&text);
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string()
}

pub fn encode(text: &str, encoding: OutputEncoding) -> Vec<u8> {
    match encoding {
        OutputEncoding::Pc8 => encode_pc8(text),
        OutputEncoding::Utf8 => text.as_bytes().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWEDISH: &str = "Kassa och bank åäö ÅÄÖ é";

    #[test]
    fn pc8_roundtrips_swedish_letters() {
        let bytes = encode_pc8(SWEDISH);
        assert_eq!(bytes.len(), SWEDISH.chars().count());
        assert_eq!(detect(&bytes), (SWEDISH.to_string(), SourceEncoding::Pc8));
    }

    #[test]
    fn utf8_is_detected_through_box_glyphs() {
        let (text, enc) = detect(SWEDISH.as_bytes());
        assert_eq!(enc, SourceEncoding::Utf8);
        assert_eq!(text, SWEDISH);
    }

    #[test]
    fn latin1_falls_back_after_bad_utf8() {
        let bytes: Vec<u8> = SWEDISH.chars().map(|c| c as u32 as u8).collect();
        let (text, enc) = detect(&bytes);
        assert_eq!(enc, SourceEncoding::Latin1);
        assert_eq!(text, SWEDISH);
    }

    #[test]
    fn lowercase_latin1_is_repaired() {
        // no uppercase letters, so no box glyphs: PC8 wins and the table fixes it
        let bytes: Vec<u8> = "kassa åäö".chars().map(|c| c as u32 as u8).collect();
        assert_eq!(normalize(&bytes), "kassa åäö");
    }

    #[test]
    fn line_endings_and_padding_are_normalized() {
        assert_eq!(normalize(b"  #FLAGGA 0\r\n#SIETYP 4\r\n\r\n"), "#FLAGGA 0\n#SIETYP 4");
    }

    #[test]
    fn unmappable_output_becomes_question_mark() {
        assert_eq!(encode_pc8("€"), b"?".to_vec());
    }
}
