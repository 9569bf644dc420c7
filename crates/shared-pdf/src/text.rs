//! PDF text strings: PDFDocEncoding or UTF-16BE with a byte-order mark

use lopdf::{Object, StringFormat};

const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// PDFDocEncoding code points 0x80..=0xA0 that differ from Latin-1
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}',
    '\u{2044}', '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}',
    '\u{201D}', '\u{2018}', '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}',
    '\u{0141}', '\u{0152}', '\u{0160}', '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}',
    '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}', '\u{20AC}',
];

pub fn decode_text(bytes: &[u8]) -> String {
    if bytes.starts_with(&UTF16_BOM) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0xA0 => PDF_DOC_HIGH[(b - 0x80) as usize],
            _ => b as char,
        })
        .collect()
}

/// Text string object for `text`.
///
/// Plain ASCII stays a literal string; anything else is UTF-16BE in hex form.
pub fn encode_text(text: &str) -> Object {
    let plain = text
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control() && !matches!(c, '(' | ')' | '\\'));
    if plain {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Hexadecimal);
    }
    let mut bytes = UTF16_BOM.to_vec();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Read a string or name object as text
pub fn object_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Escape text for a literal string inside a content stream.
/// Content streams here use a standard Type1 font, so non-ASCII becomes `?`.
pub fn escape_content_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            '\n' | '\r' => " ".to_string(),
            _ if c.is_ascii() => c.to_string(),
            _ => "?".to_string(),
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn text_strings_round_trip(s in "\\PC{0,60}") {
            let obj = encode_text(&s);
            prop_assert_eq!(object_text(&obj), Some(s));
        }
    }
}
