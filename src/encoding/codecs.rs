//! Byte-level codecs behind [`Charset`](super::Charset).
//!
//! Most encodings are served by `encoding_rs`. The rest are ones the WHATWG
//! registry leaves out: true ISO-8859-1, the DOS console code pages, UTF-32
//! and UTF-7.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use encoding_rs::{mem, Encoding};
use oem_cp::code_table::{
    DECODING_TABLE_CP437, DECODING_TABLE_CP850, DECODING_TABLE_CP852, ENCODING_TABLE_CP437,
    ENCODING_TABLE_CP850, ENCODING_TABLE_CP852,
};
use oem_cp::{decode_string_complete_table, encode_string_checked};

/// DOS console code pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OemPage {
    Cp437,
    Cp850,
    Cp852,
}

/// Byte order of a UTF-32 stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ByteOrder {
    Little,
    Big,
    /// Big-endian when a big-endian byte-order mark leads, else little-endian.
    Detect,
}

/// One concrete codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Codec {
    Whatwg(&'static Encoding),
    /// Every byte maps to the code point of the same value.
    Latin1,
    Oem(OemPage),
    Utf32(ByteOrder),
    Utf7,
}

impl Codec {
    pub(super) fn name(self) -> &'static str {
        match self {
            Self::Whatwg(encoding) => encoding.name(),
            Self::Latin1 => "ISO-8859-1",
            Self::Oem(OemPage::Cp437) => "IBM437",
            Self::Oem(OemPage::Cp850) => "IBM850",
            Self::Oem(OemPage::Cp852) => "IBM852",
            Self::Utf32(ByteOrder::Little) => "UTF-32LE",
            Self::Utf32(ByteOrder::Big) => "UTF-32BE",
            Self::Utf32(ByteOrder::Detect) => "UTF-32",
            Self::Utf7 => "UTF-7",
        }
    }

    pub(super) fn decode(self, raw: &[u8]) -> String {
        match self {
            Self::Whatwg(encoding) => {
                let (text, _had_errors) = encoding.decode_with_bom_removal(raw);
                text.into_owned()
            }
            Self::Latin1 => mem::decode_latin1(raw).into_owned(),
            Self::Oem(OemPage::Cp437) => decode_string_complete_table(raw, &DECODING_TABLE_CP437),
            Self::Oem(OemPage::Cp850) => decode_string_complete_table(raw, &DECODING_TABLE_CP850),
            Self::Oem(OemPage::Cp852) => decode_string_complete_table(raw, &DECODING_TABLE_CP852),
            Self::Utf32(order) => decode_utf32(raw, order),
            Self::Utf7 => decode_utf7(raw),
        }
    }

    pub(super) fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Whatwg(encoding) => {
                // UTF-16 labels silently encode as UTF-8.
                let (bytes, used, _had_errors) = encoding.encode(text);
                (used == encoding).then(|| bytes.into_owned())
            }
            Self::Latin1 => {
                mem::is_str_latin1(text).then(|| mem::encode_latin1_lossy(text).into_owned())
            }
            Self::Oem(OemPage::Cp437) => encode_string_checked(text, &ENCODING_TABLE_CP437),
            Self::Oem(OemPage::Cp850) => encode_string_checked(text, &ENCODING_TABLE_CP850),
            Self::Oem(OemPage::Cp852) => encode_string_checked(text, &ENCODING_TABLE_CP852),
            Self::Utf32(ByteOrder::Big) => {
                Some(text.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect())
            }
            Self::Utf32(_) => Some(text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect()),
            Self::Utf7 => Some(encode_utf7(text)),
        }
    }
}

const UTF32_LE_BOM: [u8; 4] = [0xFF, 0xFE, 0x00, 0x00];
const UTF32_BE_BOM: [u8; 4] = [0x00, 0x00, 0xFE, 0xFF];

fn decode_utf32(raw: &[u8], order: ByteOrder) -> String {
    let (big_endian, body) = match order {
        ByteOrder::Little => (false, raw.strip_prefix(&UTF32_LE_BOM).unwrap_or(raw)),
        ByteOrder::Big => (true, raw.strip_prefix(&UTF32_BE_BOM).unwrap_or(raw)),
        ByteOrder::Detect => match raw.strip_prefix(&UTF32_BE_BOM) {
            Some(body) => (true, body),
            None => (false, raw.strip_prefix(&UTF32_LE_BOM).unwrap_or(raw)),
        },
    };

    let mut text = String::with_capacity(body.len() / 4);
    let mut units = body.chunks_exact(4);
    for unit in &mut units {
        let &[a, b, c, d] = unit else { continue };
        let bytes = [a, b, c, d];
        let value = if big_endian { u32::from_be_bytes(bytes) } else { u32::from_le_bytes(bytes) };
        text.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    if !units.remainder().is_empty() {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

/// Modified base64 of RFC 2152: no padding, tolerant of leftover bits.
const UTF7_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

fn is_base64_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'+' || byte == b'/'
}

/// Characters written as themselves; everything else goes into a `+...-` run.
fn is_direct(c: char) -> bool {
    c.is_ascii_alphanumeric() || "'(),-./:? \t\r\n".contains(c)
}

fn decode_utf7(raw: &[u8]) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut pos = 0;
    while pos < raw.len() {
        let byte = raw[pos];
        pos += 1;
        if byte != b'+' {
            text.push(if byte.is_ascii() { char::from(byte) } else { char::REPLACEMENT_CHARACTER });
            continue;
        }

        let start = pos;
        while pos < raw.len() && is_base64_byte(raw[pos]) {
            pos += 1;
        }
        let run = &raw[start..pos];
        if raw.get(pos) == Some(&b'-') {
            pos += 1;
        }

        if run.is_empty() {
            text.push('+');
            continue;
        }
        match UTF7_BASE64.decode(run) {
            Ok(bytes) => {
                let units =
                    bytes.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
                text.extend(
                    char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)),
                );
            }
            Err(_) => text.push(char::REPLACEMENT_CHARACTER),
        }
    }
    text
}

fn encode_utf7(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut run = String::new();
    for c in text.chars() {
        if is_direct(c) {
            flush_utf7_run(&mut run, &mut bytes);
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        } else {
            run.push(c);
        }
    }
    flush_utf7_run(&mut run, &mut bytes);
    bytes
}

fn flush_utf7_run(run: &mut String, bytes: &mut Vec<u8>) {
    if run.is_empty() {
        return;
    }
    bytes.push(b'+');
    if run != "+" {
        let utf16: Vec<u8> = run.encode_utf16().flat_map(u16::to_be_bytes).collect();
        bytes.extend_from_slice(UTF7_BASE64.encode(utf16).as_bytes());
    }
    bytes.push(b'-');
    run.clear();
}
