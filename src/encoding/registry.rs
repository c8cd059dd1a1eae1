//! Name lookup for the encoding registry.
//!
//! Names are compacted before lookup: lowercased, a trailing `:NNNN` year
//! dropped, and everything but ASCII letters and digits removed. So
//! `Shift JIS`, `shift_jis` and `SHIFTJIS` all name the same encoding.

use encoding_rs::{
    Encoding, BIG5, EUC_JP, EUC_KR, GB18030, GBK, IBM866, ISO_2022_JP, ISO_8859_10,
    ISO_8859_13, ISO_8859_14, ISO_8859_15, ISO_8859_16, ISO_8859_2, ISO_8859_3, ISO_8859_4,
    ISO_8859_5, ISO_8859_6, ISO_8859_7, ISO_8859_8, ISO_8859_8_I, KOI8_R, KOI8_U, MACINTOSH,
    SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252, WINDOWS_1254, WINDOWS_874,
    X_MAC_CYRILLIC,
};

use super::codecs::{ByteOrder, Codec, OemPage};

/// Resolves `name` to a codec, or `None` if it names nothing supported.
pub(super) fn lookup(name: &str) -> Option<Codec> {
    let key = compact(name);
    if key.is_empty() {
        return None;
    }
    extended(&key)
        .or_else(|| whatwg(&key).map(Codec::Whatwg))
        .or_else(|| windows_code_page(&key).map(Codec::Whatwg))
        .or_else(|| Encoding::for_label_no_replacement(name.trim().as_bytes()).map(Codec::Whatwg))
}

/// Lowercases, drops a trailing `:NNNN` and keeps only ASCII letters and digits.
pub(super) fn compact(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    let base = match lower.rsplit_once(':') {
        Some((head, year)) if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => lower.as_str(),
    };
    base.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Encodings served outside `encoding_rs`.
fn extended(key: &str) -> Option<Codec> {
    let codec = match key {
        "binary" | "latin1" | "iso88591" | "l1" | "cp28591" | "isoir100" | "csisolatin1"
        | "ibm819" | "cp819" => Codec::Latin1,
        "cp437" | "ibm437" | "437" | "cspc8codepage437" => Codec::Oem(OemPage::Cp437),
        "cp850" | "ibm850" | "850" | "cspc850multilingual" => Codec::Oem(OemPage::Cp850),
        "cp852" | "ibm852" | "852" | "cspcp852" => Codec::Oem(OemPage::Cp852),
        "utf32" | "ucs4" => Codec::Utf32(ByteOrder::Detect),
        "utf32le" | "ucs4le" => Codec::Utf32(ByteOrder::Little),
        "utf32be" | "ucs4be" => Codec::Utf32(ByteOrder::Big),
        "utf7" | "unicode11utf7" => Codec::Utf7,
        _ => return None,
    };
    Some(codec)
}

/// Compacted WHATWG labels plus the Windows code-page names for them.
fn whatwg(key: &str) -> Option<&'static Encoding> {
    let encoding = match key {
        "utf8" | "unicode11utf8" | "unicode20utf8" | "xunicode20utf8" | "cp65001" => UTF_8,
        "utf16" | "utf16le" | "ucs2" | "unicode" | "csunicode" | "iso10646ucs2"
        | "unicodefeff" | "cp1200" => UTF_16LE,
        "utf16be" | "unicodefffe" | "cp1201" => UTF_16BE,
        "shiftjis" | "sjis" | "mskanji" | "csshiftjis" | "windows31j" | "xsjis" | "cp932"
        | "windows932" | "ms932" => SHIFT_JIS,
        "eucjp" | "xeucjp" | "cseucpkdfmtjapanese" | "cp51932" => EUC_JP,
        "iso2022jp" | "csiso2022jp" | "cp50220" | "cp50221" => ISO_2022_JP,
        "gbk" | "gb2312" | "chinese" | "csgb2312" | "csiso58gb231280" | "gb231280"
        | "isoir58" | "xgbk" | "cp936" | "windows936" | "ms936" | "euccn" => GBK,
        "gb18030" | "cp54936" => GB18030,
        "big5" | "big5hkscs" | "cnbig5" | "csbig5" | "xxbig5" | "cp950" | "windows950"
        | "ms950" => BIG5,
        "euckr" | "cseuckr" | "csksc56011987" | "isoir149" | "korean" | "ksc56011987"
        | "ksc5601" | "windows949" | "cp949" | "ms949" | "uhc" => EUC_KR,
        "koi8r" | "koi8" | "koi" | "cskoi8r" | "cp20866" => KOI8_R,
        "koi8u" | "koi8ru" | "cp21866" => KOI8_U,
        "ibm866" | "cp866" | "866" | "csibm866" => IBM866,
        "iso88592" | "l2" | "latin2" | "csisolatin2" | "isoir101" | "cp28592" => ISO_8859_2,
        "iso88593" | "l3" | "latin3" | "csisolatin3" | "isoir109" | "cp28593" => ISO_8859_3,
        "iso88594" | "l4" | "latin4" | "csisolatin4" | "isoir110" | "cp28594" => ISO_8859_4,
        "iso88595" | "cyrillic" | "csisolatincyrillic" | "isoir144" | "cp28595" => ISO_8859_5,
        "iso88596" | "arabic" | "asmo708" | "csiso88596e" | "csiso88596i" | "csisolatinarabic"
        | "ecma114" | "iso88596e" | "iso88596i" | "isoir127" | "cp28596" => ISO_8859_6,
        "iso88597" | "greek" | "greek8" | "csisolatingreek" | "ecma118" | "elot928"
        | "isoir126" | "suneugreek" | "cp28597" => ISO_8859_7,
        "iso88598" | "hebrew" | "csiso88598e" | "csisolatinhebrew" | "iso88598e" | "isoir138"
        | "visual" | "cp28598" => ISO_8859_8,
        "iso88598i" | "csiso88598i" | "logical" | "cp38598" => ISO_8859_8_I,
        "iso88599" | "l5" | "latin5" | "csisolatin5" | "isoir148" | "cp28599" => WINDOWS_1254,
        "iso885910" | "l6" | "latin6" | "csisolatin6" | "isoir157" => ISO_8859_10,
        "iso885911" | "tis620" | "dos874" => WINDOWS_874,
        "iso885913" | "cp28603" => ISO_8859_13,
        "iso885914" => ISO_8859_14,
        "iso885915" | "l9" | "latin9" | "csisolatin9" | "cp28605" => ISO_8859_15,
        "iso885916" => ISO_8859_16,
        "macintosh" | "mac" | "macroman" | "xmacroman" | "csmacintosh" | "cp10000" => MACINTOSH,
        "xmaccyrillic" | "maccyrillic" | "xmacukrainian" | "cp10007" => X_MAC_CYRILLIC,
        "ascii" | "usascii" | "ansix341968" => WINDOWS_1252,
        _ => return None,
    };
    Some(encoding)
}

/// Maps `cp1251`, `win1251`, `windows1251`, `xcp1251` and `cp874` style names.
fn windows_code_page(key: &str) -> Option<&'static Encoding> {
    let digits =
        ["windows", "win", "xcp", "cp"].iter().find_map(|prefix| key.strip_prefix(prefix))?;
    let page: u16 = digits.parse().ok()?;
    if page == 874 || (1250..=1258).contains(&page) {
        Encoding::for_label(format!("windows-{page}").as_bytes())
    } else {
        None
    }
}
