//! Encoding resolver: validates encoding names and decodes raw bytes.
//!
//! Lookup is forgiving about spelling (`Shift JIS`, `euc_jp`, `UTF8`) and
//! knows the Windows and DOS code-page names (`cp932`, `win1252`, `cp437`)
//! that console output usually comes in.

mod codecs;
mod registry;

use codecs::Codec;

/// Encoding used when a caller does not name one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Error returned when an encoding name is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Encoding not recognized: '{0}'")]
pub struct UnknownEncoding(pub String);

/// A validated text encoding.
///
/// Resolve once with [`Charset::resolve`] and decode as often as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset(Codec);

impl Charset {
    /// Looks up `name` in the registry.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownEncoding`] if the name matches no supported encoding.
    pub fn resolve(name: &str) -> Result<Self, UnknownEncoding> {
        registry::lookup(name).map(Self).ok_or_else(|| UnknownEncoding(name.to_string()))
    }

    /// Canonical registry name (e.g. `"Shift_JIS"`).
    #[must_use]
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// Decodes `raw` into text.
    ///
    /// A leading byte-order mark for this encoding is removed and malformed
    /// sequences become U+FFFD.
    #[must_use]
    pub fn decode(self, raw: &[u8]) -> String {
        self.0.decode(raw)
    }

    /// Encodes `text` into bytes of this encoding.
    ///
    /// Returns `None` for decode-only encodings (UTF-16), and for
    /// single-byte tables when `text` holds a character they cannot map.
    #[must_use]
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        self.0.encode(text)
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self(Codec::Whatwg(encoding_rs::UTF_8))
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns whether `name` refers to a supported encoding.
#[must_use]
pub fn encoding_exists(name: &str) -> bool {
    registry::lookup(name).is_some()
}

/// Decodes `raw` under the encoding called `name`.
///
/// # Errors
///
/// Returns [`UnknownEncoding`] if `name` is not supported. Callers are
/// expected to have checked with [`encoding_exists`] first.
pub fn decode(raw: &[u8], name: &str) -> Result<String, UnknownEncoding> {
    Charset::resolve(name).map(|charset| charset.decode(raw))
}
