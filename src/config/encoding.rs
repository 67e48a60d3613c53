use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Text codec used to decode line bytes read from a source file
///
/// Every supported codec encodes `\n` as the single byte `0x0A`, so the index
/// builder can split and measure lines on raw bytes regardless of the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl Encoding {
    /// Resolves a codec label such as `utf-8`, `UTF8`, `latin1` or `binary`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Encoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "binary" => Some(Encoding::Latin1),
            "ascii" | "us-ascii" => Some(Encoding::Ascii),
            _ => None,
        }
    }

    /// Decodes a line's bytes. Invalid UTF-8 sequences become U+FFFD.
    pub fn decode<'a>(self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes),
            Encoding::Latin1 => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
            Encoding::Ascii => Cow::Owned(bytes.iter().map(|&b| (b & 0x7f) as char).collect()),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::from_label(s).ok_or_else(|| Error::Config(format!("Unsupported file encoding: {}", s)))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin1",
            Encoding::Ascii => "ascii",
        };
        f.write_str(label)
    }
}
