//! The ordered chain of text encodings an uploaded file is tried under.
//!
//! The first encoding under which the whole byte stream decodes cleanly wins,
//! and every later check runs on that decoded text. Each decoder is strict
//! about the bytes it cannot represent so the chain actually falls through:
//!
//! | Encoding       | Rejects                                      |
//! |----------------|----------------------------------------------|
//! | `utf-8`        | any malformed sequence (a leading BOM is dropped) |
//! | `latin-1`      | C1 control bytes `0x80..=0x9F`               |
//! | `windows-1252` | the five unassigned bytes `81 8D 8F 90 9D`   |
//! | `iso-8859-1`   | nothing                                      |

use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Encoding ────────────────────────────────────────────────────────────────

/// One candidate codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
  Utf8,
  Latin1,
  Windows1252,
  Iso8859_1,
}

/// Bytes with no assigned character in Windows-1252.
const CP1252_UNASSIGNED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

impl Encoding {
  pub fn label(self) -> &'static str {
    match self {
      Self::Utf8 => "utf-8",
      Self::Latin1 => "latin-1",
      Self::Windows1252 => "windows-1252",
      Self::Iso8859_1 => "iso-8859-1",
    }
  }

  /// Decode `bytes`, or `None` if they are not valid under this encoding.
  pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
    match self {
      Self::Utf8 => {
        let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
        (!had_errors).then_some(text)
      }
      Self::Latin1 => {
        if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
          return None;
        }
        Some(encoding_rs::mem::decode_latin1(bytes))
      }
      Self::Windows1252 => {
        if bytes.iter().any(|b| CP1252_UNASSIGNED.contains(b)) {
          return None;
        }
        let (text, had_errors) =
          encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
        (!had_errors).then_some(text)
      }
      Self::Iso8859_1 => Some(encoding_rs::mem::decode_latin1(bytes)),
    }
  }
}

impl fmt::Display for Encoding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for Encoding {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "utf-8" | "utf8" => Ok(Self::Utf8),
      "latin-1" | "latin1" | "l1" => Ok(Self::Latin1),
      "windows-1252" | "cp1252" => Ok(Self::Windows1252),
      "iso-8859-1" | "iso8859-1" | "iso_8859_1" => Ok(Self::Iso8859_1),
      _ => Err(Error::UnknownEncoding(s.to_owned())),
    }
  }
}

impl TryFrom<String> for Encoding {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Encoding> for String {
  fn from(e: Encoding) -> Self { e.label().to_owned() }
}

// ─── Chain ───────────────────────────────────────────────────────────────────

/// Text decoded by the first encoding in the chain that accepted the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
  pub encoding: Encoding,
  pub text:     String,
}

/// An ordered list of candidate encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingChain(Vec<Encoding>);

impl EncodingChain {
  pub fn new(encodings: Vec<Encoding>) -> Self { Self(encodings) }

  pub fn encodings(&self) -> &[Encoding] { &self.0 }

  /// Try each encoding in order; the first clean decode wins.
  pub fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
    self
      .0
      .iter()
      .find_map(|&encoding| {
        encoding.decode(bytes).map(|text| Decoded {
          encoding,
          text: text.into_owned(),
        })
      })
      .ok_or(Error::Undecodable)
  }
}

impl Default for EncodingChain {
  fn default() -> Self {
    Self(vec![
      Encoding::Utf8,
      Encoding::Latin1,
      Encoding::Windows1252,
      Encoding::Iso8859_1,
    ])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_ascii_is_utf8() {
    let d = EncodingChain::default().decode(b"Patient ID,Outcome\n").unwrap();
    assert_eq!(d.encoding, Encoding::Utf8);
    assert_eq!(d.text, "Patient ID,Outcome\n");
  }

  #[test]
  fn utf8_bom_is_dropped() {
    let d = EncodingChain::default()
      .decode(b"\xEF\xBB\xBFPatient ID,Outcome")
      .unwrap();
    assert_eq!(d.encoding, Encoding::Utf8);
    assert_eq!(d.text, "Patient ID,Outcome");
  }

  #[test]
  fn accented_latin1_falls_back_to_latin1() {
    let d = EncodingChain::default().decode(b"P1,Am\xE9lior\xE9").unwrap();
    assert_eq!(d.encoding, Encoding::Latin1);
    assert_eq!(d.text, "P1,Amélioré");
  }

  #[test]
  fn cp1252_punctuation_falls_back_to_windows_1252() {
    // “better” – 5€
    let d = EncodingChain::default()
      .decode(b"\x93better\x94 \x96 5\x80")
      .unwrap();
    assert_eq!(d.encoding, Encoding::Windows1252);
    assert_eq!(d.text, "\u{201C}better\u{201D} \u{2013} 5\u{20AC}");
  }

  #[test]
  fn unassigned_cp1252_byte_ends_at_iso_8859_1() {
    let d = EncodingChain::default().decode(b"P\x81").unwrap();
    assert_eq!(d.encoding, Encoding::Iso8859_1);
    assert_eq!(d.text, "P\u{81}");
  }

  #[test]
  fn exhausted_chain_is_undecodable() {
    let chain = EncodingChain::new(vec![Encoding::Utf8]);
    assert!(matches!(chain.decode(b"\xFF\xFE"), Err(Error::Undecodable)));
  }

  #[test]
  fn empty_chain_is_undecodable() {
    let chain = EncodingChain::new(Vec::new());
    assert!(matches!(chain.decode(b"anything"), Err(Error::Undecodable)));
  }

  #[test]
  fn labels_parse_case_insensitively() {
    assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
    assert_eq!("cp1252".parse::<Encoding>().unwrap(), Encoding::Windows1252);
    assert_eq!("Latin1".parse::<Encoding>().unwrap(), Encoding::Latin1);
    assert!(matches!(
      "ebcdic".parse::<Encoding>(),
      Err(Error::UnknownEncoding(label)) if label == "ebcdic"
    ));
  }

  #[test]
  fn chain_deserialises_from_labels() {
    let chain: EncodingChain =
      serde_json::from_str(r#"["utf-8", "windows-1252"]"#).unwrap();
    assert_eq!(chain.encodings(), &[Encoding::Utf8, Encoding::Windows1252]);
  }
}
