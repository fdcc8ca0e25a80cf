use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt::{self, Debug, Display};
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

pub mod binary;
pub mod proof;

/// Size of a SHA-256 digest in bytes.
pub const HASH_SIZE: usize = 32;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
  #[error("cannot build a hash tree from zero leaves")]
  EmptyInput,
}

/// Fixed-width SHA-256 digest, rendered as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; HASH_SIZE]);

impl Digest {
  pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
    Digest(bytes)
  }

  pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
    &self.0
  }

  pub fn to_hex(&self) -> String {
    hex::encode(self.0)
  }
}

impl Display for Digest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_hex())
  }
}

impl Debug for Digest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Digest({})", self.to_hex())
  }
}

impl FromStr for Digest {
  type Err = hex::FromHexError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let mut bytes = [0u8; HASH_SIZE];
    hex::decode_to_slice(s.trim(), &mut bytes)?;
    Ok(Digest(bytes))
  }
}

impl Serialize for Digest {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_hex())
  }
}

impl<'de> Deserialize<'de> for Digest {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

/// Digest of a single byte sequence.
#[inline]
pub fn hash(bytes: &[u8]) -> Digest {
  Digest(Sha256::digest(bytes).into())
}

/// Parent digest of two children.
///
/// The children are concatenated in their hex rendering (left first) and the resulting 128 ASCII bytes are hashed.
/// There is no leaf/branch domain tag, so a branch digest is indistinguishable from the digest of a leaf whose
/// text is that same 128-character string.
pub fn combine(left: &Digest, right: &Digest) -> Digest {
  let mut text = left.to_hex();
  text.push_str(&right.to_hex());
  hash(text.as_bytes())
}

/// Incremental hasher for payloads too large to hold in memory.
#[derive(Default, Clone)]
pub struct Hasher(Sha256);

impl Hasher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn update(&mut self, bytes: &[u8]) {
    self.0.update(bytes);
  }

  /// Feeds everything `r` yields and returns the number of bytes consumed.
  pub fn update_reader<R: Read>(&mut self, r: &mut R) -> io::Result<u64> {
    io::copy(r, &mut self.0)
  }

  pub fn finalize(self) -> Digest {
    Digest(self.0.finalize().into())
  }
}

/// Content of a single leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
  /// Inline bytes; text is stored as its UTF-8 encoding.
  Data(Vec<u8>),
  /// File content that has already been hashed by the reader.
  File { path: PathBuf, digest: Digest },
}

impl Payload {
  pub fn text<S: Into<String>>(text: S) -> Self {
    Payload::Data(text.into().into_bytes())
  }

  pub fn bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
    Payload::Data(bytes.into())
  }

  /// Hashes the content of `r` in chunks and records it under `path`.
  pub fn from_reader<P: Into<PathBuf>, R: Read>(path: P, r: &mut R) -> io::Result<Self> {
    let mut hasher = Hasher::new();
    hasher.update_reader(r)?;
    Ok(Payload::File { path: path.into(), digest: hasher.finalize() })
  }

  /// Leaf digest of this payload.
  pub fn digest(&self) -> Digest {
    match self {
      Payload::Data(bytes) => hash(bytes),
      Payload::File { digest, .. } => *digest,
    }
  }
}

impl From<&str> for Payload {
  fn from(value: &str) -> Self {
    Payload::text(value)
  }
}

impl From<String> for Payload {
  fn from(value: String) -> Self {
    Payload::text(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  // sha256("abc")
  const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

  #[test]
  fn test_hash_known_vector() {
    assert_eq!(ABC, hash(b"abc").to_hex());
    assert_eq!(ABC, Payload::text("abc").digest().to_string());
  }

  #[test]
  fn test_combine_hashes_hex_concatenation() {
    let a = hash(b"a");
    let b = hash(b"b");
    let text = format!("{a}{b}");
    assert_eq!(hash(text.as_bytes()), combine(&a, &b));
    assert_ne!(combine(&a, &b), combine(&b, &a));
  }

  #[test]
  fn test_digest_hex_roundtrip() {
    let digest = hash(b"abc");
    assert_eq!(digest, ABC.parse::<Digest>().unwrap());
    assert_eq!(digest, ABC.to_uppercase().parse::<Digest>().unwrap());
    assert!("abcd".parse::<Digest>().is_err());
    assert!(format!("{}zz", &ABC[..62]).parse::<Digest>().is_err());

    let json = serde_json::to_string(&digest).unwrap();
    assert_eq!(format!("\"{ABC}\""), json);
    assert_eq!(digest, serde_json::from_str::<Digest>(&json).unwrap());
  }

  #[test]
  fn test_streamed_file_digest_matches_inline() {
    let content = vec![7u8; 200 * 1024 + 13];
    let payload = Payload::from_reader("big.bin", &mut Cursor::new(&content)).unwrap();
    assert_eq!(Payload::bytes(content.clone()).digest(), payload.digest());

    let mut hasher = Hasher::new();
    assert_eq!(content.len() as u64, hasher.update_reader(&mut Cursor::new(&content)).unwrap());
    assert_eq!(hash(&content), hasher.finalize());
  }
}
