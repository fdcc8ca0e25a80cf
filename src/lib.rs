use std::path::PathBuf;

pub mod hashtree;
pub mod logging;
pub mod render;
pub mod source;

pub use hashtree::binary::MerkleTree;
pub use hashtree::proof::{Proof, ProofStep, verify};
pub use hashtree::{Digest, Payload};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Tree(#[from] hashtree::Error),

  #[error("{}: {source}", path.display())]
  Io { path: PathBuf, source: std::io::Error },

  #[error(transparent)]
  Walk(#[from] walkdir::Error),

  #[error("input file '{}' not found", .0.display())]
  InputNotFound(PathBuf),

  #[error("no data blocks provided")]
  NoData,

  #[error("invalid digest '{0}': expected 64 hex characters")]
  InvalidDigest(String),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl Error {
  pub fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.into();
    move |source| Error::Io { path, source }
  }
}
