//! Turns command-line inputs into the ordered payload list a tree is built from.
//!
//! Order is inline items, then input-file lines, then explicit files, then directory contents. Directory walks are
//! recursive and visit entries in lexicographic path order so that the same directory always yields the same root.
//! Symbolic links are not followed, so a link back into the walked tree cannot repeat its files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::hashtree::Payload;
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct Sources {
  pub data: Vec<String>,
  pub input_file: Option<PathBuf>,
  pub files: Vec<PathBuf>,
  pub dirs: Vec<PathBuf>,
}

impl Sources {
  /// Reads every source and returns the payloads in tree order.
  pub fn load(&self) -> Result<Vec<Payload>> {
    let mut payloads = self.data.iter().map(|s| Payload::text(s.as_str())).collect::<Vec<_>>();
    if let Some(path) = &self.input_file {
      let lines = read_lines(path)?;
      info!(path = %path.display(), count = lines.len(), "read data blocks");
      payloads.extend(lines.into_iter().map(Payload::text));
    }
    for path in &self.files {
      payloads.push(read_file(path)?);
    }
    for dir in &self.dirs {
      let files = list_files(dir)?;
      info!(dir = %dir.display(), count = files.len(), "hashing directory");
      for path in files {
        payloads.push(read_file(&path)?);
      }
    }
    if payloads.is_empty() {
      return Err(Error::NoData);
    }
    Ok(payloads)
  }
}

/// Non-blank lines of `path`, trimmed.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
  let path = path.as_ref();
  if !path.exists() {
    return Err(Error::InputNotFound(path.to_path_buf()));
  }
  let file = File::open(path).map_err(Error::io(path))?;
  let mut lines = Vec::new();
  for line in BufReader::new(file).lines() {
    let line = line.map_err(Error::io(path))?;
    let line = line.trim();
    if !line.is_empty() {
      lines.push(line.to_string());
    }
  }
  Ok(lines)
}

/// Hashes the content of `path` without holding it in memory.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Payload> {
  let path = path.as_ref();
  let mut file = BufReader::new(File::open(path).map_err(Error::io(path))?);
  let payload = Payload::from_reader(path, &mut file).map_err(Error::io(path))?;
  debug!(path = %path.display(), digest = %payload.digest(), "hashed file");
  Ok(payload)
}

/// All regular files below `dir`, recursively, in lexicographic path order. Symbolic links are skipped.
pub fn list_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
    let entry = entry?;
    if entry.file_type().is_file() {
      files.push(entry.into_path());
    } else if entry.path_is_symlink() {
      debug!(path = %entry.path().display(), "skipping symbolic link");
    }
  }
  Ok(files)
}
