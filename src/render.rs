//! JSON views of trees and proofs.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::hashtree::Payload;
use crate::hashtree::binary::{MerkleTree, Node, NodeKind};
use crate::hashtree::proof::Proof;
use crate::{Error, Result};

/// Nested view of the subtree rooted at one node.
///
/// Branches render as `{"hash", "left", "right"}`; leaves as `{"hash", "data"}` or `{"hash", "file_path"}`. A node
/// paired with itself appears under both `left` and `right`.
pub struct NodeView<'a> {
  tree: &'a MerkleTree,
  node: &'a Node,
}

impl<'a> NodeView<'a> {
  pub fn root(tree: &'a MerkleTree) -> Self {
    NodeView { tree, node: tree.root() }
  }

  fn child(&self, position: usize) -> Option<NodeView<'a>> {
    self.tree.node(position).map(|node| NodeView { tree: self.tree, node })
  }
}

impl Serialize for NodeView<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(3))?;
    map.serialize_entry("hash", &self.node.hash)?;
    match &self.node.kind {
      NodeKind::Leaf { payload: Payload::Data(bytes) } => {
        map.serialize_entry("data", &String::from_utf8_lossy(bytes))?;
      }
      NodeKind::Leaf { payload: Payload::File { path, .. } } => {
        map.serialize_entry("file_path", &path.to_string_lossy())?;
      }
      NodeKind::Branch { left, right } => {
        let (left, right) = match (self.child(*left), self.child(*right)) {
          (Some(left), Some(right)) => (left, right),
          _ => return Err(serde::ser::Error::custom("branch refers to a missing node")),
        };
        map.serialize_entry("left", &left)?;
        map.serialize_entry("right", &right)?;
      }
    }
    map.end()
  }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
  let json = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
  Ok(json)
}

pub fn tree_json(tree: &MerkleTree, pretty: bool) -> Result<String> {
  to_json(&NodeView::root(tree), pretty)
}

pub fn proof_json(proof: &Proof, pretty: bool) -> Result<String> {
  to_json(proof, pretty)
}

pub fn parse_proof(json: &str) -> Result<Proof> {
  serde_json::from_str(json).map_err(Error::from)
}
