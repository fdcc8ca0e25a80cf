use tracing::{debug, trace};

use crate::hashtree::proof::{self, Proof, ProofStep};
use crate::hashtree::{Digest, Error, Payload, Result, combine};

/// Levels narrower than this are reduced on the calling thread.
#[cfg(feature = "parallel")]
pub const PARALLEL_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
  Leaf { payload: Payload },
  /// `left == right` when the node was the unpaired last node of its level.
  Branch { left: usize, right: usize },
}

/// Node representation in the hash tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
  pub position: usize,
  pub hash: Digest,
  pub kind: NodeKind,
}

impl Node {
  pub fn new_leaf(position: usize, payload: Payload) -> Self {
    let hash = payload.digest();
    Node { position, hash, kind: NodeKind::Leaf { payload } }
  }

  pub fn new_internal(position: usize, left: &Node, right: &Node) -> Self {
    let hash = combine(&left.hash, &right.hash);
    let branch = NodeKind::Branch { left: left.position, right: right.position };
    Node { position, hash, kind: branch }
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self.kind, NodeKind::Leaf { .. })
  }

  pub fn payload(&self) -> Option<&Payload> {
    match &self.kind {
      NodeKind::Leaf { payload } => Some(payload),
      NodeKind::Branch { .. } => None,
    }
  }

  pub fn children(&self) -> Option<(usize, usize)> {
    match self.kind {
      NodeKind::Branch { left, right } => Some((left, right)),
      NodeKind::Leaf { .. } => None,
    }
  }
}

/// Immutable binary Merkle tree over an ordered list of payloads.
///
/// Nodes live in a single arena and refer to their children by position. `levels[0]` holds the leaves in input
/// order and every following level holds the parents of the previous one, so the last level is the root alone.
/// A level of odd length pairs its last node with itself: the parent's `left` and `right` are the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
  nodes: Vec<Node>,
  levels: Vec<Vec<usize>>,
}

impl MerkleTree {
  /// Hashes the payloads into leaves and reduces them pairwise up to a single root.
  pub fn build<I>(payloads: I) -> Result<Self>
  where
    I: IntoIterator<Item = Payload>,
  {
    let payloads = payloads.into_iter().collect::<Vec<_>>();
    if payloads.is_empty() {
      return Err(Error::EmptyInput);
    }

    let mut nodes = hash_leaves(payloads);
    let mut levels = vec![(0..nodes.len()).collect::<Vec<_>>()];
    debug!(leaves = nodes.len(), "hashed leaves");

    while let Some(current) = levels.last().filter(|level| level.len() > 1) {
      let parents = reduce_level(&nodes, current, nodes.len());
      let next = parents.iter().map(|node| node.position).collect::<Vec<_>>();
      nodes.extend(parents);
      debug!(level = levels.len(), width = next.len(), "reduced level");
      levels.push(next);
    }

    Ok(MerkleTree { nodes, levels })
  }

  pub fn root(&self) -> &Node {
    // build() guarantees at least one level whose only node is the root
    let root = self.levels[self.levels.len() - 1][0];
    &self.nodes[root]
  }

  pub fn root_hash(&self) -> Digest {
    self.root().hash
  }

  /// Number of edges between a leaf and the root; zero for a single-leaf tree.
  pub fn height(&self) -> usize {
    self.levels.len() - 1
  }

  /// Number of leaves.
  pub fn len(&self) -> usize {
    self.levels[0].len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn node(&self, position: usize) -> Option<&Node> {
    self.nodes.get(position)
  }

  pub fn levels(&self) -> impl ExactSizeIterator<Item = impl ExactSizeIterator<Item = &Node>> {
    self.levels.iter().map(move |level| level.iter().map(move |&position| &self.nodes[position]))
  }

  pub fn level(&self, depth: usize) -> Option<impl ExactSizeIterator<Item = &Node>> {
    self.levels.get(depth).map(move |level| level.iter().map(move |&position| &self.nodes[position]))
  }

  pub fn leaves(&self) -> impl ExactSizeIterator<Item = &Node> {
    self.levels[0].iter().map(move |&position| &self.nodes[position])
  }

  /// Index of the first leaf whose digest equals that of `target`.
  pub fn position(&self, target: &Payload) -> Option<usize> {
    let digest = target.digest();
    self.leaves().position(|leaf| leaf.hash == digest)
  }

  /// Inclusion proof for the first leaf matching `target`, or `None` if no leaf does.
  pub fn generate_proof(&self, target: &Payload) -> Option<Proof> {
    self.position(target).and_then(|index| self.proof_at(index))
  }

  /// Inclusion proof for the leaf at `index`.
  pub fn proof_at(&self, index: usize) -> Option<Proof> {
    if index >= self.len() {
      return None;
    }
    let mut steps = Vec::with_capacity(self.height());
    let mut current = index;
    for level in &self.levels[..self.height()] {
      let is_right = current % 2 == 1;
      let sibling = if is_right { current - 1 } else { current + 1 };
      // an out-of-range sibling means the node was paired with itself
      let position = level.get(sibling).copied().unwrap_or(level[current]);
      let step = ProofStep { hash: self.nodes[position].hash, is_right };
      trace!(index = current, sibling, is_right, "proof step");
      steps.push(step);
      current /= 2;
    }
    Some(Proof::new(steps))
  }

  /// Generates and verifies the proof for `target` against this tree's root.
  ///
  /// `None` means no leaf carries `target`; `Some(false)` means a proof was produced but did not reproduce the
  /// root, which can only happen if the tree itself is inconsistent.
  pub fn check(&self, target: &Payload) -> Option<bool> {
    let proof = self.generate_proof(target)?;
    Some(proof::verify(target, &proof, &self.root_hash()))
  }
}

fn hash_leaves(payloads: Vec<Payload>) -> Vec<Node> {
  #[cfg(feature = "parallel")]
  if payloads.len() >= PARALLEL_THRESHOLD {
    use rayon::prelude::*;
    return payloads.into_par_iter().enumerate().map(|(i, payload)| Node::new_leaf(i, payload)).collect();
  }
  payloads.into_iter().enumerate().map(|(i, payload)| Node::new_leaf(i, payload)).collect()
}

/// Parents of `level`, numbered from `offset` in pair order.
fn reduce_level(nodes: &[Node], level: &[usize], offset: usize) -> Vec<Node> {
  let parent = |(i, pair): (usize, &[usize])| {
    let left = &nodes[pair[0]];
    let right = pair.get(1).map_or(left, |&position| &nodes[position]);
    Node::new_internal(offset + i, left, right)
  };

  #[cfg(feature = "parallel")]
  if level.len() >= PARALLEL_THRESHOLD {
    use rayon::prelude::*;
    return level.par_chunks(2).enumerate().map(parent).collect();
  }
  level.chunks(2).enumerate().map(parent).collect()
}
