use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::hashtree::{Digest, Payload, combine};

/// One sibling on the path from a leaf to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
  pub hash: Digest,
  /// Set when the node on the path is the right child of its pair, i.e. the sibling sits on the left. A node paired
  /// with itself is always a left child.
  pub is_right: bool,
}

impl ProofStep {
  /// Parent digest of `current` and this step's sibling.
  pub fn fold(&self, current: &Digest) -> Digest {
    if self.is_right { combine(&self.hash, current) } else { combine(current, &self.hash) }
  }
}

/// Sibling path ordered from the leaf level up to, but excluding, the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof {
  steps: Vec<ProofStep>,
}

impl Proof {
  pub fn new(steps: Vec<ProofStep>) -> Self {
    Proof { steps }
  }

  pub fn steps(&self) -> &[ProofStep] {
    &self.steps
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Root implied by this path for a leaf with digest `leaf`.
  pub fn root_from(&self, leaf: Digest) -> Digest {
    self.steps.iter().fold(leaf, |current, step| {
      let parent = step.fold(&current);
      trace!(%current, sibling = %step.hash, is_right = step.is_right, %parent, "fold proof step");
      parent
    })
  }
}

impl From<Vec<ProofStep>> for Proof {
  fn from(steps: Vec<ProofStep>) -> Self {
    Proof::new(steps)
  }
}

/// Recomputes the root from `target` and `proof` and compares it with `root`.
pub fn verify(target: &Payload, proof: &Proof, root: &Digest) -> bool {
  verify_digest(target.digest(), proof, root)
}

/// Same as [`verify`] for a leaf whose digest is already known.
pub fn verify_digest(leaf: Digest, proof: &Proof, root: &Digest) -> bool {
  proof.root_from(leaf) == *root
}
