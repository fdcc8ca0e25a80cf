use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use merkletool::{MerkleTree, Payload, verify};

fn payloads(n: usize) -> Vec<Payload> {
  (0..n as u64).map(|i| Payload::bytes(i.to_le_bytes().to_vec())).collect()
}

fn bench_build(c: &mut Criterion) {
  for n in [1024, 64 * 1024] {
    let items = payloads(n);
    c.bench_function(&format!("build-{n}"), |b| {
      b.iter_batched(|| items.clone(), |items| MerkleTree::build(items).unwrap(), BatchSize::LargeInput)
    });
  }
}

fn bench_proof(c: &mut Criterion) {
  let items = payloads(64 * 1024);
  let tree = MerkleTree::build(items.clone()).unwrap();
  let target = &items[items.len() - 1];
  c.bench_function("prove-64k", |b| b.iter(|| tree.generate_proof(target).unwrap()));

  let proof = tree.generate_proof(target).unwrap();
  let root = tree.root_hash();
  c.bench_function("verify-64k", |b| b.iter(|| assert!(verify(target, &proof, &root))));
}

criterion_group!(benches, bench_build, bench_proof);
criterion_main!(benches);
