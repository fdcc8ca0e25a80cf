use clap::{Args, Parser, Subcommand};
use merkletool::logging::{self, LogLevel};
use merkletool::render::{parse_proof, proof_json, tree_json};
use merkletool::source::{Sources, read_file};
use merkletool::{Digest, Error, MerkleTree, Payload, Result, verify};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "merkletool")]
#[command(author, version, about = "Merkle tree CLI: build trees, generate and verify inclusion proofs")]
struct Cli {
  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Build a Merkle tree and print it as JSON together with its root
  Build {
    #[command(flatten)]
    sources: SourceArgs,

    #[command(flatten)]
    output: OutputArgs,
  },

  /// Generate an inclusion proof for one data block
  Prove {
    #[command(flatten)]
    target: TargetArgs,

    #[command(flatten)]
    sources: SourceArgs,

    #[command(flatten)]
    output: OutputArgs,
  },

  /// Verify that a data block is included under a root
  Verify {
    #[command(flatten)]
    target: TargetArgs,

    /// Expected Merkle root (hex)
    #[arg(long)]
    root: Option<String>,

    /// Proof JSON produced by `prove`; without it the proof is derived from the given data blocks
    #[arg(long, requires = "root", conflicts_with_all = ["data", "input_file", "files", "dirs"])]
    proof: Option<PathBuf>,

    #[command(flatten)]
    sources: SourceArgs,
  },
}

#[derive(Args)]
struct SourceArgs {
  /// Data blocks to build the Merkle tree from
  data: Vec<String>,

  /// File containing data blocks (one per line)
  #[arg(long)]
  input_file: Option<PathBuf>,

  /// File whose content becomes one leaf (repeatable)
  #[arg(long = "file", value_name = "PATH")]
  files: Vec<PathBuf>,

  /// Directory whose files become leaves in path order (repeatable)
  #[arg(long = "dir", value_name = "DIR")]
  dirs: Vec<PathBuf>,
}

impl From<SourceArgs> for Sources {
  fn from(args: SourceArgs) -> Self {
    Sources { data: args.data, input_file: args.input_file, files: args.files, dirs: args.dirs }
  }
}

#[derive(Args)]
struct TargetArgs {
  /// Data block to prove
  #[arg(long, required_unless_present = "target_file", conflicts_with = "target_file")]
  target: Option<String>,

  /// File whose content is the leaf to prove
  #[arg(long)]
  target_file: Option<PathBuf>,
}

impl TargetArgs {
  fn payload(&self) -> Result<Payload> {
    match (&self.target, &self.target_file) {
      (_, Some(path)) => read_file(path),
      (Some(text), None) => Ok(Payload::text(text.as_str())),
      (None, None) => Err(Error::NoData),
    }
  }
}

#[derive(Args)]
struct OutputArgs {
  /// File to save the JSON to instead of printing it
  #[arg(long)]
  output_file: Option<PathBuf>,

  /// Pretty-print JSON output
  #[arg(long, default_value_t = false)]
  pretty: bool,
}

const EXIT_INVALID: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;
const EXIT_ERROR: u8 = 3;

fn main() -> ExitCode {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) => {
      // clap exits with 2 on usage errors, which would read as "not present"
      let _ = e.print();
      return if e.use_stderr() { ExitCode::from(EXIT_ERROR) } else { ExitCode::SUCCESS };
    }
  };
  if let Err(e) = logging::try_init(LogLevel::from_verbosity(cli.verbose)) {
    eprintln!("Warning: logging disabled: {e}");
  }

  match run(cli.command) {
    Ok(code) => code,
    Err(e) => {
      eprintln!("Error: {e}");
      ExitCode::from(EXIT_ERROR)
    }
  }
}

fn run(command: Command) -> Result<ExitCode> {
  match command {
    Command::Build { sources, output } => {
      let tree = build(sources)?;
      let json = tree_json(&tree, output.pretty)?;
      emit("Merkle Tree", &json, output.output_file.as_deref())?;
      println!("\nMerkle Root: {}", tree.root_hash());
      Ok(ExitCode::SUCCESS)
    }
    Command::Prove { target, sources, output } => {
      let target = target.payload()?;
      let tree = build(sources)?;
      let Some(proof) = tree.generate_proof(&target) else {
        println!("not present");
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
      };
      info!(steps = proof.len(), "generated proof");
      let json = proof_json(&proof, output.pretty)?;
      emit("Merkle Proof", &json, output.output_file.as_deref())?;
      println!("\nMerkle Root: {}", tree.root_hash());
      Ok(ExitCode::SUCCESS)
    }
    Command::Verify { target, root, proof: Some(path), .. } => {
      let target = target.payload()?;
      let root = parse_root(root.as_deref().unwrap_or_default())?;
      let json = fs::read_to_string(&path).map_err(Error::io(&path))?;
      let proof = parse_proof(&json)?;
      Ok(report(verify(&target, &proof, &root)))
    }
    Command::Verify { target, root, proof: None, sources } => {
      let target = target.payload()?;
      let tree = build(sources)?;
      let root = match root {
        Some(root) => parse_root(&root)?,
        None => tree.root_hash(),
      };
      let Some(proof) = tree.generate_proof(&target) else {
        println!("not present");
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
      };
      if root != tree.root_hash() {
        warn!(expected = %root, actual = %tree.root_hash(), "root of the given data blocks differs");
      }
      Ok(report(verify(&target, &proof, &root)))
    }
  }
}

fn build(args: SourceArgs) -> Result<MerkleTree> {
  let payloads = Sources::from(args).load()?;
  let tree = MerkleTree::build(payloads)?;
  info!(leaves = tree.len(), height = tree.height(), root = %tree.root_hash(), "built tree");
  Ok(tree)
}

fn parse_root(hex: &str) -> Result<Digest> {
  hex.parse().map_err(|_| Error::InvalidDigest(hex.to_string()))
}

fn emit(title: &str, json: &str, output_file: Option<&Path>) -> Result<()> {
  match output_file {
    Some(path) => {
      fs::write(path, json).map_err(Error::io(path))?;
      println!("{title} saved to {}", path.display());
    }
    None => {
      println!("{title} JSON:");
      println!("{json}");
    }
  }
  Ok(())
}

fn report(valid: bool) -> ExitCode {
  if valid {
    println!("valid");
    ExitCode::SUCCESS
  } else {
    println!("invalid");
    ExitCode::from(EXIT_INVALID)
  }
}
