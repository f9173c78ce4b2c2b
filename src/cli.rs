use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Merge Decked Builder *.coll2 files.")]
pub struct Args {
    /// *.coll2 files to merge
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
}
