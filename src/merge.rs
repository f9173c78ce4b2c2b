use crate::cli::Args;
use crate::collection::Collection;
use crate::error;
use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Merge `paths` in order into a fresh collection.
///
/// Each file is read completely and released before the next one is opened.
/// The first failure aborts the merge.
pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> error::Result<Collection> {
    let mut collection = Collection::new();
    for path in paths {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading collection");
        collection.add_file(path)?;
    }
    Ok(collection)
}

pub fn run(args: Args) -> Result<()> {
    let collection = merge_files(&args.files)?;
    let rendered = collection.to_coll2()?;

    let mut out = io::stdout().lock();
    out.write_all(rendered.as_bytes())?;
    out.flush()?;

    Ok(())
}
