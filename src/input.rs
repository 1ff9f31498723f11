//! Input enumeration
//!
//! The path arguments on the command line are resolved, up front, into one
//! flat ordered list of sources. Directory arguments expand in place: with
//! `--recursive` every non-directory entry under the tree becomes its own
//! named source, in a stable traversal order; without it a directory is a
//! hard error. No path arguments at all means a single anonymous source
//! bound to standard input.
//!
//! Enumeration only stats paths; handles are opened lazily by the scanner,
//! one at a time, and dropped before the next source is touched.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, SnipError};

/// One input to scan: either standard input (anonymous) or a file path.
///
/// The display name is `None` for stdin and the path string for files, which
/// is what the match command uses for its `name: ` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Stdin,
    File(PathBuf),
}

impl SourceSpec {
    pub fn display_name(&self) -> Option<String> {
        match self {
            SourceSpec::Stdin => None,
            SourceSpec::File(path) => Some(path.display().to_string()),
        }
    }

    /// Open the underlying byte stream. The returned handle is exclusively
    /// owned by the caller and released when dropped.
    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            SourceSpec::Stdin => Ok(Box::new(io::stdin())),
            SourceSpec::File(path) => {
                let file = File::open(path)
                    .map_err(|e| SnipError::io(Some(path.display().to_string()), e))?;
                Ok(Box::new(file))
            }
        }
    }
}

/// Resolve the path arguments into an ordered list of sources.
///
/// Fail-fast: the first unresolvable path or walk error aborts the whole
/// enumeration with no partial result.
pub fn enumerate_inputs(paths: &[String], recursive: bool) -> Result<Vec<SourceSpec>> {
    if paths.is_empty() {
        return Ok(vec![SourceSpec::Stdin]);
    }

    let mut sources = Vec::new();
    for raw in paths {
        let path = Path::new(raw);
        let meta = fs::metadata(path).map_err(|e| SnipError::io(Some(raw.clone()), e))?;

        if meta.is_dir() {
            if !recursive {
                return Err(SnipError::Config(format!(
                    "directory `{raw}` given but --recursive not specified"
                )));
            }
            walk_directory(path, &mut sources)?;
        } else {
            sources.push(SourceSpec::File(path.to_path_buf()));
        }
    }

    debug!(count = sources.len(), "enumerated input sources");
    Ok(sources)
}

/// Expand a directory tree into file sources, directory-then-children, with
/// entries inside each directory visited in file-name order so repeated runs
/// enumerate identically.
fn walk_directory(root: &Path, sources: &mut Vec<SourceSpec>) -> Result<()> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(|p| p.display().to_string());
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
            SnipError::io(path, source)
        })?;
        if !entry.file_type().is_dir() {
            sources.push(SourceSpec::File(entry.into_path()));
        }
    }
    Ok(())
}
