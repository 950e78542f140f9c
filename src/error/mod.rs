//! Crate error types.
//!
//! Compile diagnostics are printed to stderr as they are found (the compiler
//! keeps going in panic mode to report several per run), so the compile-error
//! variant only carries the count. Runtime errors are typed: the VM builds
//! them with the offending source line from the chunk's line table.

mod runtime;

use std::{io, path::PathBuf};

pub use runtime::{RuntimeError, RuntimeErrorKind};

/// Top-level error for compiling and running one unit of source.
#[derive(thiserror::Error, Debug)]
pub enum ReckonError {
	/// Internal error, should never happen
	#[error("InternalError: {0}")]
	Internal(#[from] anyhow::Error),
	/// The source file could not be read
	#[error("Could not open file \"{}\": {source}", .path.display())]
	File { path: PathBuf, source: io::Error },
	/// Compilation failed; diagnostics were already printed to stderr
	#[error("Generated {0} compile errors")]
	CompileErrors(usize),
	/// Execution aborted
	#[error(transparent)]
	Runtime(#[from] RuntimeError),
}
