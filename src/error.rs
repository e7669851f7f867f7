use std::io;

use thiserror::Error;

/// Everything that can abort the current line. None of these are fatal
/// to the shell itself; the loop reports and reads the next line.
#[derive(Debug, Error)]
pub enum Error {
	#[error("wrong input format")]
	WrongInput,
	#[error("cannot open {path}: {source}")]
	File { path: String, source: io::Error },
	#[error("cd: {path}: {source}")]
	Directory { path: String, source: nix::Error },
	#[error("cannot spawn pipeline: {0}")]
	Spawn(nix::Error),
}
