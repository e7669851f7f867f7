use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use nix::unistd;

use crate::error::Error;

/// `cd` mutates the shell's own working directory, so unlike the other
/// builtins it must never run in a forked child.
pub fn run_cd(arguments: &[OsString]) -> Result<u8, Error> {
	let target = match arguments.len() {
		1 => home_dir()?,
		2 => PathBuf::from(&arguments[1]),
		_ => return Err(Error::WrongInput),
	};
	unistd::chdir(target.as_path()).map_err(|source| Error::Directory {
		path: target.display().to_string(),
		source,
	})?;
	Ok(0)
}

pub fn run_pwd() -> u8 {
	match unistd::getcwd() {
		Ok(dir) => {
			println!("{}", dir.display());
			0
		},
		Err(e) => {
			eprintln!("pwd: {}", e);
			1
		},
	}
}

/// Prints the inherited environment, one `KEY=value` per line, raw
/// bytes and unfiltered. A failed write (wired stdout gone away) makes
/// the stage fail.
pub fn run_set() -> u8 {
	let stdout = io::stdout();
	match write_environment(&mut stdout.lock()) {
		Ok(()) => 0,
		Err(e) => {
			eprintln!("set: {}", e);
			1
		},
	}
}

fn write_environment(out: &mut impl Write) -> io::Result<()> {
	use std::os::unix::ffi::OsStrExt;

	for (key, value) in env::vars_os() {
		out.write_all(key.as_bytes())?;
		out.write_all(b"=")?;
		out.write_all(value.as_bytes())?;
		out.write_all(b"\n")?;
	}
	out.flush()
}

fn home_dir() -> Result<PathBuf, Error> {
	if let Some(home) = env::var_os("HOME") {
		return Ok(PathBuf::from(home));
	}
	match unistd::User::from_uid(unistd::getuid()) {
		Ok(Some(user)) => Ok(user.dir),
		Ok(None) | Err(_) => Err(Error::Directory {
			path: "~".to_string(),
			source: nix::errno::Errno::ENOENT,
		}),
	}
}

#[cfg(test)]
mod tests {
	use std::ffi::OsString;
	use std::io;

	use super::{run_cd, write_environment};
	use crate::error::Error;

	// single test: the working directory is process-wide state, so the
	// switch and the failure case run sequentially
	#[test]
	fn cd_switches_and_rejects_missing_targets() {
		let original = nix::unistd::getcwd().unwrap();
		let dir = tempfile::tempdir().unwrap();
		let target = dir.path().canonicalize().unwrap();

		run_cd(&[OsString::from("cd"), target.clone().into_os_string()]).unwrap();
		assert_eq!(nix::unistd::getcwd().unwrap(), target);

		let r = run_cd(&[OsString::from("cd"), OsString::from("/definitely/not/here")]);
		assert!(matches!(r, Err(Error::Directory { .. })));
		assert_eq!(nix::unistd::getcwd().unwrap(), target);

		run_cd(&[OsString::from("cd"), original.into_os_string()]).unwrap();
	}

	#[test]
	fn cd_takes_at_most_one_argument() {
		let r = run_cd(&[OsString::from("cd"), OsString::from("a"), OsString::from("b")]);
		assert!(matches!(r, Err(Error::WrongInput)));
	}

	#[test]
	fn set_prints_one_key_value_line_per_variable() {
		let mut buf = Vec::new();
		write_environment(&mut buf).unwrap();
		let text = String::from_utf8_lossy(&buf);
		assert!(text.lines().any(|line| line.starts_with("PATH=")));
		assert!(text.lines().all(|line| line.contains('=')));
	}

	struct FailingWriter;

	impl io::Write for FailingWriter {
		fn write(&mut self, _: &[u8]) -> io::Result<usize> {
			Err(io::Error::from(io::ErrorKind::BrokenPipe))
		}
		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn set_surfaces_write_failures() {
		assert!(write_environment(&mut FailingWriter).is_err());
	}
}
