use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::builtin;
use crate::error::Error;
use crate::timing;
use crate::types::{Command, CommandKind, Pipeline};

/// Executes one line's pipeline and returns the last stage's exit
/// status. All descriptors and pids live inside this call; nothing
/// survives into the next line.
pub fn eval(pipeline: &mut Pipeline) -> Result<u8, Error> {
	if pipeline.is_empty() {
		return Ok(0);
	}
	match pipeline.commands[0].kind {
		CommandKind::Cd => {
			if pipeline.commands.len() > 1 {
				return Err(Error::WrongInput);
			}
			builtin::run_cd(&pipeline.commands[0].arguments)
		},
		CommandKind::Time => timing::run(pipeline),
		_ => run_piped(pipeline),
	}
}

/// `pwd` and `set` write to whatever stdout has been wired to, so they
/// may run in a child, but only as the final stage; everything before
/// the last pipe must be an external program.
fn check_stage_positions(commands: &[Command]) -> Result<(), Error> {
	for (i, command) in commands.iter().enumerate() {
		let last = i == commands.len() - 1;
		match command.kind {
			CommandKind::External => {},
			CommandKind::Pwd | CommandKind::Set if last => {},
			_ => return Err(Error::WrongInput),
		}
	}
	Ok(())
}

fn run_piped(pipeline: &Pipeline) -> Result<u8, Error> {
	let commands = &pipeline.commands;
	check_stage_positions(commands)?;

	// redirection targets open before any fork; a bad path spawns nothing
	let stdin_file = open_input(&commands[0])?;
	let stdout_file = open_output(commands.last().unwrap())?;
	let pipes = make_pipes(commands.len() - 1)?;

	let mut pids: Vec<Pid> = Vec::with_capacity(commands.len());
	let mut spawn_error = None;
	for (i, command) in commands.iter().enumerate() {
		match unsafe { unistd::fork() } {
			Ok(ForkResult::Parent { child }) => {
				log::debug!("stage {} running as pid {}", i, child);
				pids.push(child);
			},
			Ok(ForkResult::Child) => {
				run_stage(command, i, commands.len(), &pipes, &stdin_file, &stdout_file);
			},
			Err(e) => {
				spawn_error = Some(Error::Spawn(e));
				break;
			},
		}
	}

	drop(pipes);
	drop(stdin_file);
	drop(stdout_file);

	// collect-all; the pipeline's status is the last stage's
	let mut status = 0;
	for pid in pids {
		status = match waitpid(pid, None) {
			Ok(WaitStatus::Exited(_, code)) => code as u8,
			Ok(WaitStatus::Signaled(_, sig, _)) => 128 + sig as u8,
			Ok(_) | Err(_) => 1,
		};
	}
	match spawn_error {
		Some(e) => Err(e),
		None => Ok(status),
	}
}

fn open_input(command: &Command) -> Result<Option<File>, Error> {
	match &command.input_path {
		Some(path) => File::open(path)
			.map(Some)
			.map_err(|source| Error::File { path: path.clone(), source }),
		None => Ok(None),
	}
}

fn open_output(command: &Command) -> Result<Option<File>, Error> {
	match &command.output_path {
		Some(path) => OpenOptions::new()
			.write(true)
			.create(true)
			.truncate(true)
			.mode(0o600)
			.open(path)
			.map(Some)
			.map_err(|source| Error::File { path: path.clone(), source }),
		None => Ok(None),
	}
}

fn make_pipes(count: usize) -> Result<Vec<(OwnedFd, OwnedFd)>, Error> {
	(0..count)
		.map(|_| unistd::pipe2(OFlag::O_CLOEXEC).map_err(Error::Spawn))
		.collect()
}

/// Child side of one stage. Never returns to the parent's control
/// flow: the process image is replaced, or the child `_exit`s.
fn run_stage(
	command: &Command,
	i: usize,
	stages: usize,
	pipes: &[(OwnedFd, OwnedFd)],
	stdin_file: &Option<File>,
	stdout_file: &Option<File>,
) -> ! {
	let status = match wire_and_run(command, i, stages, pipes, stdin_file, stdout_file) {
		Ok(status) => status,
		Err(e) => {
			eprintln!("{}: {}", command.arguments[0].to_string_lossy(), e);
			126
		},
	};
	unsafe { libc::_exit(status as libc::c_int) }
}

fn wire_and_run(
	command: &Command,
	i: usize,
	stages: usize,
	pipes: &[(OwnedFd, OwnedFd)],
	stdin_file: &Option<File>,
	stdout_file: &Option<File>,
) -> Result<u8, Errno> {
	// the shell ignores SIGINT; its children must not
	unsafe { signal::signal(Signal::SIGINT, SigHandler::SigDfl) }?;

	if i > 0 {
		unistd::dup2(pipes[i - 1].0.as_raw_fd(), libc::STDIN_FILENO)?;
	}
	if i < stages - 1 {
		unistd::dup2(pipes[i].1.as_raw_fd(), libc::STDOUT_FILENO)?;
	}
	if i == 0 {
		if let Some(file) = stdin_file {
			unistd::dup2(file.as_raw_fd(), libc::STDIN_FILENO)?;
		}
	}
	if i == stages - 1 {
		if let Some(file) = stdout_file {
			unistd::dup2(file.as_raw_fd(), libc::STDOUT_FILENO)?;
		}
	}
	// only the dup2'd stdio copies are needed past this point;
	// O_CLOEXEC is the backstop for the exec path
	for (read_end, write_end) in pipes {
		let _ = unistd::close(read_end.as_raw_fd());
		let _ = unistd::close(write_end.as_raw_fd());
	}

	match command.kind {
		CommandKind::Pwd => Ok(builtin::run_pwd()),
		CommandKind::Set => Ok(builtin::run_set()),
		_ => exec_external(command),
	}
}

fn exec_external(command: &Command) -> Result<u8, Errno> {
	let argv = command
		.arguments
		.iter()
		.map(|arg| CString::new(arg.as_bytes()))
		.collect::<Result<Vec<CString>, _>>()
		.map_err(|_| Errno::EINVAL)?;
	match unistd::execvp(&argv[0], &argv) {
		Ok(never) => match never {},
		Err(Errno::ENOENT) => {
			eprintln!("command not found: {}", command.arguments[0].to_string_lossy());
			Ok(127)
		},
		Err(e) => Err(e),
	}
}
