use std::ffi::OsString;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
	External,
	Cd,
	Pwd,
	Time,
	Set,
}

impl CommandKind {
	pub fn classify(name: &str) -> CommandKind {
		match name {
			"cd" => CommandKind::Cd,
			"pwd" => CommandKind::Pwd,
			"time" => CommandKind::Time,
			"set" => CommandKind::Set,
			_ => CommandKind::External,
		}
	}
}

/// One pipeline stage. Holds argv and redirection targets only; file
/// descriptors and pids stay with the orchestrator for the duration of
/// a single line. Arguments are raw OS strings: glob expansion may
/// splice in directory entries that are not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
	pub arguments: Vec<OsString>,
	pub input_path: Option<String>,
	pub output_path: Option<String>,
	pub kind: CommandKind,
}

impl Command {
	/// Drops argv[0] and reclassifies the stage from the remaining
	/// leading argument; used to unwrap the `time` prefix.
	pub fn shift_program(&mut self) {
		if !self.arguments.is_empty() {
			self.arguments.remove(0);
		}
		self.kind = match self.arguments.first().and_then(|name| name.to_str()) {
			Some(name) => CommandKind::classify(name),
			None => CommandKind::External,
		};
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
	pub commands: Vec<Command>,
}

impl Pipeline {
	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}
}
