mod builtin;
mod error;
mod eval;
mod expand;
mod glob;
mod parser;
mod timing;
mod types;

use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

fn prompt() -> String {
	let cwd = match unistd::getcwd() {
		Ok(dir) => dir.display().to_string(),
		Err(_) => String::from("?"),
	};
	if unistd::getgid().as_raw() == 0 {
		format!("{}!", cwd)
	} else {
		format!("{}> ", cwd)
	}
}

fn run_line(line: &str) {
	match parser::parse(line) {
		Ok(mut pipeline) => {
			if let Err(e) = eval::eval(&mut pipeline) {
				eprintln!("mish: {}", e);
			}
		},
		Err(e) => eprintln!("mish: {}", e),
	}
}

fn main() {
	env_logger::init();

	// Ctrl-C goes to the foreground children; the shell itself stays up
	let _ = unsafe { signal::signal(Signal::SIGINT, SigHandler::SigIgn) };

	let mut editor = match DefaultEditor::new() {
		Ok(editor) => editor,
		Err(e) => {
			eprintln!("mish: cannot read input: {}", e);
			std::process::exit(1);
		},
	};

	loop {
		match editor.readline(&prompt()) {
			Ok(line) => {
				let _ = editor.add_history_entry(line.as_str());
				run_line(&line);
			},
			// interrupted read: discard the partial line, prompt again
			Err(ReadlineError::Interrupted) => continue,
			Err(ReadlineError::Eof) => break,
			Err(e) => {
				eprintln!("mish: {}", e);
				break;
			},
		}
	}
}
