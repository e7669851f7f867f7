use std::ffi::OsString;

use crate::error::Error;
use crate::expand;
use crate::types::{Command, CommandKind, Pipeline};

/// Parses one input line into a glob-expanded pipeline.
///
/// The line may carry at most one `<`, confined to the first stage, and
/// at most one `>`, confined to the last stage; that pattern is checked
/// line-wide before any stage is built, so a violation constructs
/// nothing at all.
pub fn parse(line: &str) -> Result<Pipeline, Error> {
	let stages: Vec<&str> = line.split('|').collect();
	check_redirection_pattern(line, &stages)?;

	if line.trim().is_empty() {
		return Ok(Pipeline::default());
	}

	let mut commands = Vec::with_capacity(stages.len());
	for stage in &stages {
		commands.push(parse_stage(stage)?);
	}
	for command in &mut commands {
		expand::expand_arguments(&mut command.arguments);
	}
	log::debug!("parsed pipeline: {:?}", commands);
	Ok(Pipeline { commands })
}

fn check_redirection_pattern(line: &str, stages: &[&str]) -> Result<(), Error> {
	let count = |s: &str, marker: char| s.chars().filter(|&c| c == marker).count();
	let first = stages.first().copied().unwrap_or("");
	let last = stages.last().copied().unwrap_or("");
	let inputs = count(line, '<');
	let outputs = count(line, '>');
	if inputs > 1 || outputs > 1 || inputs != count(first, '<') || outputs != count(last, '>') {
		return Err(Error::WrongInput);
	}
	Ok(())
}

fn parse_stage(stage: &str) -> Result<Command, Error> {
	let tokens: Vec<&str> = stage.split_whitespace().collect();
	if tokens.is_empty() {
		return Err(Error::WrongInput);
	}

	let mut arguments: Vec<OsString> = vec![];
	let mut input_path = None;
	let mut output_path = None;
	let mut i = 0;
	while i < tokens.len() {
		match tokens[i] {
			marker @ ("<" | ">") => {
				let target = match tokens.get(i + 1) {
					Some(&t) if t != "<" && t != ">" => t.to_string(),
					_ => return Err(Error::WrongInput),
				};
				if marker == "<" {
					input_path = Some(target);
				} else {
					output_path = Some(target);
				}
				i += 2;
			},
			word => {
				// the argument vector ends at the earliest marker;
				// stray tokens past a redirection target are dropped
				if input_path.is_none() && output_path.is_none() {
					arguments.push(OsString::from(word));
				}
				i += 1;
			},
		}
	}

	if arguments.is_empty() {
		return Err(Error::WrongInput);
	}
	let kind = match arguments[0].to_str() {
		Some(name) => CommandKind::classify(name),
		None => CommandKind::External,
	};
	Ok(Command { arguments, input_path, output_path, kind })
}
