use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::glob;

pub fn needs_expansion<T: AsRef<OsStr>>(text: T) -> bool {
	text.as_ref().as_bytes().iter().any(|&b| b == b'*' || b == b'?')
}

/// Expands every argument containing a wildcard in place. An argument
/// with zero matches keeps its literal text; multiple matches replace
/// the argument with the whole set in directory-listing order.
pub fn expand_arguments(arguments: &mut Vec<OsString>) {
	let mut result = Vec::with_capacity(arguments.len());
	for argument in arguments.drain(..) {
		if !needs_expansion(&argument) {
			result.push(argument);
			continue;
		}
		let mut expanded = expand_pattern(&argument);
		if expanded.is_empty() {
			result.push(argument);
		} else {
			result.append(&mut expanded);
		}
	}
	*arguments = result;
}

/// Walks a slash-separated pattern component by component, keeping a
/// set of partial paths. A leading `/` roots the walk at the
/// filesystem root, otherwise it is relative to the current directory.
/// A trailing `/` restricts the final component to directories.
/// Returns the empty set when nothing matches.
pub fn expand_pattern<T: AsRef<OsStr>>(pattern: T) -> Vec<OsString> {
	let bytes = pattern.as_ref().as_bytes();
	let absolute = bytes.first() == Some(&b'/');
	let dirs_only = bytes.last() == Some(&b'/');
	let components: Vec<&OsStr> = bytes
		.split(|&b| b == b'/')
		.filter(|c| !c.is_empty())
		.map(OsStr::from_bytes)
		.collect();
	if components.is_empty() {
		return vec![];
	}

	let mut partials = vec![OsString::from(if absolute { "/" } else { "" })];
	for (idx, component) in components.iter().enumerate() {
		let last = idx == components.len() - 1;
		let want_file = last && !dirs_only;
		partials = if needs_expansion(component) {
			scan_component(&partials, component, want_file)
		} else {
			keep_literal(&partials, component, want_file)
		};
		if partials.is_empty() {
			return vec![];
		}
	}
	partials
}

fn join(partial: &OsStr, name: &OsStr) -> OsString {
	let mut path = partial.to_os_string();
	if !(partial.is_empty() || partial.as_bytes().ends_with(b"/")) {
		path.push("/");
	}
	path.push(name);
	path
}

/// Lists each partial's directory and filters entries through the
/// matcher, byte-wise so non-UTF-8 names take part. Hidden entries
/// only match a mask that itself starts with a dot. Intermediate
/// components keep directories only.
fn scan_component(partials: &[OsString], component: &OsStr, want_file: bool) -> Vec<OsString> {
	let show_hidden = component.as_bytes().first() == Some(&b'.');
	let mut next = vec![];
	for partial in partials {
		let dir = if partial.is_empty() { Path::new(".") } else { Path::new(partial) };
		let entries = match fs::read_dir(dir) {
			Ok(entries) => entries,
			Err(_) => continue,
		};
		for entry in entries.flatten() {
			let name = entry.file_name();
			if name.as_bytes().first() == Some(&b'.') && !show_hidden {
				continue;
			}
			if !glob::matches_bytes(name.as_bytes(), component.as_bytes()) {
				continue;
			}
			let keep = match entry.file_type() {
				Ok(t) => t.is_dir() || (want_file && t.is_file()),
				Err(_) => false,
			};
			if keep {
				next.push(join(partial, &name));
			}
		}
	}
	next
}

/// A component without wildcards needs no directory scan, only an
/// existence check so a literal tail never fabricates a path.
fn keep_literal(partials: &[OsString], component: &OsStr, want_file: bool) -> Vec<OsString> {
	partials
		.iter()
		.map(|partial| join(partial, component))
		.filter(|path| match fs::metadata(path) {
			Ok(meta) => meta.is_dir() || (want_file && meta.is_file()),
			Err(_) => false,
		})
		.collect()
}
