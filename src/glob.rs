/// Matches `name` against a wildcard `mask`, anchored at both ends.
/// `?` matches exactly one byte, `*` any run of bytes including the
/// empty one. Case-sensitive, no character classes, no escaping.
///
/// Two cursors plus a single backtrack bookmark: on a mismatch after a
/// `*`, the mask cursor returns to the position past the `*` and the
/// name cursor to one past where the `*` last started matching.
pub fn matches(name: &str, mask: &str) -> bool {
	matches_bytes(name.as_bytes(), mask.as_bytes())
}

/// Byte-level form: unix directory entry names are raw bytes and need
/// not be valid UTF-8.
pub fn matches_bytes(name: &[u8], mask: &[u8]) -> bool {
	let mut n = 0;
	let mut m = 0;
	let mut bookmark: Option<(usize, usize)> = None;

	while n < name.len() {
		match mask.get(m) {
			Some(&b'*') => {
				bookmark = Some((m + 1, n));
				m += 1;
			},
			Some(&c) if c == b'?' || c == name[n] => {
				n += 1;
				m += 1;
			},
			_ => match bookmark {
				Some((mask_mark, name_mark)) => {
					bookmark = Some((mask_mark, name_mark + 1));
					m = mask_mark;
					n = name_mark + 1;
				},
				None => {
					return false;
				},
			},
		}
	}
	while mask.get(m) == Some(&b'*') {
		m += 1;
	}
	m == mask.len()
}

#[cfg(test)]
mod tests {
	use super::{matches, matches_bytes};

	#[test]
	fn literal_masks_are_string_equality() {
		assert!(matches("abc", "abc"));
		assert!(matches("", ""));
		assert!(!matches("abc", "abd"));
		assert!(!matches("abc", "ab"));
		assert!(!matches("ab", "abc"));
		assert!(!matches("x", ""));
	}

	#[test]
	fn question_mark_matches_exactly_one_byte() {
		assert!(matches("abc", "a?c"));
		assert!(matches("abc", "???"));
		assert!(!matches("ab", "a??"));
		assert!(!matches("abcd", "a??"));
	}

	#[test]
	fn star_matches_any_run() {
		assert!(matches("abc", "a*c"));
		assert!(matches("", "*"));
		assert!(matches("abc", "*"));
		assert!(matches("abc", "a*"));
		assert!(matches("abc", "*c"));
		assert!(matches("abc", "*b*"));
		assert!(matches("abc", "a*b*c"));
		assert!(!matches("abc", "a*d"));
		assert!(!matches("", "?"));
	}

	#[test]
	fn star_backtracks_to_a_later_position() {
		assert!(matches("aXbXc", "a*Xc"));
		assert!(matches("abcbc", "a*bc"));
		assert!(matches("aaa", "*a"));
		assert!(!matches("abcbd", "a*bc"));
	}

	#[test]
	fn raw_byte_names_match() {
		assert!(matches_bytes(b"raw\xff.log", b"raw?.log"));
		assert!(matches_bytes(b"raw\xff.log", b"*.log"));
		assert!(!matches_bytes(b"raw\xff.log", b"raw.log"));
	}

	#[test]
	fn matching_is_case_sensitive() {
		assert!(!matches("ABC", "abc"));
		assert!(!matches("Makefile", "m*"));
		assert!(matches("Makefile", "M*file"));
	}
}
