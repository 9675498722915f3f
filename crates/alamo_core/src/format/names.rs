use std::collections::HashSet;

/// Longest name the format's consumers accept, in bytes.
pub const MAX_NAME_LEN: usize = 63;

/// Bytes kept when a name exceeds [`MAX_NAME_LEN`], leaving room for a `.NNN` suffix.
const TRUNCATED_LEN: usize = MAX_NAME_LEN - 4;

/// Longest prefix of `name` within `max` bytes that ends on a char boundary.
fn clip(name: &str, max: usize) -> &str {
	if name.len() <= max {
		return name;
	}
	let mut end = max;
	while !name.is_char_boundary(end) {
		end -= 1;
	}
	&name[..end]
}

/// Shorten names longer than [`MAX_NAME_LEN`] bytes to at most 59 bytes.
pub fn truncate_name(name: &str) -> String {
	if name.len() <= MAX_NAME_LEN {
		return name.to_owned();
	}
	clip(name, TRUNCATED_LEN).to_owned()
}

/// Return `name`, or the first `name.NNN` for which `is_taken` is false.
///
/// Suffixes count up from `.001`. Numbers wider than three digits are printed
/// as-is. An unclaimed name is returned unchanged; suffixed names trim the base
/// so the result stays within [`MAX_NAME_LEN`] bytes.
pub fn disambiguate(name: &str, mut is_taken: impl FnMut(&str) -> bool) -> String {
	if !is_taken(name) {
		return name.to_owned();
	}
	let mut counter = 1_u32;
	loop {
		let suffix = format!(".{counter:03}");
		let candidate = format!("{}{suffix}", clip(name, MAX_NAME_LEN.saturating_sub(suffix.len())));
		if !is_taken(&candidate) {
			return candidate;
		}
		counter += 1;
	}
}

/// Accumulates names already handed out within one naming scope.
#[derive(Debug, Clone, Default)]
pub struct NameSet {
	taken: HashSet<String>,
}

impl NameSet {
	/// Create an empty scope.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return `true` when `name` has been handed out.
	pub fn contains(&self, name: &str) -> bool {
		self.taken.contains(name)
	}

	/// Reserve and return a unique variant of `name`.
	pub fn claim(&mut self, name: &str) -> String {
		let unique = disambiguate(name, |candidate| self.taken.contains(candidate));
		self.taken.insert(unique.clone());
		unique
	}

	/// Number of names handed out.
	pub fn len(&self) -> usize {
		self.taken.len()
	}

	/// Return `true` when no name has been handed out.
	pub fn is_empty(&self) -> bool {
		self.taken.is_empty()
	}
}
