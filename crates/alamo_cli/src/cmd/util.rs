use std::path::{Path, PathBuf};

use alamo::format::{AlamoError, Diagnostic, Result};
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: json encoding failed: {err}"),
	}
}

/// Split a model path into its directory and file name.
pub(crate) fn split_path(path: &Path) -> Result<(PathBuf, String)> {
	let Some(file) = path.file_name() else {
		return Err(AlamoError::NotFound {
			name: path.display().to_string(),
		});
	};
	let dir = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
		_ => PathBuf::from("."),
	};
	Ok((dir, file.to_string_lossy().into_owned()))
}

/// Render diagnostics as display strings.
pub(crate) fn diagnostic_lines(diagnostics: &[Diagnostic]) -> Vec<String> {
	diagnostics.iter().map(ToString::to_string).collect()
}

/// Print a labeled list of diagnostics in text mode.
pub(crate) fn print_diagnostics(indent: &str, diagnostics: &[Diagnostic]) {
	println!("{indent}diagnostics: {}", diagnostics.len());
	for diagnostic in diagnostics {
		println!("{indent}  {diagnostic}");
	}
}

#[cfg(test)]
mod tests {
	use std::path::{Path, PathBuf};

	use super::split_path;

	#[test]
	fn bare_file_name_lives_in_current_dir() {
		let (dir, file) = split_path(Path::new("tank.alo")).expect("split");
		assert_eq!(dir, PathBuf::from("."));
		assert_eq!(file, "tank.alo");

		let (dir, file) = split_path(Path::new("Data/Art/Models/tank.alo")).expect("split");
		assert_eq!(dir, PathBuf::from("Data/Art/Models"));
		assert_eq!(file, "tank.alo");
	}
}
