use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use alamo_testkit::target_dir as workspace_target_dir;

static ALAMO_BIN: OnceLock<PathBuf> = OnceLock::new();

/// Write `bytes` to `dir/name` and return the path as a command argument.
pub(crate) fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> String {
	let path = dir.join(name);
	std::fs::write(&path, bytes).expect("fixture is written");
	path.to_string_lossy().into_owned()
}

pub(crate) fn run_alamo(args: &[&str]) -> Output {
	Command::new(alamo_bin()).args(args).output().expect("alamo command executes")
}

pub(crate) fn run_alamo_json(args: &[&str]) -> serde_json::Value {
	let output = run_alamo(args);
	assert!(
		output.status.success(),
		"alamo command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn alamo_bin() -> &'static PathBuf {
	ALAMO_BIN.get_or_init(resolve_alamo_bin)
}

/// Build the binary once per test process. Cargo only exports
/// `CARGO_BIN_EXE_*` to integration tests, so unit tests locate it under the
/// workspace target directory.
fn resolve_alamo_bin() -> PathBuf {
	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "alamo.exe" } else { "alamo" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "alamo"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build alamo binary at {}", bin.display());

	bin
}

#[test]
fn alamo_bin_is_built_under_the_target_dir() {
	let bin = alamo_bin();
	assert!(bin.starts_with(workspace_target_dir()), "{}", bin.display());
	assert!(bin.is_file(), "{}", bin.display());
}
