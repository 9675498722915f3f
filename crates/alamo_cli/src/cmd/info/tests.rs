use alamo_testkit::{ChunkWriter, sample_model};

use crate::cmd::test_support::{run_alamo, run_alamo_json, write_fixture};

#[test]
fn info_json_lists_model_contents() {
	let dir = tempfile::tempdir().expect("tempdir");
	let model = write_fixture(dir.path(), "tank.alo", &sample_model());
	let json = run_alamo_json(&["info", &model, "--json"]);

	assert_eq!(json["armature_present"], true);
	assert_eq!(json["bones"][1]["name"], "Turret");
	assert_eq!(json["bones"][1]["parent"], 0);
	assert_eq!(json["bones"][0]["billboard"], "Disable");

	assert_eq!(json["meshes"][0]["name"], "Hull");
	assert_eq!(json["meshes"][0]["faces"], 2);
	assert_eq!(json["meshes"][0]["submeshes"][0]["shader"], "MeshGloss.fx");
	assert_eq!(json["meshes"][1]["hidden_by_default"], false);

	assert_eq!(json["lights"][0]["kind"], "point");
	assert_eq!(json["connections"]["count"], 3);
	assert_eq!(json["connections"]["resolved"], 3);
	assert_eq!(json["proxies"][0]["name"], "Muzzle");
	assert!(json["diagnostics"].as_array().is_some_and(|items| items.is_empty()));
}

#[test]
fn info_json_reports_missing_textures_when_asked() {
	let dir = tempfile::tempdir().expect("tempdir");
	let model = write_fixture(dir.path(), "tank.alo", &sample_model());
	let textures = dir.path().to_string_lossy().into_owned();
	let json = run_alamo_json(&["info", &model, "--textures", &textures, "--json"]);

	let diagnostics = json["diagnostics"].as_array().expect("diagnostics array");
	assert_eq!(diagnostics.len(), 1);
	assert!(diagnostics[0].as_str().is_some_and(|line| line.contains("hull.dds")));
}

#[test]
fn particle_file_fails_with_error_prefix() {
	let dir = tempfile::tempdir().expect("tempdir");
	let mut particle = ChunkWriter::new();
	particle.container(0x900, |inner| {
		inner.chunk(0x0, &[0; 4]);
	});
	let path = write_fixture(dir.path(), "smoke.alo", particle.as_bytes());

	let output = run_alamo(&["info", &path]);
	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("error: unsupported format"), "{stderr}");
}
