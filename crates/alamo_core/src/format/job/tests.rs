use std::fs;
use std::path::Path;

use alamo_testkit::{ChunkWriter, MeshFlags, SubmeshSpec, connections, mesh, sample_animation, sample_model};

use crate::format::{AlamoError, AssetSource, BoneMatch, DirSource, Diagnostic, NoTextures, TextureDir, TextureLookup, load_model_set};

fn turret_submodel() -> Vec<u8> {
	let mut out = ChunkWriter::new();
	mesh(&mut out, "Turret", MeshFlags::default(), &[SubmeshSpec::fan("MeshAlpha.fx", 3)]);
	connections(&mut out, &[(0, 40)], &[]);
	out.into_bytes()
}

fn write(dir: &Path, name: &str, bytes: &[u8]) {
	fs::write(dir.join(name), bytes).expect("write fixture");
}

#[test]
fn dir_source_lists_sorted_files_only() {
	let dir = tempfile::tempdir().expect("tempdir");
	write(dir.path(), "tank_b.alo", b"");
	write(dir.path(), "tank_a.alo", b"");
	fs::create_dir(dir.path().join("nested.alo")).expect("subdir");

	let source = DirSource::new(dir.path());
	assert_eq!(source.list().expect("list"), vec!["tank_a.alo".to_owned(), "tank_b.alo".to_owned()]);
}

#[test]
fn dir_source_missing_file_is_not_found() {
	let dir = tempfile::tempdir().expect("tempdir");
	let err = DirSource::new(dir.path()).read("ghost.alo").expect_err("missing file");
	assert!(matches!(err, AlamoError::NotFound { name } if name == "ghost.alo"));
}

#[test]
fn texture_dir_sits_next_to_model_dir() {
	let root = tempfile::tempdir().expect("tempdir");
	let models = root.path().join("Models");
	fs::create_dir_all(root.path().join("Textures")).expect("textures dir");
	write(&root.path().join("Textures"), "hull.dds", b"DDS ");

	let lookup = TextureDir::for_model_dir(&models);
	assert_eq!(lookup.root(), root.path().join("Textures"));
	assert!(lookup.exists("hull.dds"));
	assert!(!lookup.exists("turret.dds"));
}

#[test]
fn model_set_collects_submodels_and_animations() {
	let dir = tempfile::tempdir().expect("tempdir");
	write(dir.path(), "tank.alo", &sample_model());
	write(dir.path(), "tank_turret.alo", &turret_submodel());
	write(dir.path(), "tank_turret_d.alo", &turret_submodel());
	write(dir.path(), "tank_idle.ala", &sample_animation());
	write(dir.path(), "readme.txt", b"not a model");

	let source = DirSource::new(dir.path());
	let set = load_model_set(&source, &source, &NoTextures, "tank.alo").expect("model set");

	assert_eq!(set.primary.meshes.len(), 2);
	assert_eq!(set.connections.as_ref().map(|resolution| resolution.resolved.len()), Some(3));
	assert_eq!(set.failures(), 0);

	assert_eq!(set.submodels.len(), 1);
	let turret = &set.submodels[0];
	assert_eq!(turret.file, "tank_turret.alo");
	let document = turret.document.as_ref().expect("submodel decodes");
	assert_eq!(document.meshes[0].name, "sub0_Turret");
	let resolution = turret.connections.as_ref().expect("resolved against primary armature");
	assert_eq!(resolution.resolved.len(), 1);
	assert_eq!(resolution.resolved[0].bone, 1);
	assert_eq!(resolution.resolved[0].matched, BoneMatch::NameHeuristic);

	assert_eq!(set.animations.len(), 1);
	let idle = &set.animations[0];
	assert_eq!(idle.name, "idle");
	assert!(idle.document.is_ok());
	assert!(idle.warnings.is_empty(), "{:?}", idle.warnings);
}

#[test]
fn broken_sibling_does_not_abort_the_set() {
	let dir = tempfile::tempdir().expect("tempdir");
	let mut truncated = ChunkWriter::new();
	truncated.chunk(0x400, &[0; 8]);
	let mut truncated = truncated.into_bytes();
	truncated.truncate(10);

	write(dir.path(), "tank.alo", &sample_model());
	write(dir.path(), "tank_hatch.alo", &truncated);
	write(dir.path(), "tank_turret.alo", &turret_submodel());
	write(dir.path(), "tank_idle.ala", b"\x01\x10");

	let source = DirSource::new(dir.path());
	let set = load_model_set(&source, &source, &NoTextures, "tank.alo").expect("model set");

	assert_eq!(set.failures(), 2);
	assert!(set.submodels[0].document.is_err());
	assert_eq!(set.submodels[0].index, 0);
	assert!(set.submodels[1].document.is_ok());
	assert_eq!(set.submodels[1].index, 1);
	assert!(set.animations[0].document.is_err());
}

#[test]
fn missing_primary_is_fatal() {
	let dir = tempfile::tempdir().expect("tempdir");
	let source = DirSource::new(dir.path());
	let err = load_model_set(&source, &source, &NoTextures, "tank.alo").expect_err("no primary");
	assert!(matches!(err, AlamoError::NotFound { .. }));
}

#[test]
fn texture_dir_reports_missing_textures() {
	let root = tempfile::tempdir().expect("tempdir");
	let models = root.path().join("Models");
	fs::create_dir_all(&models).expect("models dir");
	fs::create_dir_all(root.path().join("Textures")).expect("textures dir");
	write(&models, "tank.alo", &sample_model());

	let source = DirSource::new(&models);
	let textures = TextureDir::for_model_dir(&models);
	let set = load_model_set(&source, &source, &textures, "tank.alo").expect("model set");
	assert!(
		set.primary
			.diagnostics
			.iter()
			.any(|diag| matches!(diag, Diagnostic::MissingTexture { file, .. } if file == "hull.dds"))
	);

	write(&root.path().join("Textures"), "hull.dds", b"DDS ");
	let set = load_model_set(&source, &source, &textures, "tank.alo").expect("model set");
	assert!(set.primary.diagnostics.is_empty(), "{:?}", set.primary.diagnostics);
}

#[test]
fn submodel_animations_are_loaded_against_the_primary_armature() {
	let dir = tempfile::tempdir().expect("tempdir");
	write(dir.path(), "tank.alo", &sample_model());
	write(dir.path(), "tank_turret.alo", &turret_submodel());
	write(dir.path(), "tank_turret_aim.ala", &sample_animation());
	write(dir.path(), "tank_turret_spin.ala", b"\x01\x10");
	write(dir.path(), "tank_idle.ala", &sample_animation());

	let source = DirSource::new(dir.path());
	let set = load_model_set(&source, &source, &NoTextures, "tank.alo").expect("model set");

	let turret = &set.submodels[0];
	let names: Vec<&str> = turret.animations.iter().map(|entry| entry.name.as_str()).collect();
	assert_eq!(names, ["aim", "spin"]);
	let aim = &turret.animations[0];
	assert_eq!(aim.file, "tank_turret_aim.ala");
	assert!(aim.document.is_ok());
	assert!(aim.warnings.is_empty(), "{:?}", aim.warnings);
	assert!(turret.animations[1].document.is_err());

	// The primary stem prefixes every file above, so it sees them too.
	assert_eq!(set.animations.len(), 3);
	assert_eq!(set.failures(), 2);
}

#[test]
fn failed_submodel_has_no_animations() {
	let dir = tempfile::tempdir().expect("tempdir");
	write(dir.path(), "tank.alo", &sample_model());
	write(dir.path(), "tank_turret.alo", b"\x00\x04");
	write(dir.path(), "tank_turret_aim.ala", &sample_animation());

	let source = DirSource::new(dir.path());
	let set = load_model_set(&source, &source, &NoTextures, "tank.alo").expect("model set");

	assert!(set.submodels[0].document.is_err());
	assert!(set.submodels[0].animations.is_empty());
	assert_eq!(set.animations.len(), 1);
	assert_eq!(set.failures(), 1);
}
