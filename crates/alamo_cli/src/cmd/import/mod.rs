use std::path::PathBuf;

use alamo::format::{AnimationEntry, DirSource, ModelSet, Result, SubmodelEntry, TextureDir, load_model_set};

use crate::cmd::info::{InfoJson, info_json};
use crate::cmd::util::{diagnostic_lines, emit_json, print_diagnostics, split_path};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Directory holding the model's `.ala` files; defaults to the model directory.
	#[arg(long)]
	pub anim_dir: Option<PathBuf>,
	/// Texture directory; defaults to `Textures` next to the model directory.
	#[arg(long)]
	pub textures: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Decode a model with its submodels and animations and report each file.
///
/// Sibling failures are reported, not returned; only a failing primary model
/// makes the command fail.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		anim_dir,
		textures,
		json,
	} = args;

	let (model_dir, file) = split_path(&path)?;
	let models = DirSource::new(&model_dir);
	let animations = DirSource::new(anim_dir.unwrap_or_else(|| model_dir.clone()));
	let textures = match textures {
		Some(dir) => TextureDir::new(dir),
		None => TextureDir::for_model_dir(&model_dir),
	};
	let set = load_model_set(&models, &animations, &textures, &file)?;

	if json {
		emit_json(&import_json(&path, &set));
		return Ok(());
	}

	println!("model: {}", path.display());
	println!("meshes: {}", set.primary.meshes.len());
	println!("lights: {}", set.primary.lights.len());
	println!("bones: {}", set.primary.armature.as_ref().map_or(0, |armature| armature.len()));
	print_diagnostics("", &set.primary.diagnostics);

	println!("submodels: {}", set.submodels.len());
	for entry in &set.submodels {
		match &entry.document {
			Ok(doc) => {
				println!("  sub{} {}: {} meshes", entry.index, entry.file, doc.meshes.len());
				if let Some(resolution) = &entry.connections {
					println!("    connections: {} resolved, {} unresolved", resolution.resolved.len(), resolution.unresolved.len());
				}
				print_diagnostics("    ", &doc.diagnostics);
				for anim in &entry.animations {
					print_animation("    ", anim);
				}
			}
			Err(err) => println!("  sub{} {}: failed: {err}", entry.index, entry.file),
		}
	}

	println!("animations: {}", set.animations.len());
	for entry in &set.animations {
		print_animation("  ", entry);
	}

	println!("failures: {}", set.failures());
	Ok(())
}

fn print_animation(indent: &str, entry: &AnimationEntry) {
	match &entry.document {
		Ok(doc) => {
			println!("{indent}{} ({}): {} frames, {} tracks", entry.name, entry.file, doc.num_frames, doc.tracks.len());
			let nested = format!("{indent}  ");
			print_diagnostics(&nested, &doc.diagnostics);
			for warning in &entry.warnings {
				println!("{nested}{warning}");
			}
		}
		Err(err) => println!("{indent}{} ({}): failed: {err}", entry.name, entry.file),
	}
}

fn import_json(path: &std::path::Path, set: &ModelSet) -> ImportJson {
	ImportJson {
		model: info_json(path, &set.primary),
		submodels: set.submodels.iter().map(submodel_json).collect(),
		animations: set.animations.iter().map(animation_json).collect(),
		failures: set.failures(),
	}
}

fn submodel_json(entry: &SubmodelEntry) -> SubmodelJson {
	let mut out = SubmodelJson {
		file: entry.file.clone(),
		index: entry.index,
		error: None,
		meshes: Vec::new(),
		resolved: entry.connections.as_ref().map_or(0, |resolution| resolution.resolved.len()),
		unresolved: entry.connections.as_ref().map_or_else(Vec::new, |resolution| resolution.unresolved.clone()),
		diagnostics: Vec::new(),
		animations: entry.animations.iter().map(animation_json).collect(),
	};
	match &entry.document {
		Ok(doc) => {
			out.meshes = doc.meshes.iter().map(|mesh| mesh.name.clone()).collect();
			out.diagnostics = diagnostic_lines(&doc.diagnostics);
		}
		Err(err) => out.error = Some(err.to_string()),
	}
	out
}

fn animation_json(entry: &AnimationEntry) -> AnimationJson {
	let mut out = AnimationJson {
		file: entry.file.clone(),
		name: entry.name.clone(),
		error: None,
		frames: 0,
		tracks: 0,
		diagnostics: Vec::new(),
		warnings: entry.warnings.iter().map(ToString::to_string).collect(),
	};
	match &entry.document {
		Ok(doc) => {
			out.frames = doc.num_frames;
			out.tracks = doc.tracks.len();
			out.diagnostics = diagnostic_lines(&doc.diagnostics);
		}
		Err(err) => out.error = Some(err.to_string()),
	}
	out
}

#[derive(serde::Serialize)]
struct ImportJson {
	model: InfoJson,
	submodels: Vec<SubmodelJson>,
	animations: Vec<AnimationJson>,
	failures: usize,
}

#[derive(serde::Serialize)]
struct SubmodelJson {
	file: String,
	index: usize,
	error: Option<String>,
	meshes: Vec<String>,
	resolved: usize,
	unresolved: Vec<usize>,
	diagnostics: Vec<String>,
	animations: Vec<AnimationJson>,
}

#[derive(serde::Serialize)]
struct AnimationJson {
	file: String,
	name: String,
	error: Option<String>,
	frames: u32,
	tracks: usize,
	diagnostics: Vec<String>,
	warnings: Vec<String>,
}
