use std::path::PathBuf;

use alamo::format::{AssetSource, DirSource, Result, animation_name, resolve_animations, resolve_submodels};

use crate::cmd::util::{emit_json, split_path};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Directory holding the model's `.ala` files; defaults to the model directory.
	#[arg(long)]
	pub anim_dir: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// List submodel and animation files found next to a model, without decoding them.
pub fn run(args: Args) -> Result<()> {
	let Args { path, anim_dir, json } = args;

	let (model_dir, file) = split_path(&path)?;
	let submodels = resolve_submodels(&DirSource::new(&model_dir).list()?, &file);
	let anim_dir = anim_dir.unwrap_or(model_dir);
	let animations = resolve_animations(&DirSource::new(&anim_dir).list()?, &file);

	if json {
		let payload = SubmodelsJson {
			model: file.clone(),
			animation_dir: anim_dir.display().to_string(),
			animations: animations
				.iter()
				.map(|anim| AnimationFileJson {
					name: animation_name(&file, anim),
					file: anim.clone(),
				})
				.collect(),
			submodels,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("model: {file}");
	println!("submodels: {}", submodels.len());
	for (index, submodel) in submodels.iter().enumerate() {
		println!("  sub{index}: {submodel}");
	}
	println!("animations: {} (in {})", animations.len(), anim_dir.display());
	for anim in &animations {
		println!("  {}: {anim}", animation_name(&file, anim));
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct SubmodelsJson {
	model: String,
	submodels: Vec<String>,
	animation_dir: String,
	animations: Vec<AnimationFileJson>,
}

#[derive(serde::Serialize)]
struct AnimationFileJson {
	file: String,
	name: String,
}
