use std::path::PathBuf;

use alamo::format::{AlamoError, AnimationDocument, BoneTrack, Result, parse_animation, parse_model};

use crate::cmd::util::{diagnostic_lines, emit_json, print_diagnostics};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Model whose armature the tracks are checked against.
	#[arg(long)]
	pub model: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Print header, per-bone tracks and checks of one animation.
pub fn run(args: Args) -> Result<()> {
	let Args { path, model, json } = args;

	let doc = parse_animation(&std::fs::read(&path)?)?;
	let validation = match model {
		Some(model) => {
			let model_doc = parse_model(&std::fs::read(&model)?)?;
			let armature = model_doc.armature.ok_or_else(|| AlamoError::NotFound {
				name: format!("armature in {}", model.display()),
			})?;
			Some(doc.validate(&armature).iter().map(ToString::to_string).collect::<Vec<_>>())
		}
		None => None,
	};

	if json {
		let payload = AnimJson {
			path: path.display().to_string(),
			frames: doc.num_frames,
			fps: doc.fps,
			duration: doc.duration(),
			bones: doc.num_bones,
			rotation_block: doc.rotation_block,
			translation_block: doc.translation_block,
			scale_block: doc.scale_block,
			tracks: doc.tracks.iter().map(|track| track_json(&doc, track)).collect(),
			diagnostics: diagnostic_lines(&doc.diagnostics),
			validation,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("frames: {}", doc.num_frames);
	println!("fps: {}", doc.fps);
	println!("duration: {:.3}s", doc.duration());
	println!("blocks: rotation={} translation={} scale={}", doc.rotation_block, doc.translation_block, doc.scale_block);
	println!("tracks: {}", doc.tracks.len());
	for track in &doc.tracks {
		let state = if track.is_animated() { "animated" } else { "static" };
		println!("  {} bone={} {state}", track.name, track.bone_index);
	}
	print_diagnostics("", &doc.diagnostics);
	if let Some(lines) = validation {
		println!("validation: {}", lines.len());
		for line in lines {
			println!("  {line}");
		}
	}
	Ok(())
}

fn track_json(doc: &AnimationDocument, track: &BoneTrack) -> TrackJson {
	TrackJson {
		name: track.name.clone(),
		bone_index: track.bone_index,
		rotation: track.rotation.track(),
		translation: track.translation.track(),
		scale: track.scale.track(),
		animated: track.is_animated(),
		first_rotation: track.rotation_at(doc, 0),
		first_translation: track.translation_at(doc, 0),
		visible_frames: track
			.visibility
			.as_ref()
			.map(|bits| bits.iter().filter(|visible| **visible).count()),
	}
}

#[derive(serde::Serialize)]
struct AnimJson {
	path: String,
	frames: u32,
	fps: f32,
	duration: f32,
	bones: u32,
	rotation_block: u32,
	translation_block: u32,
	scale_block: u32,
	tracks: Vec<TrackJson>,
	diagnostics: Vec<String>,
	validation: Option<Vec<String>>,
}

#[derive(serde::Serialize)]
struct TrackJson {
	name: String,
	bone_index: i32,
	rotation: Option<u32>,
	translation: Option<u32>,
	scale: Option<u32>,
	animated: bool,
	first_rotation: [f32; 4],
	first_translation: [f32; 3],
	visible_frames: Option<usize>,
}
