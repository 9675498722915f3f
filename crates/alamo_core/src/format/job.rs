//! Loading a primary model together with its submodels and animations.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::format::{
	AlamoError, AnimationDocument, Armature, ConnectionResolution, ModelDocument, ModelOptions, Result, TextureLookup, ValidationWarning, animation_name, parse_animation,
	parse_model_with, resolve_animations, resolve_connections, resolve_submodels,
};

/// Directory-like provider of asset files.
pub trait AssetSource: Sync {
	/// File names available in this source.
	fn list(&self) -> Result<Vec<String>>;

	/// Full contents of `name`, or [`AlamoError::NotFound`].
	fn read(&self, name: &str) -> Result<Vec<u8>>;
}

/// Asset source backed by one filesystem directory.
#[derive(Debug, Clone)]
pub struct DirSource {
	root: PathBuf,
}

impl DirSource {
	/// Serve files directly inside `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Directory this source reads from.
	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl AssetSource for DirSource {
	/// Regular files of the directory, sorted by name so results do not
	/// depend on filesystem enumeration order.
	fn list(&self) -> Result<Vec<String>> {
		let mut names = Vec::new();
		for entry in std::fs::read_dir(&self.root)? {
			let entry = entry?;
			if entry.file_type()?.is_file() {
				names.push(entry.file_name().to_string_lossy().into_owned());
			}
		}
		names.sort();
		Ok(names)
	}

	fn read(&self, name: &str) -> Result<Vec<u8>> {
		std::fs::read(self.root.join(name)).map_err(|err| match err.kind() {
			ErrorKind::NotFound => AlamoError::NotFound { name: name.to_owned() },
			_ => AlamoError::Io(err),
		})
	}
}

/// Texture lookup over a `Textures` directory.
#[derive(Debug, Clone)]
pub struct TextureDir {
	root: PathBuf,
}

impl TextureDir {
	/// Look textures up directly in `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// The `Textures` directory next to a model directory, i.e.
	/// `<model_dir>/../Textures`.
	pub fn for_model_dir(model_dir: &Path) -> Self {
		let base = model_dir.parent().unwrap_or(model_dir);
		Self::new(base.join("Textures"))
	}

	/// Directory searched for textures.
	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl TextureLookup for TextureDir {
	fn exists(&self, file: &str) -> bool {
		self.root.join(file).is_file()
	}
}

/// One submodel file and its decode outcome.
#[derive(Debug)]
pub struct SubmodelEntry {
	/// File name in the model source.
	pub file: String,
	/// Submodel number used for the `sub<N>_` mesh prefix.
	pub index: usize,
	/// Decoded document or the error that stopped it.
	pub document: Result<ModelDocument>,
	/// Connections resolved against the primary armature.
	pub connections: Option<ConnectionResolution>,
	/// Animations named after this submodel, checked against the primary
	/// armature. Empty when the submodel fails to decode.
	pub animations: Vec<AnimationEntry>,
}

/// One animation file and its decode outcome.
#[derive(Debug)]
pub struct AnimationEntry {
	/// File name in the animation source.
	pub file: String,
	/// Action name derived from the file name.
	pub name: String,
	/// Decoded document or the error that stopped it.
	pub document: Result<AnimationDocument>,
	/// Skeleton checks against the primary armature.
	pub warnings: Vec<ValidationWarning>,
}

/// Primary model plus every sibling file found for it.
#[derive(Debug)]
pub struct ModelSet {
	/// Primary model file name.
	pub file: String,
	/// Primary model document.
	pub primary: ModelDocument,
	/// Primary connections, when the primary carries an armature.
	pub connections: Option<ConnectionResolution>,
	/// Submodels in listing order.
	pub submodels: Vec<SubmodelEntry>,
	/// Animations in listing order.
	pub animations: Vec<AnimationEntry>,
}

impl ModelSet {
	/// Number of sibling files that failed to decode, submodel animations
	/// included.
	pub fn failures(&self) -> usize {
		let submodels = self
			.submodels
			.iter()
			.map(|entry| usize::from(entry.document.is_err()) + failed(&entry.animations))
			.sum::<usize>();
		submodels + failed(&self.animations)
	}
}

fn failed(animations: &[AnimationEntry]) -> usize {
	animations.iter().filter(|entry| entry.document.is_err()).count()
}

/// Decode `primary` from `models`, then its submodels and the animations in
/// `animations`.
///
/// The primary must decode; its armature is the reference for every sibling,
/// including animations found for a submodel. Siblings decode in parallel and
/// each keeps its own result.
pub fn load_model_set(models: &dyn AssetSource, animations: &dyn AssetSource, textures: &dyn TextureLookup, primary: &str) -> Result<ModelSet> {
	let bytes = models.read(primary)?;
	let document = parse_model_with(&bytes, &ModelOptions::primary(), textures)?;
	let armature = document.armature.as_ref();
	let connections = armature.map(|armature| resolve_connections(&document, armature));

	let model_files = models.list()?;
	let animation_listing = animations.list()?;
	let submodel_files = resolve_submodels(&model_files, primary);
	let animation_files = resolve_animations(&animation_listing, primary);
	tracing::debug!(primary, submodels = submodel_files.len(), animations = animation_files.len(), "loading model set");

	let submodels: Vec<SubmodelEntry> = submodel_files
		.into_par_iter()
		.enumerate()
		.map(|(index, file)| {
			let document = models
				.read(&file)
				.and_then(|bytes| parse_model_with(&bytes, &ModelOptions::submodel(index), textures));
			let connections = match (&document, armature) {
				(Ok(document), Some(armature)) => Some(resolve_connections(document, armature)),
				_ => None,
			};
			let animations = match &document {
				Ok(_) => load_animations(animations, resolve_animations(&animation_listing, &file), &file, armature),
				Err(err) => {
					tracing::warn!("submodel {file} failed: {err}");
					Vec::new()
				}
			};
			SubmodelEntry {
				file,
				index,
				document,
				connections,
				animations,
			}
		})
		.collect();

	let animations = load_animations(animations, animation_files, primary, armature);

	Ok(ModelSet {
		file: primary.to_owned(),
		primary: document,
		connections,
		submodels,
		animations,
	})
}

/// Decode `files` from `source` in parallel, naming each after `model` and
/// validating against `armature` when there is one.
fn load_animations(source: &dyn AssetSource, files: Vec<String>, model: &str, armature: Option<&Armature>) -> Vec<AnimationEntry> {
	files
		.into_par_iter()
		.map(|file| {
			let document = source.read(&file).and_then(|bytes| parse_animation(&bytes));
			let warnings = match (&document, armature) {
				(Ok(document), Some(armature)) => document.validate(armature),
				_ => Vec::new(),
			};
			if let Err(err) = &document {
				tracing::warn!("animation {file} failed: {err}");
			}
			for warning in &warnings {
				tracing::warn!("{file}: {warning}");
			}
			AnimationEntry {
				name: animation_name(model, &file),
				file,
				document,
				warnings,
			}
		})
		.collect()
}

#[cfg(test)]
mod tests;
