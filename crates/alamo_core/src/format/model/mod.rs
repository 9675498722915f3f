//! Static model (`.alo`) decoding.

mod armature;
mod connection;
mod light;
mod mesh;

pub use armature::{Armature, BillboardMode, Bone};
pub use connection::{BoneMatch, Connection, ConnectionCounts, ConnectionResolution, Proxy, ResolvedConnection, resolve_connections};
pub use light::{Light, LightKind, SpotCone};
pub use mesh::{Mesh, SubMesh, Vertex};

use crate::format::diag::record;
use crate::format::names::{NameSet, truncate_name};
use crate::format::tags::ModelChunk;
use crate::format::{AlamoError, Cursor, Diagnostic, Dispatch, Result, walk_chunks};

use mesh::MeshReader;

/// Answers whether a texture file is available to the consumer.
pub trait TextureLookup: Sync {
	/// Return `true` when `file` (already rewritten to `.dds`) exists.
	fn exists(&self, file: &str) -> bool;
}

/// Lookup that reports every texture as present, disabling `MissingTexture` diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTextures;

impl TextureLookup for NoTextures {
	fn exists(&self, _file: &str) -> bool {
		true
	}
}

/// Per-document decode options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelOptions {
	/// Zero-based submodel number, or `None` for the primary model.
	pub submodel: Option<usize>,
}

impl ModelOptions {
	/// Options for the primary model, which owns the armature.
	pub fn primary() -> Self {
		Self { submodel: None }
	}

	/// Options for submodel `index`: mesh names get a `sub<index>_` prefix and
	/// the armature chunk is skipped.
	pub fn submodel(index: usize) -> Self {
		Self { submodel: Some(index) }
	}
}

/// Entry of the shared mesh/light object index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef {
	/// Index into [`ModelDocument::meshes`].
	Mesh(usize),
	/// Index into [`ModelDocument::lights`].
	Light(usize),
}

/// Decoded `.alo` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDocument {
	/// Skeleton; only decoded for primary models.
	pub armature: Option<Armature>,
	/// The file carried a skeleton chunk, decoded or not.
	pub armature_present: bool,
	/// Mesh objects in file order.
	pub meshes: Vec<Mesh>,
	/// Light objects in file order.
	pub lights: Vec<Light>,
	/// Meshes and lights in the order connections index them.
	pub objects: Vec<ObjectRef>,
	/// Connections header, when present.
	pub connection_counts: Option<ConnectionCounts>,
	/// Object-to-bone attachments.
	pub connections: Vec<Connection>,
	/// Bone attachment points.
	pub proxies: Vec<Proxy>,
	/// Recoverable problems met while decoding.
	pub diagnostics: Vec<Diagnostic>,
	/// Submodel number this document was decoded as.
	pub submodel: Option<usize>,
}

impl ModelDocument {
	/// Return `true` when decoded with [`ModelOptions::submodel`].
	pub fn is_submodel(&self) -> bool {
		self.submodel.is_some()
	}

	/// Name of an object in the shared index space.
	pub fn object_name(&self, index: usize) -> Option<&str> {
		match *self.objects.get(index)? {
			ObjectRef::Mesh(mesh) => self.meshes.get(mesh).map(|mesh| mesh.name.as_str()),
			ObjectRef::Light(light) => self.lights.get(light).map(|light| light.name.as_str()),
		}
	}

	/// Per-mesh initial visibility a viewer should use.
	///
	/// Hidden are: meshes flagged hidden, shadow and collision helpers, names
	/// containing `blast`, and every `LOD<n>` level below the highest one of
	/// its family.
	pub fn hidden_by_default(&self) -> Vec<bool> {
		self.meshes
			.iter()
			.map(|mesh| {
				mesh.hidden
					|| mesh.primary_shader().is_some_and(|shader| shader.is_helper())
					|| mesh.name.to_lowercase().contains("blast")
					|| self.is_lower_lod(mesh)
			})
			.collect()
	}

	fn is_lower_lod(&self, mesh: &Mesh) -> bool {
		let Some(level) = mesh.lod() else {
			return false;
		};
		let family = &mesh.name[..mesh.name.len() - 1];
		let mut highest = 0;
		while self.meshes.iter().any(|other| other.name == format!("{family}{highest}")) {
			highest += 1;
		}
		level + 1 < highest
	}
}

/// Decode a primary model without texture checks.
pub fn parse_model(bytes: &[u8]) -> Result<ModelDocument> {
	parse_model_with(bytes, &ModelOptions::primary(), &NoTextures)
}

/// Decode a model with explicit options and texture lookup.
pub fn parse_model_with(bytes: &[u8], options: &ModelOptions, textures: &dyn TextureLookup) -> Result<ModelDocument> {
	let mut doc = ModelDocument {
		submodel: options.submodel,
		..ModelDocument::default()
	};
	let mut objects = NameSet::new();
	let mut cursor = Cursor::new(bytes);

	let stats = walk_chunks(&mut cursor, |header, body| {
		match ModelChunk::from_tag(header.tag) {
			ModelChunk::Skeleton => {
				if doc.armature_present {
					record(&mut doc.diagnostics, Diagnostic::DuplicateArmature { at: header.offset });
					return Ok(Dispatch::Skip);
				}
				doc.armature_present = true;
				if options.submodel.is_some() {
					return Ok(Dispatch::Skip);
				}
				doc.armature = Some(armature::parse_skeleton(body, &mut doc.diagnostics)?);
			}
			ModelChunk::Mesh => {
				let prefix = options.submodel;
				let mesh = MeshReader::new(textures, &mut doc.diagnostics).read(body, |stored| {
					let name = match prefix {
						Some(index) => format!("sub{index}_{stored}"),
						None => stored.to_owned(),
					};
					objects.claim(&truncate_name(&name))
				})?;
				doc.objects.push(ObjectRef::Mesh(doc.meshes.len()));
				doc.meshes.push(mesh);
			}
			ModelChunk::Light => {
				let light = light::parse_light(body, |stored| objects.claim(&truncate_name(stored)), &mut doc.diagnostics)?;
				doc.objects.push(ObjectRef::Light(doc.lights.len()));
				doc.lights.push(light);
			}
			ModelChunk::Connections => {
				let chunk = connection::parse_connections(body, &mut doc.diagnostics)?;
				if chunk.counts.is_some() {
					doc.connection_counts = chunk.counts;
				}
				doc.connections.extend(chunk.connections);
				doc.proxies.extend(chunk.proxies);
			}
			ModelChunk::Particle => {
				return Err(AlamoError::UnsupportedFormat {
					what: "particle system",
					tag: header.tag,
					at: header.offset,
				});
			}
			ModelChunk::Other(_) => return Ok(Dispatch::Skip),
		}
		Ok(Dispatch::Handled)
	})?;

	tracing::debug!(
		meshes = doc.meshes.len(),
		lights = doc.lights.len(),
		skipped = stats.skipped,
		diagnostics = doc.diagnostics.len(),
		"decoded model"
	);
	Ok(doc)
}

#[cfg(test)]
mod tests;
