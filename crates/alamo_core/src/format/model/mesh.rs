use crate::format::chunk::read_chunk_string;
use crate::format::diag::record;
use crate::format::material::texture_file;
use crate::format::model::TextureLookup;
use crate::format::tags::{
	ANIMATION_MAPPING, INDEX_BUFFER, MESH_INFO, MESH_NAME, PARAM_FLOAT, PARAM_FLOAT3, PARAM_FLOAT4, PARAM_INT, PARAM_TEXTURE, SHADER_NAME, SUBMESH_DATA,
	SUBMESH_HEADER, SUBMESH_MATERIAL, VERTEX_BUFFER, VERTEX_BUFFER_LEGACY,
};
use crate::format::{AlamoError, Cursor, Diagnostic, Dispatch, Material, MaterialProperty, MiniChunk, PropertyValue, Result, ShaderProgram, read_mini_chunks, walk_chunks};

const VERTEX_STRIDE: usize = 144;
const LEGACY_VERTEX_STRIDE: usize = 128;

/// One decoded vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
	/// Object-space position.
	pub position: [f32; 3],
	/// Texture coordinate with V already flipped.
	pub uv: [f32; 2],
	/// Index into the submesh animation mapping.
	pub bone: u32,
}

/// Geometry and material of one material slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubMesh {
	/// Vertex count from the submesh header.
	pub vertex_count: u32,
	/// Face count from the submesh header.
	pub face_count: u32,
	/// Vertices in buffer order.
	pub vertices: Vec<Vertex>,
	/// Triangles indexing the whole mesh's concatenated vertex list.
	pub faces: Vec<[u32; 3]>,
	/// Slot material.
	pub material: Material,
	/// Remap from vertex bone index to skeleton bone index.
	pub animation_mapping: Vec<u32>,
}

impl SubMesh {
	/// Skeleton bone a vertex is skinned to, through the animation mapping.
	pub fn vertex_bone(&self, vertex: usize) -> Option<u32> {
		let local = self.vertices.get(vertex)?.bone;
		self.animation_mapping.get(local as usize).copied()
	}
}

/// A named mesh object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
	/// Unique object name.
	pub name: String,
	/// Hidden flag from the mesh info chunk.
	pub hidden: bool,
	/// Collision flag from the mesh info chunk.
	pub collision: bool,
	/// Bounding box minimum and maximum corners.
	pub bounds: [[f32; 3]; 2],
	/// Material slots in file order.
	pub submeshes: Vec<SubMesh>,
}

impl Mesh {
	/// Total vertices over all slots.
	pub fn vertex_count(&self) -> usize {
		self.submeshes.iter().map(|sub| sub.vertices.len()).sum()
	}

	/// Total faces over all slots.
	pub fn face_count(&self) -> usize {
		self.submeshes.iter().map(|sub| sub.faces.len()).sum()
	}

	/// Shader of the first slot, which decides helper meshes.
	pub fn primary_shader(&self) -> Option<ShaderProgram> {
		self.submeshes.first().map(|sub| sub.material.shader)
	}

	/// Return the level-of-detail number for names ending in `LOD<digit>`.
	pub fn lod(&self) -> Option<u32> {
		let stem = self.name.get(..self.name.len().checked_sub(1)?)?;
		if !stem.ends_with("LOD") {
			return None;
		}
		self.name.chars().last()?.to_digit(10)
	}
}

/// Per-mesh decoding state.
pub(crate) struct MeshReader<'t> {
	name: String,
	textures: &'t dyn TextureLookup,
	diagnostics: &'t mut Vec<Diagnostic>,
}

impl<'t> MeshReader<'t> {
	pub(crate) fn new(textures: &'t dyn TextureLookup, diagnostics: &'t mut Vec<Diagnostic>) -> Self {
		Self {
			name: String::new(),
			textures,
			diagnostics,
		}
	}

	/// Decode a mesh container. `object_name` maps the stored name to the final unique one.
	pub(crate) fn read(mut self, body: &mut Cursor<'_>, mut object_name: impl FnMut(&str) -> String) -> Result<Mesh> {
		let mut mesh = Mesh::default();
		let mut declared = None;
		let mut pending = None;
		let mut vertex_offset = 0_u32;
		let mut named = false;

		walk_chunks(body, |header, chunk| {
			match header.tag {
				MESH_NAME if !named => {
					self.name = object_name(&read_chunk_string(chunk)?);
					named = true;
				}
				MESH_INFO => {
					declared = Some(chunk.read_u32_le()?);
					mesh.bounds = [chunk.read_vec3()?, chunk.read_vec3()?];
					chunk.skip(4)?;
					mesh.hidden = chunk.read_u32_le()? == 1;
					mesh.collision = chunk.read_u32_le()? == 1;
				}
				SUBMESH_MATERIAL => {
					if let Some(material) = pending.replace(self.material(chunk)?) {
						mesh.submeshes.push(SubMesh { material, ..SubMesh::default() });
					}
				}
				SUBMESH_DATA => {
					let mut sub = SubMesh {
						material: pending.take().unwrap_or_default(),
						..SubMesh::default()
					};
					read_geometry(chunk, &mut sub, vertex_offset)?;
					// Offset by vertices actually read; the header count is untrusted.
					let read = u32::try_from(sub.vertices.len()).unwrap_or(u32::MAX);
					vertex_offset = vertex_offset.saturating_add(read);
					mesh.submeshes.push(sub);
				}
				_ => return Ok(Dispatch::Skip),
			}
			Ok(Dispatch::Handled)
		})?;

		if let Some(material) = pending {
			mesh.submeshes.push(SubMesh { material, ..SubMesh::default() });
		}
		if !named {
			self.name = object_name("");
		}
		mesh.name = self.name.clone();

		if let Some(declared) = declared {
			if declared as usize != mesh.submeshes.len() {
				record(
					self.diagnostics,
					Diagnostic::MaterialCountMismatch {
						mesh: mesh.name.clone(),
						declared,
						found: mesh.submeshes.len(),
					},
				);
			}
		}

		for (slot, sub) in mesh.submeshes.iter().enumerate() {
			self.check_skinning(slot, sub);
		}

		Ok(mesh)
	}

	fn material(&mut self, body: &mut Cursor<'_>) -> Result<Material> {
		let mut material = Material::default();

		walk_chunks(body, |header, chunk| {
			if header.tag == SHADER_NAME {
				let stored = read_chunk_string(chunk)?;
				material.shader = match ShaderProgram::from_name(&stored) {
					Some(shader) => shader,
					None => {
						record(
							self.diagnostics,
							Diagnostic::UnknownShader {
								mesh: self.name.clone(),
								name: stored,
							},
						);
						ShaderProgram::Default
					}
				};
				return Ok(Dispatch::Handled);
			}

			if !matches!(header.tag, PARAM_INT | PARAM_FLOAT | PARAM_FLOAT3 | PARAM_FLOAT4 | PARAM_TEXTURE) {
				return Ok(Dispatch::Skip);
			}

			let minis = read_mini_chunks(chunk)?;
			let (Some(key), Some(value)) = (mini(&minis, 1), mini(&minis, 2)) else {
				tracing::debug!(offset = header.offset, "material parameter without name or value");
				return Ok(Dispatch::Handled);
			};
			let key = key.string()?;

			let value = match header.tag {
				PARAM_INT => PropertyValue::Int(value.i32()?),
				PARAM_FLOAT => PropertyValue::Float(value.f32()?),
				PARAM_FLOAT3 => PropertyValue::Float3(value.vec3()?),
				PARAM_FLOAT4 => PropertyValue::Float4(value.vec4()?),
				_ => {
					let file = texture_file(&value.string()?);
					if let Some(file) = &file {
						if !self.textures.exists(file) {
							record(
								self.diagnostics,
								Diagnostic::MissingTexture {
									mesh: self.name.clone(),
									property: key.clone(),
									file: file.clone(),
								},
							);
						}
					}
					PropertyValue::Texture(file)
				}
			};

			match MaterialProperty::from_name(&key) {
				Some(property) => {
					material.properties.insert(property, value);
				}
				None => record(
					self.diagnostics,
					Diagnostic::UnknownMaterialProperty {
						mesh: self.name.clone(),
						name: key,
					},
				),
			}
			Ok(Dispatch::Handled)
		})?;

		Ok(material)
	}

	fn check_skinning(&mut self, slot: usize, sub: &SubMesh) {
		if sub.animation_mapping.is_empty() {
			if sub.material.shader.is_skinned() {
				record(
					self.diagnostics,
					Diagnostic::MissingAnimationMapping {
						mesh: self.name.clone(),
						slot,
					},
				);
			}
			return;
		}

		let mapping_len = sub.animation_mapping.len();
		if let Some(vertex) = sub.vertices.iter().find(|vertex| vertex.bone as usize >= mapping_len) {
			record(
				self.diagnostics,
				Diagnostic::BoneIndexOutsideMapping {
					mesh: self.name.clone(),
					slot,
					bone: vertex.bone,
					mapping_len,
				},
			);
		}
	}
}

fn read_geometry(body: &mut Cursor<'_>, sub: &mut SubMesh, vertex_offset: u32) -> Result<()> {
	walk_chunks(body, |header, chunk| {
		match header.tag {
			SUBMESH_HEADER => {
				sub.vertex_count = chunk.read_u32_le()?;
				sub.face_count = chunk.read_u32_le()?;
			}
			VERTEX_BUFFER | VERTEX_BUFFER_LEGACY => {
				let stride = if header.tag == VERTEX_BUFFER { VERTEX_STRIDE } else { LEGACY_VERTEX_STRIDE };
				sub.vertices = read_vertices(chunk, sub.vertex_count as usize, stride)?;
			}
			INDEX_BUFFER => {
				let count = sub.face_count as usize;
				let mut faces = Vec::with_capacity(count.min(chunk.remaining() / 6));
				for _ in 0..count {
					let at = chunk.offset();
					let mut face = [0_u32; 3];
					for corner in &mut face {
						let index = u32::from(chunk.read_u16_le()?);
						*corner = index.checked_add(vertex_offset).ok_or(AlamoError::IndexOverflow { at, vertex_offset })?;
					}
					faces.push(face);
				}
				sub.faces = faces;
			}
			ANIMATION_MAPPING => {
				let mut mapping = Vec::with_capacity(chunk.remaining() / 4);
				while chunk.remaining() >= 4 {
					mapping.push(chunk.read_u32_le()?);
				}
				sub.animation_mapping = mapping;
			}
			_ => return Ok(Dispatch::Skip),
		}
		Ok(Dispatch::Handled)
	})?;
	Ok(())
}

fn mini<'a, 'b>(minis: &'b [MiniChunk<'a>], id: u8) -> Option<&'b MiniChunk<'a>> {
	minis.iter().find(|mini| mini.id == id)
}

fn read_vertices(body: &mut Cursor<'_>, count: usize, stride: usize) -> Result<Vec<Vertex>> {
	let mut vertices = Vec::with_capacity(count.min(body.remaining() / stride));
	for _ in 0..count {
		let mut entry = body.sub_cursor(stride)?;
		let position = entry.read_vec3()?;
		entry.skip(12)?;
		let u = entry.read_f32_le()?;
		let v = entry.read_f32_le()?;
		entry.skip(64)?;
		if stride == VERTEX_STRIDE {
			entry.skip(16)?;
		}
		let bone = entry.read_u32_le()?;
		vertices.push(Vertex { position, uv: [u, -v], bone });
	}
	Ok(vertices)
}
