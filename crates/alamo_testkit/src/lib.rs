//! Shared test helpers for workspace crates.
//!
//! The builders here emit synthetic `.alo` / `.ala` chunk streams so tests do
//! not depend on game assets.

use std::path::{Path, PathBuf};

/// High bit set on the length of container chunks.
pub const CONTAINER_FLAG: u32 = 0x8000_0000;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Append-only chunk stream builder.
#[derive(Debug, Default, Clone)]
pub struct ChunkWriter {
	buf: Vec<u8>,
}

impl ChunkWriter {
	/// Create an empty stream.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a data chunk.
	pub fn chunk(&mut self, tag: u32, payload: &[u8]) -> &mut Self {
		self.header(tag, payload.len(), false);
		self.buf.extend_from_slice(payload);
		self
	}

	/// Append a container chunk whose children are written by `fill`.
	pub fn container(&mut self, tag: u32, fill: impl FnOnce(&mut ChunkWriter)) -> &mut Self {
		let mut inner = ChunkWriter::new();
		fill(&mut inner);
		self.header(tag, inner.buf.len(), true);
		self.buf.extend_from_slice(&inner.buf);
		self
	}

	/// Append a data chunk holding one NUL-terminated string.
	pub fn string(&mut self, tag: u32, text: &str) -> &mut Self {
		self.chunk(tag, &c_string(text))
	}

	/// Append raw bytes without framing.
	pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
		self.buf.extend_from_slice(bytes);
		self
	}

	/// Borrow the bytes written so far.
	pub fn as_bytes(&self) -> &[u8] {
		&self.buf
	}

	/// Consume the builder and return the stream.
	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}

	fn header(&mut self, tag: u32, len: usize, container: bool) {
		let mut raw = u32::try_from(len).expect("chunk length fits in u32");
		if container {
			raw |= CONTAINER_FLAG;
		}
		self.buf.extend_from_slice(&tag.to_le_bytes());
		self.buf.extend_from_slice(&raw.to_le_bytes());
	}
}

/// Mini-chunk record builder for data chunk payloads.
#[derive(Debug, Default, Clone)]
pub struct MiniWriter {
	buf: Vec<u8>,
}

impl MiniWriter {
	/// Create an empty payload.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a record with raw payload bytes.
	pub fn raw(&mut self, id: u8, payload: &[u8]) -> &mut Self {
		self.buf.push(id);
		self.buf.push(u8::try_from(payload.len()).expect("mini-chunk payload fits in u8"));
		self.buf.extend_from_slice(payload);
		self
	}

	/// Append a `u32` record.
	pub fn u32(&mut self, id: u8, value: u32) -> &mut Self {
		self.raw(id, &value.to_le_bytes())
	}

	/// Append an `i32` record.
	pub fn i32(&mut self, id: u8, value: i32) -> &mut Self {
		self.raw(id, &value.to_le_bytes())
	}

	/// Append an `i16` record.
	pub fn i16(&mut self, id: u8, value: i16) -> &mut Self {
		self.raw(id, &value.to_le_bytes())
	}

	/// Append an `f32` record.
	pub fn f32(&mut self, id: u8, value: f32) -> &mut Self {
		self.raw(id, &value.to_le_bytes())
	}

	/// Append a three-float record.
	pub fn vec3(&mut self, id: u8, value: [f32; 3]) -> &mut Self {
		self.raw(id, &f32s(&value))
	}

	/// Append a four-float record.
	pub fn vec4(&mut self, id: u8, value: [f32; 4]) -> &mut Self {
		self.raw(id, &f32s(&value))
	}

	/// Append a NUL-terminated string record.
	pub fn string(&mut self, id: u8, text: &str) -> &mut Self {
		self.raw(id, &c_string(text))
	}

	/// Consume the builder and return the payload.
	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}
}

/// Encode `text` followed by a NUL byte.
pub fn c_string(text: &str) -> Vec<u8> {
	let mut out = text.as_bytes().to_vec();
	out.push(0);
	out
}

/// Concatenate little-endian `f32` values.
pub fn f32s(values: &[f32]) -> Vec<u8> {
	values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Concatenate little-endian `u32` values.
pub fn u32s(values: &[u32]) -> Vec<u8> {
	values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Concatenate little-endian `u16` values.
pub fn u16s(values: &[u16]) -> Vec<u8> {
	values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Quantize a unit-range component to the packed rotation encoding.
pub fn quantize(value: f32) -> i16 {
	(value.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

/// Bone record for [`skeleton`].
#[derive(Debug, Clone)]
pub struct BoneSpec {
	/// Bone name.
	pub name: String,
	/// Stored parent index; `u32::MAX` for none.
	pub parent: u32,
	/// Stored visibility flag.
	pub visible: u32,
	/// Billboard mode, written with the v2 data layout when present.
	pub billboard: Option<u32>,
	/// Row-major 3x4 matrix.
	pub matrix: [f32; 12],
}

impl BoneSpec {
	/// Visible identity-transform bone in the v2 layout.
	pub fn new(name: &str, parent: u32) -> Self {
		Self {
			name: name.to_owned(),
			parent,
			visible: 1,
			billboard: Some(0),
			matrix: [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
		}
	}
}

/// Write a skeleton container (`0x200`) for `bones`.
pub fn skeleton(out: &mut ChunkWriter, bones: &[BoneSpec]) {
	out.container(0x200, |skel| {
		let mut header = u32s(&[u32::try_from(bones.len()).expect("bone count")]);
		header.resize(128, 0);
		skel.chunk(0x201, &header);
		for bone in bones {
			skel.container(0x202, |entry| {
				entry.string(0x203, &bone.name);
				let mut data = u32s(&[bone.parent, bone.visible]);
				let tag = match bone.billboard {
					Some(mode) => {
						data.extend_from_slice(&mode.to_le_bytes());
						0x206
					}
					None => 0x205,
				};
				data.extend_from_slice(&f32s(&bone.matrix));
				entry.chunk(tag, &data);
			});
		}
	});
}

/// One vertex for [`submesh`].
#[derive(Debug, Clone, Copy)]
pub struct VertexSpec {
	/// Position.
	pub pos: [f32; 3],
	/// Texture coordinate as stored.
	pub uv: [f32; 2],
	/// Skinning bone index.
	pub bone: u32,
}

/// Encode one vertex record; `legacy` selects the 128-byte layout.
pub fn vertex_record(vertex: &VertexSpec, legacy: bool) -> Vec<u8> {
	let mut out = f32s(&vertex.pos);
	out.extend_from_slice(&[0; 12]);
	out.extend_from_slice(&f32s(&vertex.uv));
	out.extend_from_slice(&[0; 64]);
	if !legacy {
		out.extend_from_slice(&[0; 16]);
	}
	out.extend_from_slice(&vertex.bone.to_le_bytes());
	out.extend_from_slice(&[0; 28]);
	out
}

/// Submesh slot for [`mesh`].
#[derive(Debug, Clone, Default)]
pub struct SubmeshSpec {
	/// Shader file name.
	pub shader: String,
	/// Texture parameters as `(property, file)` pairs.
	pub textures: Vec<(String, String)>,
	/// Float parameters as `(property, value)` pairs.
	pub floats: Vec<(String, f32)>,
	/// Vertices.
	pub vertices: Vec<VertexSpec>,
	/// Faces as local vertex indices.
	pub faces: Vec<[u16; 3]>,
	/// Animation mapping, written when present.
	pub mapping: Option<Vec<u32>>,
	/// Use the 128-byte vertex layout.
	pub legacy: bool,
}

impl SubmeshSpec {
	/// Slot with `n` vertices on a line and a triangle fan over them.
	pub fn fan(shader: &str, n: usize) -> Self {
		let vertices = (0..n)
			.map(|i| VertexSpec {
				pos: [i as f32, 0.0, 0.0],
				uv: [0.0, 0.25],
				bone: 0,
			})
			.collect();
		let faces = (1..n.saturating_sub(1))
			.map(|i| [0, u16::try_from(i).expect("index"), u16::try_from(i + 1).expect("index")])
			.collect();
		Self {
			shader: shader.to_owned(),
			vertices,
			faces,
			..Self::default()
		}
	}
}

/// Mesh header flags for [`mesh`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshFlags {
	/// Hidden flag.
	pub hidden: bool,
	/// Collision flag.
	pub collision: bool,
}

/// Write a mesh container (`0x400`).
pub fn mesh(out: &mut ChunkWriter, name: &str, flags: MeshFlags, slots: &[SubmeshSpec]) {
	out.container(0x400, |mesh| {
		mesh.string(0x401, name);
		let mut info = u32s(&[u32::try_from(slots.len()).expect("slot count")]);
		info.extend_from_slice(&f32s(&[-1.0, -1.0, -1.0, 1.0, 1.0, 1.0]));
		info.extend_from_slice(&[0; 4]);
		info.extend_from_slice(&u32s(&[u32::from(flags.hidden), u32::from(flags.collision)]));
		info.resize(128, 0);
		mesh.chunk(0x402, &info);

		for slot in slots {
			mesh.container(0x10100, |material| {
				material.string(0x10101, &slot.shader);
				for (property, value) in &slot.floats {
					let mut params = MiniWriter::new();
					params.string(1, property).f32(2, *value);
					material.chunk(0x10103, &params.into_bytes());
				}
				for (property, file) in &slot.textures {
					let mut params = MiniWriter::new();
					params.string(1, property).string(2, file);
					material.chunk(0x10105, &params.into_bytes());
				}
			});
			mesh.container(0x10000, |data| {
				let mut header = u32s(&[
					u32::try_from(slot.vertices.len()).expect("vertex count"),
					u32::try_from(slot.faces.len()).expect("face count"),
				]);
				header.resize(128, 0);
				data.chunk(0x10001, &header);

				let mut vertices = Vec::new();
				for vertex in &slot.vertices {
					vertices.extend_from_slice(&vertex_record(vertex, slot.legacy));
				}
				data.chunk(if slot.legacy { 0x10005 } else { 0x10007 }, &vertices);

				let indices: Vec<u16> = slot.faces.iter().flatten().copied().collect();
				data.chunk(0x10004, &u16s(&indices));

				if let Some(mapping) = &slot.mapping {
					data.chunk(0x10006, &u32s(mapping));
				}
			});
		}
	});
}

/// Proxy record for [`connections`].
#[derive(Debug, Clone)]
pub struct ProxySpec {
	/// Proxy name.
	pub name: String,
	/// Bone index.
	pub bone: u32,
	/// Hidden flag.
	pub hidden: bool,
	/// Alt-decrease-stay-hidden flag; written only when set.
	pub alt_decrease_stay_hidden: bool,
}

/// Write a connections container (`0x600`).
pub fn connections(out: &mut ChunkWriter, links: &[(u32, u32)], proxies: &[ProxySpec]) {
	out.container(0x600, |conn| {
		let mut counts = MiniWriter::new();
		counts
			.u32(1, u32::try_from(links.len()).expect("connection count"))
			.u32(4, u32::try_from(proxies.len()).expect("proxy count"));
		conn.chunk(0x601, &counts.into_bytes());
		for (object, bone) in links {
			let mut link = MiniWriter::new();
			link.u32(2, *object).u32(3, *bone);
			conn.chunk(0x602, &link.into_bytes());
		}
		for proxy in proxies {
			let mut record = MiniWriter::new();
			record.string(1, &proxy.name).u32(2, proxy.bone).u32(7, u32::from(proxy.hidden));
			if proxy.alt_decrease_stay_hidden {
				record.u32(8, 1);
			}
			conn.chunk(0x603, &record.into_bytes());
		}
	});
}

/// Light record for [`light`].
#[derive(Debug, Clone, Copy)]
pub struct LightSpec<'a> {
	/// Light name.
	pub name: &'a str,
	/// Stored kind: 0 point, 1 sun, 2 spot.
	pub kind: u32,
	/// RGB color.
	pub color: [f32; 3],
	/// Intensity.
	pub energy: f32,
	/// Far attenuation end distance.
	pub far_end: f32,
	/// Spot hotspot angle.
	pub hotspot: f32,
	/// Spot falloff angle.
	pub falloff: f32,
}

/// Write a light container (`0x1300`).
pub fn light(out: &mut ChunkWriter, spec: &LightSpec<'_>) {
	out.container(0x1300, |light| {
		light.string(0x1301, spec.name);
		let mut data = u32s(&[spec.kind]);
		data.extend_from_slice(&f32s(&spec.color));
		data.extend_from_slice(&f32s(&[spec.energy, spec.far_end, 0.0, spec.hotspot, spec.falloff]));
		light.chunk(0x1302, &data);
	});
}

/// Animation header values for [`animation`].
#[derive(Debug, Clone, Copy)]
pub struct AnimHeader {
	/// Frame count.
	pub frames: u32,
	/// Frames per second.
	pub fps: f32,
	/// Bone count.
	pub bones: u32,
	/// Rotation block size in 16-bit words.
	pub rotation_block: u32,
	/// Translation block size in 16-bit words.
	pub translation_block: u32,
	/// Scale block size in 16-bit words.
	pub scale_block: u32,
}

/// Encode the 36-byte animation header payload.
pub fn anim_header(header: &AnimHeader) -> Vec<u8> {
	let mut minis = MiniWriter::new();
	minis
		.u32(1, header.frames)
		.f32(2, header.fps)
		.u32(3, header.bones)
		.u32(11, header.rotation_block)
		.u32(12, header.translation_block)
		.u32(13, header.scale_block);
	minis.into_bytes()
}

/// Per-bone track record for [`animation`].
#[derive(Debug, Clone)]
pub struct TrackSpec {
	/// Bone name.
	pub name: String,
	/// Bone index.
	pub bone_index: i32,
	/// Translation offset.
	pub translation_offset: [f32; 3],
	/// Translation scale.
	pub translation_scale: [f32; 3],
	/// Rotation stream word offset; -1 for static.
	pub rotation_index: i16,
	/// Translation stream word offset; -1 for static.
	pub translation_index: i16,
	/// Default rotation `[x, y, z, w]`.
	pub default_rotation: [f32; 4],
	/// Visibility bytes, written after the track when present.
	pub visibility: Option<Vec<u8>>,
}

impl TrackSpec {
	/// Fully static track with identity default rotation.
	pub fn fixed(name: &str, bone_index: i32) -> Self {
		Self {
			name: name.to_owned(),
			bone_index,
			translation_offset: [0.0; 3],
			translation_scale: [0.0; 3],
			rotation_index: -1,
			translation_index: -1,
			default_rotation: [0.0, 0.0, 0.0, 1.0],
			visibility: None,
		}
	}
}

/// Encode one bone info payload (`0x1003`).
pub fn track_info(track: &TrackSpec) -> Vec<u8> {
	let rotation: Vec<u8> = track
		.default_rotation
		.iter()
		.flat_map(|value| quantize(*value).to_le_bytes())
		.collect();
	let mut minis = MiniWriter::new();
	minis
		.string(4, &track.name)
		.i32(5, track.bone_index)
		.vec3(6, track.translation_offset)
		.vec3(7, track.translation_scale)
		.vec3(8, [0.0; 3])
		.vec3(9, [0.0; 3])
		.i16(14, track.translation_index)
		.i16(15, -1)
		.i16(16, track.rotation_index)
		.raw(17, &rotation);
	minis.into_bytes()
}

/// Write a complete animation stream.
///
/// `rotations` and `translations` are the raw packed rows, already flattened
/// into 16-bit words.
pub fn animation(header: &AnimHeader, tracks: &[TrackSpec], rotations: &[i16], translations: &[u16]) -> Vec<u8> {
	let mut out = ChunkWriter::new();
	out.container(0x1000, |root| {
		root.chunk(0x1001, &anim_header(header));
		root.container(0x1002, |list| {
			for track in tracks {
				list.chunk(0x1003, &track_info(track));
				if let Some(bits) = &track.visibility {
					list.chunk(0x1007, bits);
				}
			}
		});
		if header.rotation_block > 0 {
			let words: Vec<u8> = rotations.iter().flat_map(|word| word.to_le_bytes()).collect();
			root.chunk(0x1009, &words);
		}
		if header.translation_block > 0 {
			root.chunk(0x100A, &u16s(translations));
		}
	});
	out.into_bytes()
}

/// Small rigged model: `Root` and `Turret` bones, a hull mesh on the root,
/// a turret mesh on `Turret`, a proxy and a point light.
pub fn sample_model() -> Vec<u8> {
	let mut out = ChunkWriter::new();
	skeleton(&mut out, &[BoneSpec::new("Root", u32::MAX), BoneSpec::new("Turret", 0)]);

	let mut hull = SubmeshSpec::fan("MeshGloss.fx", 4);
	hull.textures.push(("BaseTexture".to_owned(), "hull.tga".to_owned()));
	hull.floats.push(("Shininess".to_owned(), 16.0));
	mesh(&mut out, "Hull", MeshFlags::default(), &[hull]);

	let turret = SubmeshSpec::fan("MeshAlpha.fx", 3);
	mesh(&mut out, "Turret", MeshFlags::default(), &[turret]);

	light(
		&mut out,
		&LightSpec {
			name: "Lamp",
			kind: 0,
			color: [1.0, 0.9, 0.8],
			energy: 2.0,
			far_end: 20.0,
			hotspot: 0.0,
			falloff: 0.0,
		},
	);

	connections(
		&mut out,
		&[(0, 0), (1, 1), (2, 0)],
		&[ProxySpec {
			name: "Muzzle".to_owned(),
			bone: 1,
			hidden: false,
			alt_decrease_stay_hidden: false,
		}],
	);
	out.into_bytes()
}

/// Two-frame animation for [`sample_model`]: `Turret` rotates, `Root` is static.
pub fn sample_animation() -> Vec<u8> {
	let header = AnimHeader {
		frames: 2,
		fps: 15.0,
		bones: 2,
		rotation_block: 4,
		translation_block: 0,
		scale_block: 0,
	};
	let root = TrackSpec::fixed("Root", 0);
	let mut turret = TrackSpec::fixed("Turret", 1);
	turret.rotation_index = 0;
	turret.visibility = Some(vec![0b1000_0000]);
	let half = quantize(std::f32::consts::FRAC_1_SQRT_2);
	let rotations = [0, 0, 0, 32767, 0, 0, half, half];
	animation(&header, &[root, turret], &rotations, &[])
}
