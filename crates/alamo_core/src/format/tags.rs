//! Chunk tags of the `.alo` and `.ala` formats.

pub(crate) const SKELETON: u32 = 0x0200;
pub(crate) const SKELETON_HEADER: u32 = 0x0201;
pub(crate) const BONE: u32 = 0x0202;
pub(crate) const BONE_NAME: u32 = 0x0203;
pub(crate) const BONE_DATA_V1: u32 = 0x0205;
pub(crate) const BONE_DATA_V2: u32 = 0x0206;

pub(crate) const MESH: u32 = 0x0400;
pub(crate) const MESH_NAME: u32 = 0x0401;
pub(crate) const MESH_INFO: u32 = 0x0402;

pub(crate) const CONNECTIONS: u32 = 0x0600;
pub(crate) const CONNECTION_COUNTS: u32 = 0x0601;
pub(crate) const CONNECTION: u32 = 0x0602;
pub(crate) const PROXY: u32 = 0x0603;

pub(crate) const PARTICLE: u32 = 0x0900;

pub(crate) const LIGHT: u32 = 0x1300;
pub(crate) const LIGHT_NAME: u32 = 0x1301;
pub(crate) const LIGHT_DATA: u32 = 0x1302;

pub(crate) const SUBMESH_DATA: u32 = 0x0001_0000;
pub(crate) const SUBMESH_HEADER: u32 = 0x0001_0001;
pub(crate) const INDEX_BUFFER: u32 = 0x0001_0004;
pub(crate) const VERTEX_BUFFER_LEGACY: u32 = 0x0001_0005;
pub(crate) const ANIMATION_MAPPING: u32 = 0x0001_0006;
pub(crate) const VERTEX_BUFFER: u32 = 0x0001_0007;

pub(crate) const SUBMESH_MATERIAL: u32 = 0x0001_0100;
pub(crate) const SHADER_NAME: u32 = 0x0001_0101;
pub(crate) const PARAM_INT: u32 = 0x0001_0102;
pub(crate) const PARAM_FLOAT: u32 = 0x0001_0103;
pub(crate) const PARAM_FLOAT3: u32 = 0x0001_0104;
pub(crate) const PARAM_TEXTURE: u32 = 0x0001_0105;
pub(crate) const PARAM_FLOAT4: u32 = 0x0001_0106;

pub(crate) const ANIMATION: u32 = 0x1000;
pub(crate) const ANIMATION_HEADER: u32 = 0x1001;
pub(crate) const ANIMATION_BONES: u32 = 0x1002;
pub(crate) const BONE_ANIMATION: u32 = 0x1003;
pub(crate) const VISIBILITY: u32 = 0x1007;
pub(crate) const ROTATION_DATA: u32 = 0x1009;
pub(crate) const TRANSLATION_DATA: u32 = 0x100A;

/// Top-level chunk families of an `.alo` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChunk {
	/// Armature container.
	Skeleton,
	/// Mesh container.
	Mesh,
	/// Connection and proxy container.
	Connections,
	/// Light container.
	Light,
	/// Particle system container, a sibling format.
	Particle,
	/// Anything else; skipped by length.
	Other(u32),
}

impl ModelChunk {
	/// Classify a top-level tag.
	pub fn from_tag(tag: u32) -> Self {
		match tag {
			SKELETON => Self::Skeleton,
			MESH => Self::Mesh,
			CONNECTIONS => Self::Connections,
			LIGHT => Self::Light,
			PARTICLE => Self::Particle,
			other => Self::Other(other),
		}
	}
}

/// Chunks of an `.ala` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationChunk {
	/// Outer container (`0x1000`) or bone list container (`0x1002`).
	Container,
	/// Frame/bone counts and block sizes.
	Header,
	/// Per-bone track metadata.
	BoneInfo,
	/// Per-frame visibility bits for the preceding bone.
	Visibility,
	/// Packed quaternion rows.
	RotationData,
	/// Packed translation rows.
	TranslationData,
	/// Anything else; skipped by length.
	Other(u32),
}

impl AnimationChunk {
	/// Classify an animation tag.
	pub fn from_tag(tag: u32) -> Self {
		match tag {
			ANIMATION | ANIMATION_BONES => Self::Container,
			ANIMATION_HEADER => Self::Header,
			BONE_ANIMATION => Self::BoneInfo,
			VISIBILITY => Self::Visibility,
			ROTATION_DATA => Self::RotationData,
			TRANSLATION_DATA => Self::TranslationData,
			other => Self::Other(other),
		}
	}
}
