mod anim;
mod bytes;
mod chunk;
mod diag;
mod error;
mod job;
mod material;
mod model;
mod names;
mod submodel;
mod tags;

/// Animation document types and entry points.
pub use anim::{AnimationDocument, BoneTrack, StreamIndex, parse_animation};
/// Bounded little-endian byte cursor.
pub use bytes::Cursor;
/// Chunk framing primitives and the generic walker.
pub use chunk::{CONTAINER_FLAG, ChunkHeader, Dispatch, MiniChunk, WalkStats, mask_length, read_mini_chunks, walk_chunks};
/// Non-fatal diagnostics attached to decoded documents.
pub use diag::{Diagnostic, ValidationWarning};
/// Error and result aliases.
pub use error::{AlamoError, Result};
/// Multi-file job types and environment providers.
pub use job::{AnimationEntry, AssetSource, DirSource, ModelSet, SubmodelEntry, TextureDir, load_model_set};
/// Material catalog types.
pub use material::{Material, MaterialProperty, PropertyValue, ShaderProgram};
/// Model document types and entry points.
pub use model::{
	Armature, BillboardMode, Bone, BoneMatch, Connection, ConnectionCounts, ConnectionResolution, Light, LightKind, Mesh, ModelDocument, ModelOptions,
	NoTextures, ObjectRef, Proxy, ResolvedConnection, SpotCone, SubMesh, TextureLookup, Vertex, parse_model, parse_model_with, resolve_connections,
};
/// Name collision helpers.
pub use names::{MAX_NAME_LEN, NameSet, disambiguate, truncate_name};
/// Submodel and animation file discovery.
pub use submodel::{animation_name, resolve_animations, resolve_submodels};
/// Chunk dispatch enums.
pub use tags::{AnimationChunk, ModelChunk};
