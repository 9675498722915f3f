use thiserror::Error;

/// Recoverable condition recorded while decoding a document.
///
/// Diagnostics never abort a parse. Each one is also logged at `warn` level
/// when it is recorded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
	/// Shader name outside the catalog; the material falls back to `alDefault.fx`.
	#[error("mesh {mesh}: unknown shader {name}, using alDefault.fx")]
	UnknownShader {
		/// Owning mesh name.
		mesh: String,
		/// Stored shader name.
		name: String,
	},
	/// Material parameter name outside the property catalog; the value is dropped.
	#[error("mesh {mesh}: unknown material property {name}")]
	UnknownMaterialProperty {
		/// Owning mesh name.
		mesh: String,
		/// Stored parameter name.
		name: String,
	},
	/// Texture lookup did not find a referenced file.
	#[error("mesh {mesh}: texture {file} for {property} not found")]
	MissingTexture {
		/// Owning mesh name.
		mesh: String,
		/// Material property name.
		property: String,
		/// Texture file name after extension rewriting.
		file: String,
	},
	/// A second skeleton chunk was skipped.
	#[error("duplicate armature chunk at offset {at} skipped")]
	DuplicateArmature {
		/// Absolute offset of the skipped chunk.
		at: usize,
	},
	/// Skeleton header bone count differs from the bone chunks present.
	#[error("skeleton declares {declared} bones, found {found}")]
	BoneCountMismatch {
		/// Count stored in the skeleton header.
		declared: u32,
		/// Bone chunks decoded.
		found: usize,
	},
	/// Billboard mode value outside the known range; `Disable` is used.
	#[error("bone {bone}: invalid billboard mode {value}")]
	InvalidBillboardMode {
		/// Bone name.
		bone: String,
		/// Stored value.
		value: u32,
	},
	/// Light kind outside the known range; `Point` is used.
	#[error("light {light}: invalid light kind {value}")]
	InvalidLightKind {
		/// Light name.
		light: String,
		/// Stored value.
		value: u32,
	},
	/// Mesh info material count differs from the material slots present.
	#[error("mesh {mesh} declares {declared} materials, found {found}")]
	MaterialCountMismatch {
		/// Mesh name.
		mesh: String,
		/// Count stored in the mesh info chunk.
		declared: u32,
		/// Slots decoded.
		found: usize,
	},
	/// Skinned shader on a submesh without an animation mapping.
	#[error("mesh {mesh} slot {slot}: skinned shader without animation mapping")]
	MissingAnimationMapping {
		/// Mesh name.
		mesh: String,
		/// Material slot index.
		slot: usize,
	},
	/// Vertex bone index does not fit the submesh animation mapping.
	#[error("mesh {mesh} slot {slot}: vertex bone index {bone} outside mapping of {mapping_len}")]
	BoneIndexOutsideMapping {
		/// Mesh name.
		mesh: String,
		/// Material slot index.
		slot: usize,
		/// Offending vertex bone index.
		bone: u32,
		/// Mapping length.
		mapping_len: usize,
	},
	/// Connection record count differs from the connection chunk header.
	#[error("connections header declares {declared} objects and {declared_proxies} proxies, found {found} and {found_proxies}")]
	ConnectionCountMismatch {
		/// Declared object connections.
		declared: u32,
		/// Declared proxies.
		declared_proxies: u32,
		/// Decoded object connections.
		found: usize,
		/// Decoded proxies.
		found_proxies: usize,
	},
	/// Visibility chunk with no preceding bone info chunk.
	#[error("visibility chunk at offset {at} has no bone")]
	OrphanVisibility {
		/// Absolute offset of the chunk.
		at: usize,
	},
	/// Structural animation check failed.
	#[error(transparent)]
	Validation(#[from] ValidationWarning),
}

/// Animation cross-check failure. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationWarning {
	/// Track names a bone the skeleton does not have.
	#[error("animation bone {name} does not match the armature")]
	UnknownBone {
		/// Track bone name.
		name: String,
	},
	/// Packed rotation rows differ from the frame count.
	#[error("rotation data holds {found} rows, expected {expected}")]
	RotationRowCount {
		/// Decoded rows.
		found: usize,
		/// Frame count.
		expected: usize,
	},
	/// Packed translation rows differ from the frame count.
	#[error("translation data holds {found} rows, expected {expected}")]
	TranslationRowCount {
		/// Decoded rows.
		found: usize,
		/// Frame count.
		expected: usize,
	},
	/// Number of stream index records differs from the header bone count.
	#[error("{stream} index count {found} does not match bone count {expected}")]
	IndexCountMismatch {
		/// Stream kind.
		stream: &'static str,
		/// Index records decoded.
		found: usize,
		/// Header bone count.
		expected: u32,
	},
	/// Stream word offset points past the end of a packed row.
	#[error("bone {bone}: {stream} index {index} outside block of {block} words")]
	StreamIndexOutOfRange {
		/// Track bone name.
		bone: String,
		/// Stream kind.
		stream: &'static str,
		/// Stored word offset.
		index: u32,
		/// Block size in words.
		block: u32,
	},
}

/// Log `diagnostic` and append it to `out`.
pub(crate) fn record(out: &mut Vec<Diagnostic>, diagnostic: impl Into<Diagnostic>) {
	let diagnostic = diagnostic.into();
	tracing::warn!("{diagnostic}");
	out.push(diagnostic);
}
