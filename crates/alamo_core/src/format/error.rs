use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, AlamoError>;

/// Errors that abort decoding of one `.alo` or `.ala` document.
#[derive(Debug, Error)]
pub enum AlamoError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("out of bounds at offset {at}, need {need} bytes, remaining {rem}")]
	OutOfBounds {
		/// Absolute byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available in the current window.
		rem: usize,
	},
	/// A seek would leave the cursor window.
	#[error("seek out of bounds from offset {at} to {target} (window length {len})")]
	SeekOutOfBounds {
		/// Absolute byte offset before the seek.
		at: usize,
		/// Requested window-relative target position.
		target: i64,
		/// Window length.
		len: usize,
	},
	/// Animation header is internally inconsistent.
	#[error("invalid animation header: {reason}")]
	InvalidHeader {
		/// Which consistency rule failed.
		reason: &'static str,
	},
	/// A recognized structure uses a layout version this decoder does not handle.
	#[error("unsupported {what} version (tag or size 0x{found:x}) at offset {at}")]
	UnsupportedVersion {
		/// Structure being decoded.
		what: &'static str,
		/// Offending tag or size value.
		found: u32,
		/// Absolute byte offset of the structure.
		at: usize,
	},
	/// The stream belongs to a sibling format that is not decoded.
	#[error("unsupported format: {what} chunk 0x{tag:x} at offset {at}")]
	UnsupportedFormat {
		/// Human-readable format name.
		what: &'static str,
		/// Chunk tag that identified the format.
		tag: u32,
		/// Absolute byte offset of the chunk.
		at: usize,
	},
	/// Length-prefixed string did not end with a NUL byte.
	#[error("string at offset {at} is missing its terminator")]
	MissingTerminator {
		/// Absolute byte offset of the string payload.
		at: usize,
	},
	/// Animation bone info chunk carried no name.
	#[error("bone info chunk at offset {at} has no name")]
	MissingBoneName {
		/// Absolute byte offset of the bone info chunk.
		at: usize,
	},
	/// Bone parent index points outside the bone table.
	#[error("bone {bone} has parent index {parent}, but the armature has {count} bones")]
	InvalidBoneParent {
		/// Bone index in file order.
		bone: usize,
		/// Stored parent index.
		parent: u32,
		/// Number of bones in the armature.
		count: usize,
	},
	/// Parent chain never reaches a root.
	#[error("bone {bone} is part of a parent cycle")]
	BoneCycle {
		/// First bone found on the cycle.
		bone: usize,
	},
	/// Visibility stream holds fewer bits than the animation has frames.
	#[error("visibility for bone {bone} has {bytes} bytes, need {need} for {frames} frames")]
	InvalidVisibility {
		/// Bone name the stream belongs to.
		bone: String,
		/// Stored byte count.
		bytes: usize,
		/// Required byte count.
		need: usize,
		/// Animation frame count.
		frames: u32,
	},
	/// A face index plus the submesh's vertex offset does not fit in 32 bits.
	#[error("face index at offset {at} overflows with vertex offset {vertex_offset}")]
	IndexOverflow {
		/// Absolute byte offset of the face record.
		at: usize,
		/// Running vertex offset of the submesh.
		vertex_offset: u32,
	},
	/// Asset source has no entry with the requested name.
	#[error("asset not found: {name}")]
	NotFound {
		/// Requested file name.
		name: String,
	},
}
