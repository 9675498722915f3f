//! Animation (`.ala`) decoding.
//!
//! Rotations are stored as rows of quantized quaternions, one row per frame,
//! and translations as rows of unsigned 16-bit triples scaled and offset per
//! bone. A bone whose stream index is the `-1` sentinel has no per-frame track
//! and uses its static value instead.

mod packed;

use crate::format::diag::record;
use crate::format::names::{NameSet, truncate_name};
use crate::format::tags::AnimationChunk;
use crate::format::{
	AlamoError, Armature, ChunkHeader, Cursor, Diagnostic, Dispatch, Result, ValidationWarning, read_mini_chunks, walk_chunks,
};

use packed::{dequantize, rotation_rows, translation_rows, visibility_bits};

/// Exact payload size of the animation header chunk.
const HEADER_LEN: usize = 36;

/// Per-frame stream selector of one bone channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamIndex {
	/// No per-frame data; the static value applies to every frame.
	#[default]
	Static,
	/// Word offset of the bone's data inside each packed row.
	Track(u32),
}

impl StreamIndex {
	/// Decode a stored index; negative values are the static sentinel.
	pub fn from_raw(raw: i32) -> Self {
		match u32::try_from(raw) {
			Ok(index) => Self::Track(index),
			Err(_) => Self::Static,
		}
	}

	/// Word offset, if the channel is tracked.
	pub fn track(self) -> Option<u32> {
		match self {
			Self::Static => None,
			Self::Track(index) => Some(index),
		}
	}
}

/// Animation channels of one bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTrack {
	/// Bone name, unique within the animation.
	pub name: String,
	/// Stored bone index.
	pub bone_index: i32,
	/// Translation added after scaling.
	pub translation_offset: [f32; 3],
	/// Per-axis translation scale.
	pub translation_scale: [f32; 3],
	/// Scale added after scaling.
	pub scale_offset: [f32; 3],
	/// Per-axis scale factor.
	pub scale_scale: [f32; 3],
	/// Rotation stream.
	pub rotation: StreamIndex,
	/// Translation stream.
	pub translation: StreamIndex,
	/// Scale stream.
	pub scale: StreamIndex,
	/// Rest rotation `[x, y, z, w]`, used when the rotation stream is static.
	pub default_rotation: [f32; 4],
	/// One flag per frame, when the bone has a visibility stream.
	pub visibility: Option<Vec<bool>>,
}

impl BoneTrack {
	fn new(name: String) -> Self {
		Self {
			name,
			bone_index: 0,
			translation_offset: [0.0; 3],
			translation_scale: [0.0; 3],
			scale_offset: [0.0; 3],
			scale_scale: [0.0; 3],
			rotation: StreamIndex::Static,
			translation: StreamIndex::Static,
			scale: StreamIndex::Static,
			default_rotation: [0.0, 0.0, 0.0, 1.0],
			visibility: None,
		}
	}

	/// Rotation `[x, y, z, w]` at `frame`.
	pub fn rotation_at(&self, anim: &AnimationDocument, frame: usize) -> [f32; 4] {
		if anim.rotation_block == 0 {
			return self.default_rotation;
		}
		self.rotation
			.track()
			.and_then(|index| anim.rotations.get(frame)?.get(index as usize / 4).copied())
			.unwrap_or(self.default_rotation)
	}

	/// Translation at `frame`: `offset + raw * scale` for tracked bones, else `offset`.
	pub fn translation_at(&self, anim: &AnimationDocument, frame: usize) -> [f32; 3] {
		let offset = self.translation_offset;
		if anim.translation_block == 0 {
			return offset;
		}
		let Some(raw) = self
			.translation
			.track()
			.and_then(|index| anim.translations.get(frame)?.get(index as usize / 3).copied())
		else {
			return offset;
		};
		let scale = self.translation_scale;
		[
			offset[0] + f32::from(raw[0]) * scale[0],
			offset[1] + f32::from(raw[1]) * scale[1],
			offset[2] + f32::from(raw[2]) * scale[2],
		]
	}

	/// Visibility at `frame`; bones without a stream are always visible.
	pub fn visible_at(&self, frame: usize) -> bool {
		match &self.visibility {
			Some(bits) => bits.get(frame).copied().unwrap_or(true),
			None => true,
		}
	}

	/// Return `true` when any channel changes over time.
	pub fn is_animated(&self) -> bool {
		self.rotation != StreamIndex::Static || self.translation != StreamIndex::Static || self.visibility.is_some()
	}
}

/// Decoded `.ala` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationDocument {
	/// Frame count.
	pub num_frames: u32,
	/// Playback rate.
	pub fps: f32,
	/// Bone count from the header.
	pub num_bones: u32,
	/// Rotation row width in 16-bit words.
	pub rotation_block: u32,
	/// Translation row width in 16-bit words.
	pub translation_block: u32,
	/// Scale row width in 16-bit words.
	pub scale_block: u32,
	/// Bone channels in file order.
	pub tracks: Vec<BoneTrack>,
	/// Rotation rows, one per frame.
	pub rotations: Vec<Vec<[f32; 4]>>,
	/// Raw translation rows, one per frame.
	pub translations: Vec<Vec<[u16; 3]>>,
	/// Recoverable problems, including structural validation results.
	pub diagnostics: Vec<Diagnostic>,
}

impl AnimationDocument {
	/// Find a track by bone name.
	pub fn track(&self, name: &str) -> Option<&BoneTrack> {
		self.tracks.iter().find(|track| track.name == name)
	}

	/// Playback length in seconds.
	pub fn duration(&self) -> f32 {
		if self.fps > 0.0 { self.num_frames as f32 / self.fps } else { 0.0 }
	}

	/// Cross-check track names against `armature`.
	///
	/// Structural checks already ran during parsing and live in
	/// [`AnimationDocument::diagnostics`]; this adds the skeleton check.
	pub fn validate(&self, armature: &Armature) -> Vec<ValidationWarning> {
		self.tracks
			.iter()
			.filter(|track| armature.find(&track.name).is_none())
			.map(|track| ValidationWarning::UnknownBone { name: track.name.clone() })
			.collect()
	}
}

/// Decode an animation file.
pub fn parse_animation(bytes: &[u8]) -> Result<AnimationDocument> {
	let mut parser = AnimationParser::default();
	let mut cursor = Cursor::new(bytes);
	parser.walk(&mut cursor)?;
	parser.finish()
}

#[derive(Default)]
struct AnimationParser {
	doc: AnimationDocument,
	names: NameSet,
	has_header: bool,
	rotation_indices: usize,
	translation_indices: usize,
	rotation_rows: Option<usize>,
	translation_rows: Option<usize>,
}

impl AnimationParser {
	fn walk(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
		walk_chunks(cursor, |header, body| self.chunk(header, body))?;
		Ok(())
	}

	fn chunk(&mut self, header: ChunkHeader, body: &mut Cursor<'_>) -> Result<Dispatch> {
		match AnimationChunk::from_tag(header.tag) {
			AnimationChunk::Container => self.walk(body)?,
			AnimationChunk::Header => self.header(header, body)?,
			AnimationChunk::BoneInfo => self.bone_info(header, body)?,
			AnimationChunk::Visibility => {
				let frames = self.doc.num_frames;
				let Some(track) = self.doc.tracks.last_mut() else {
					record(&mut self.doc.diagnostics, Diagnostic::OrphanVisibility { at: header.offset });
					return Ok(Dispatch::Skip);
				};
				let bytes = body.read_exact(body.remaining())?;
				track.visibility = Some(visibility_bits(bytes, frames, &track.name)?);
			}
			AnimationChunk::RotationData => {
				if self.doc.rotation_block == 0 {
					return Ok(Dispatch::Skip);
				}
				let (rows, available) = rotation_rows(body, self.doc.num_frames, self.doc.rotation_block)?;
				self.doc.rotations = rows;
				self.rotation_rows = Some(available);
			}
			AnimationChunk::TranslationData => {
				if self.doc.translation_block == 0 {
					return Ok(Dispatch::Skip);
				}
				let (rows, available) = translation_rows(body, self.doc.num_frames, self.doc.translation_block)?;
				self.doc.translations = rows;
				self.translation_rows = Some(available);
			}
			AnimationChunk::Other(_) => return Ok(Dispatch::Skip),
		}
		Ok(Dispatch::Handled)
	}

	fn header(&mut self, header: ChunkHeader, body: &mut Cursor<'_>) -> Result<()> {
		if header.len() != HEADER_LEN {
			return Err(AlamoError::UnsupportedVersion {
				what: "animation header",
				found: header.len() as u32,
				at: header.offset,
			});
		}

		// Six records in fixed order; their ids are not meaningful.
		let minis = read_mini_chunks(body)?;
		let field = |index: usize| {
			minis.get(index).copied().ok_or(AlamoError::InvalidHeader {
				reason: "header holds fewer than six records",
			})
		};
		let doc = &mut self.doc;
		doc.num_frames = field(0)?.u32()?;
		doc.fps = field(1)?.f32()?;
		doc.num_bones = field(2)?.u32()?;
		doc.rotation_block = field(3)?.u32()?;
		doc.translation_block = field(4)?.u32()?;
		doc.scale_block = field(5)?.u32()?;

		if doc.num_frames == 0 && doc.num_bones == 0 {
			return Err(AlamoError::InvalidHeader {
				reason: "frame and bone counts are both zero",
			});
		}
		if doc.rotation_block % 4 != 0 {
			return Err(AlamoError::InvalidHeader {
				reason: "rotation block size is not a multiple of 4",
			});
		}
		if doc.translation_block % 3 != 0 {
			return Err(AlamoError::InvalidHeader {
				reason: "translation block size is not a multiple of 3",
			});
		}
		if doc.scale_block % 3 != 0 {
			return Err(AlamoError::InvalidHeader {
				reason: "scale block size is not a multiple of 3",
			});
		}

		self.has_header = true;
		Ok(())
	}

	fn bone_info(&mut self, header: ChunkHeader, body: &mut Cursor<'_>) -> Result<()> {
		let minis = read_mini_chunks(body)?;
		let Some(name) = minis.iter().find(|mini| mini.id == 4) else {
			return Err(AlamoError::MissingBoneName { at: header.offset });
		};
		let name = self.names.claim(&truncate_name(&name.string()?));
		let mut track = BoneTrack::new(name);

		for mini in &minis {
			match mini.id {
				5 => track.bone_index = mini.index()?,
				6 => track.translation_offset = mini.vec3()?,
				7 => track.translation_scale = mini.vec3()?,
				8 => track.scale_offset = mini.vec3()?,
				9 => track.scale_scale = mini.vec3()?,
				14 => {
					track.translation = StreamIndex::from_raw(mini.index()?);
					self.translation_indices += 1;
				}
				15 => track.scale = StreamIndex::from_raw(mini.index()?),
				16 => {
					track.rotation = StreamIndex::from_raw(mini.index()?);
					self.rotation_indices += 1;
				}
				17 => {
					let mut words = mini.reader();
					let mut rotation = [0.0; 4];
					for component in &mut rotation {
						*component = dequantize(words.read_i16_le()?);
					}
					track.default_rotation = rotation;
				}
				_ => {}
			}
		}

		self.doc.tracks.push(track);
		Ok(())
	}

	fn finish(mut self) -> Result<AnimationDocument> {
		if !self.has_header {
			return Err(AlamoError::InvalidHeader { reason: "missing header chunk" });
		}

		let mut warnings = Vec::new();
		let doc = &self.doc;
		let frames = doc.num_frames as usize;

		if doc.rotation_block > 0 {
			let found = self.rotation_rows.unwrap_or(0);
			if found != frames {
				warnings.push(ValidationWarning::RotationRowCount { found, expected: frames });
			}
		}
		if doc.translation_block > 0 {
			let found = self.translation_rows.unwrap_or(0);
			if found != frames {
				warnings.push(ValidationWarning::TranslationRowCount { found, expected: frames });
			}
		}
		if self.rotation_indices != doc.num_bones as usize {
			warnings.push(ValidationWarning::IndexCountMismatch {
				stream: "rotation",
				found: self.rotation_indices,
				expected: doc.num_bones,
			});
		}
		if self.translation_indices != doc.num_bones as usize {
			warnings.push(ValidationWarning::IndexCountMismatch {
				stream: "translation",
				found: self.translation_indices,
				expected: doc.num_bones,
			});
		}

		for track in &doc.tracks {
			for (stream, index, block, arity) in [
				("rotation", track.rotation, doc.rotation_block, 4),
				("translation", track.translation, doc.translation_block, 3),
			] {
				let Some(index) = index.track() else { continue };
				if block > 0 && index / arity * arity + arity > block {
					warnings.push(ValidationWarning::StreamIndexOutOfRange {
						bone: track.name.clone(),
						stream,
						index,
						block,
					});
				}
			}
		}

		for warning in warnings {
			record(&mut self.doc.diagnostics, warning);
		}

		tracing::debug!(
			frames = self.doc.num_frames,
			tracks = self.doc.tracks.len(),
			diagnostics = self.doc.diagnostics.len(),
			"decoded animation"
		);
		Ok(self.doc)
	}
}
