use crate::format::{AlamoError, Cursor, Result};

/// High bit of a chunk length marking a container chunk.
pub const CONTAINER_FLAG: u32 = 0x8000_0000;

/// Strip the container flag from a raw chunk length.
pub const fn mask_length(raw: u32) -> u32 {
	raw & !CONTAINER_FLAG
}

/// Tag and length of one framed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
	/// Four-byte chunk tag read as a little-endian `u32`.
	pub tag: u32,
	/// Length field as stored, container flag included.
	pub raw_len: u32,
	/// Absolute offset of the tag.
	pub offset: usize,
}

impl ChunkHeader {
	/// Size of the tag and length fields.
	pub const SIZE: usize = 8;

	/// Payload length in bytes.
	pub fn len(&self) -> usize {
		mask_length(self.raw_len) as usize
	}

	/// Return `true` when the payload is empty.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Return `true` when the length field carries the container flag.
	pub fn is_container(&self) -> bool {
		self.raw_len & CONTAINER_FLAG != 0
	}

	/// Absolute offset of the first payload byte.
	pub fn data_offset(&self) -> usize {
		self.offset + Self::SIZE
	}

	/// Absolute offset one past the last payload byte.
	pub fn end(&self) -> usize {
		self.data_offset() + self.len()
	}
}

/// Handler verdict for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
	/// The handler decoded the chunk.
	Handled,
	/// The handler did not recognize the chunk; it is skipped by length.
	Skip,
}

/// Per-walk counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
	/// Chunks a handler decoded.
	pub handled: usize,
	/// Chunks skipped by length.
	pub skipped: usize,
	/// Handled chunks that left payload bytes unread.
	pub leftover: usize,
}

/// Walk sibling chunks until `cursor` is exhausted.
///
/// Each handler call receives a cursor bounded to exactly its payload, and the
/// parent cursor is already positioned at the next sibling, so a handler can
/// neither overrun into a sibling nor leave the walk misaligned.
pub fn walk_chunks<'a, F>(cursor: &mut Cursor<'a>, mut handler: F) -> Result<WalkStats>
where
	F: FnMut(ChunkHeader, &mut Cursor<'a>) -> Result<Dispatch>,
{
	let mut stats = WalkStats::default();

	while cursor.remaining() > 0 {
		let offset = cursor.offset();
		let tag = cursor.read_u32_le()?;
		let raw_len = cursor.read_u32_le()?;
		let header = ChunkHeader { tag, raw_len, offset };
		let mut body = cursor.sub_cursor(header.len())?;

		match handler(header, &mut body)? {
			Dispatch::Handled => {
				stats.handled += 1;
				if body.remaining() > 0 {
					stats.leftover += 1;
					tracing::debug!(offset, unread = body.remaining(), "chunk 0x{tag:x} payload not fully consumed");
				}
			}
			Dispatch::Skip => {
				stats.skipped += 1;
				tracing::debug!(offset, len = header.len(), "skipping chunk 0x{tag:x}");
			}
		}
	}

	Ok(stats)
}

/// One `id, size, payload` record inside a data chunk.
#[derive(Debug, Clone, Copy)]
pub struct MiniChunk<'a> {
	/// Record id.
	pub id: u8,
	/// Raw payload.
	pub data: &'a [u8],
	/// Absolute offset of the payload.
	pub offset: usize,
}

impl<'a> MiniChunk<'a> {
	/// Decode the payload as a little-endian `u32`.
	pub fn u32(&self) -> Result<u32> {
		self.reader().read_u32_le()
	}

	/// Decode the payload as a little-endian `f32`.
	pub fn f32(&self) -> Result<f32> {
		self.reader().read_f32_le()
	}

	/// Decode the payload as a little-endian `i32`.
	pub fn i32(&self) -> Result<i32> {
		self.reader().read_i32_le()
	}

	/// Decode a signed index stored as either two or four bytes.
	pub fn index(&self) -> Result<i32> {
		match self.data.len() {
			2 => Ok(i32::from(self.reader().read_i16_le()?)),
			_ => self.i32(),
		}
	}

	/// Decode the payload as three `f32` values.
	pub fn vec3(&self) -> Result<[f32; 3]> {
		self.reader().read_vec3()
	}

	/// Decode the payload as four `f32` values.
	pub fn vec4(&self) -> Result<[f32; 4]> {
		self.reader().read_vec4()
	}

	/// Decode the payload as a NUL-terminated string.
	pub fn string(&self) -> Result<String> {
		decode_terminated(self.data, self.offset)
	}

	/// Return the payload as a cursor.
	pub fn reader(&self) -> Cursor<'a> {
		Cursor::with_base(self.data, self.offset)
	}
}

/// Split the rest of `cursor` into mini-chunks.
pub fn read_mini_chunks<'a>(cursor: &mut Cursor<'a>) -> Result<Vec<MiniChunk<'a>>> {
	let mut out = Vec::new();
	while cursor.remaining() > 0 {
		let id = cursor.read_u8()?;
		let size = usize::from(cursor.read_u8()?);
		let offset = cursor.offset();
		let data = cursor.read_exact(size)?;
		out.push(MiniChunk { id, data, offset });
	}
	Ok(out)
}

/// Decode a chunk payload holding one NUL-terminated string.
pub(crate) fn read_chunk_string(cursor: &mut Cursor<'_>) -> Result<String> {
	let offset = cursor.offset();
	let bytes = cursor.read_exact(cursor.remaining())?;
	decode_terminated(bytes, offset)
}

/// Decode `len - 1` text bytes followed by a NUL terminator.
pub(crate) fn decode_terminated(bytes: &[u8], offset: usize) -> Result<String> {
	let Some((&last, text)) = bytes.split_last() else {
		return Err(AlamoError::MissingTerminator { at: offset });
	};
	if last != 0 {
		return Err(AlamoError::MissingTerminator { at: offset });
	}
	let text = match text.iter().position(|byte| *byte == 0) {
		Some(end) => &text[..end],
		None => text,
	};
	Ok(text.iter().map(|byte| char::from(*byte)).collect())
}
