use crate::format::{AlamoError, Result};

/// Bounded little-endian cursor over an immutable byte slice.
///
/// Positions are relative to the window; `offset()` adds the window's absolute
/// base so errors point at the right place in the enclosing file.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	base: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0 of `bytes`.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0, base: 0 }
	}

	/// Create a cursor over `bytes` that reports offsets relative to `base`.
	pub fn with_base(bytes: &'a [u8], base: usize) -> Self {
		Self { bytes, pos: 0, base }
	}

	/// Return the window-relative read position.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return the absolute offset of the read position in the source buffer.
	pub fn offset(&self) -> usize {
		self.base + self.pos
	}

	/// Return the window length.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Return `true` when the window is empty.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(AlamoError::OutOfBounds {
				at: self.offset(),
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read a little-endian `u16`.
	pub fn read_u16_le(&mut self) -> Result<u16> {
		Ok(u16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i16`.
	pub fn read_i16_le(&mut self) -> Result<i16> {
		Ok(i16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `f32`.
	pub fn read_f32_le(&mut self) -> Result<f32> {
		Ok(f32::from_le_bytes(self.read_array()?))
	}

	/// Read three consecutive little-endian `f32` values.
	pub fn read_vec3(&mut self) -> Result<[f32; 3]> {
		Ok([self.read_f32_le()?, self.read_f32_le()?, self.read_f32_le()?])
	}

	/// Read four consecutive little-endian `f32` values.
	pub fn read_vec4(&mut self) -> Result<[f32; 4]> {
		Ok([self.read_f32_le()?, self.read_f32_le()?, self.read_f32_le()?, self.read_f32_le()?])
	}

	/// Move to a window-relative position. The end of the window is a valid target.
	pub fn seek_absolute(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(AlamoError::SeekOutOfBounds {
				at: self.offset(),
				target: i64::try_from(pos).unwrap_or(i64::MAX),
				len: self.bytes.len(),
			});
		}
		self.pos = pos;
		Ok(())
	}

	/// Move forward or backward relative to the current position.
	pub fn seek_relative(&mut self, delta: i64) -> Result<()> {
		let target = i64::try_from(self.pos).unwrap_or(i64::MAX).saturating_add(delta);
		let Ok(pos) = usize::try_from(target) else {
			return Err(AlamoError::SeekOutOfBounds {
				at: self.offset(),
				target,
				len: self.bytes.len(),
			});
		};
		self.seek_absolute(pos).map_err(|_| AlamoError::SeekOutOfBounds {
			at: self.offset(),
			target,
			len: self.bytes.len(),
		})
	}

	/// Skip `n` bytes.
	pub fn skip(&mut self, n: usize) -> Result<()> {
		self.read_exact(n).map(|_| ())
	}

	/// Carve the next `len` bytes into a child window and advance past them.
	pub fn sub_cursor(&mut self, len: usize) -> Result<Cursor<'a>> {
		let base = self.offset();
		let bytes = self.read_exact(len)?;
		Ok(Cursor { bytes, pos: 0, base })
	}

	/// Return the unread tail without advancing.
	pub fn rest(&self) -> &'a [u8] {
		&self.bytes[self.pos..]
	}
}
