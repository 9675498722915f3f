use crate::format::{AlamoError, Cursor, Result};

/// Divisor mapping a signed 16-bit word to `[-1, 1]`.
pub(crate) const QUANT_SCALE: f32 = 32767.0;

/// Dequantize one packed rotation component.
pub(crate) fn dequantize(word: i16) -> f32 {
	f32::from(word) / QUANT_SCALE
}

/// Decode up to `frames` rows of `block / 4` quaternions.
///
/// Returns the rows plus the number of whole rows the chunk held.
pub(crate) fn rotation_rows(body: &mut Cursor<'_>, frames: u32, block: u32) -> Result<(Vec<Vec<[f32; 4]>>, usize)> {
	let per_row = block as usize / 4;
	let available = whole_rows(body, block);
	let mut rows = Vec::with_capacity(available.min(frames as usize));
	for _ in 0..available.min(frames as usize) {
		let mut row = Vec::with_capacity(per_row);
		for _ in 0..per_row {
			row.push([
				dequantize(body.read_i16_le()?),
				dequantize(body.read_i16_le()?),
				dequantize(body.read_i16_le()?),
				dequantize(body.read_i16_le()?),
			]);
		}
		rows.push(row);
	}
	Ok((rows, available))
}

/// Decode up to `frames` rows of `block / 3` raw translation triples.
pub(crate) fn translation_rows(body: &mut Cursor<'_>, frames: u32, block: u32) -> Result<(Vec<Vec<[u16; 3]>>, usize)> {
	let per_row = block as usize / 3;
	let available = whole_rows(body, block);
	let mut rows = Vec::with_capacity(available.min(frames as usize));
	for _ in 0..available.min(frames as usize) {
		let mut row = Vec::with_capacity(per_row);
		for _ in 0..per_row {
			row.push([body.read_u16_le()?, body.read_u16_le()?, body.read_u16_le()?]);
		}
		rows.push(row);
	}
	Ok((rows, available))
}

fn whole_rows(body: &Cursor<'_>, block: u32) -> usize {
	let row_bytes = block as usize * 2;
	if row_bytes == 0 { 0 } else { body.remaining() / row_bytes }
}

/// Decode one visibility bit per frame.
///
/// Frame `f` is bit `7 - f % 8` of byte `f / 8`, so the first frame of each
/// byte sits in its most significant bit.
pub(crate) fn visibility_bits(bytes: &[u8], frames: u32, bone: &str) -> Result<Vec<bool>> {
	let need = (frames as usize).div_ceil(8);
	if bytes.len() < need {
		return Err(AlamoError::InvalidVisibility {
			bone: bone.to_owned(),
			bytes: bytes.len(),
			need,
			frames,
		});
	}
	Ok((0..frames as usize).map(|frame| bytes[frame / 8] & (0x80 >> (frame % 8)) != 0).collect())
}
