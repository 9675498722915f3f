use std::f32::consts::PI;

use crate::format::chunk::read_chunk_string;
use crate::format::diag::record;
use crate::format::tags::{LIGHT_DATA, LIGHT_NAME};
use crate::format::{Cursor, Diagnostic, Dispatch, Result, walk_chunks};

/// Light type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightKind {
	/// Omnidirectional light.
	#[default]
	Point,
	/// Directional light.
	Sun,
	/// Cone light.
	Spot,
}

impl LightKind {
	/// Decode a stored kind value.
	pub fn from_u32(value: u32) -> Option<Self> {
		match value {
			0 => Some(Self::Point),
			1 => Some(Self::Sun),
			2 => Some(Self::Spot),
			_ => None,
		}
	}

	/// Lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Point => "point",
			Self::Sun => "sun",
			Self::Spot => "spot",
		}
	}
}

/// Cone parameters of a spot light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotCone {
	/// Cone angle (stored hotspot).
	pub angle: f32,
	/// Edge softness, `falloff / PI * angle`.
	pub blend: f32,
}

/// A light object.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
	/// Unique object name.
	pub name: String,
	/// Light type.
	pub kind: LightKind,
	/// RGB color.
	pub color: [f32; 3],
	/// Intensity.
	pub energy: f32,
	/// Falloff distance, half the stored far-attenuation end.
	pub distance: f32,
	/// Cone for spot lights.
	pub spot: Option<SpotCone>,
}

/// Decode a light container. `object_name` maps the stored name to the final unique one.
pub(crate) fn parse_light(
	body: &mut Cursor<'_>,
	mut object_name: impl FnMut(&str) -> String,
	diagnostics: &mut Vec<Diagnostic>,
) -> Result<Light> {
	let mut stored_name = String::new();
	let mut light = Light {
		name: String::new(),
		kind: LightKind::Point,
		color: [1.0; 3],
		energy: 1.0,
		distance: 0.0,
		spot: None,
	};
	let mut raw_kind = 0;

	walk_chunks(body, |header, chunk| {
		match header.tag {
			LIGHT_NAME => stored_name = read_chunk_string(chunk)?,
			LIGHT_DATA => {
				raw_kind = chunk.read_u32_le()?;
				light.color = chunk.read_vec3()?;
				light.energy = chunk.read_f32_le()?;
				light.distance = chunk.read_f32_le()? / 2.0;
				let _far_start = chunk.read_f32_le()?;
				let hotspot = chunk.read_f32_le()?;
				let falloff = chunk.read_f32_le()?;
				light.spot = Some(SpotCone {
					angle: hotspot,
					blend: falloff / PI * hotspot,
				});
			}
			_ => return Ok(Dispatch::Skip),
		}
		Ok(Dispatch::Handled)
	})?;

	light.name = object_name(&stored_name);
	light.kind = match LightKind::from_u32(raw_kind) {
		Some(kind) => kind,
		None => {
			record(
				diagnostics,
				Diagnostic::InvalidLightKind {
					light: light.name.clone(),
					value: raw_kind,
				},
			);
			LightKind::Point
		}
	};
	if light.kind != LightKind::Spot {
		light.spot = None;
	}

	Ok(light)
}
