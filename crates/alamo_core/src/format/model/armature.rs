use crate::format::chunk::read_chunk_string;
use crate::format::diag::record;
use crate::format::names::{NameSet, truncate_name};
use crate::format::tags::{BONE, BONE_DATA_V1, BONE_DATA_V2, BONE_NAME, SKELETON_HEADER};
use crate::format::{AlamoError, ChunkHeader, Cursor, Diagnostic, Dispatch, Result, walk_chunks};

/// Stored parent value meaning "no parent".
const NO_PARENT: u32 = u32::MAX;

/// Bone name whose stored parent is ignored.
pub(crate) const ROOT_BONE: &str = "Root";

/// Camera-facing behavior of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillboardMode {
	/// Regular bone.
	#[default]
	Disable,
	/// Faces the view direction.
	Parallel,
	/// Faces the camera position.
	Face,
	/// Rotates about Z toward the view.
	ZAxisView,
	/// Rotates about Z toward the light.
	ZAxisLight,
	/// Rotates about Z with the wind.
	ZAxisWind,
	/// Sun glow sprite.
	SunlightGlow,
	/// Sun sprite.
	Sun,
}

impl BillboardMode {
	const ALL: [Self; 8] = [
		Self::Disable,
		Self::Parallel,
		Self::Face,
		Self::ZAxisView,
		Self::ZAxisLight,
		Self::ZAxisWind,
		Self::SunlightGlow,
		Self::Sun,
	];

	/// Decode a stored mode value.
	pub fn from_u32(value: u32) -> Option<Self> {
		usize::try_from(value).ok().and_then(|index| Self::ALL.get(index).copied())
	}

	/// Human-readable label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Disable => "Disable",
			Self::Parallel => "Parallel",
			Self::Face => "Face",
			Self::ZAxisView => "ZAxis View",
			Self::ZAxisLight => "ZAxis Light",
			Self::ZAxisWind => "ZAxis Wind",
			Self::SunlightGlow => "Sunlight Glow",
			Self::Sun => "Sun",
		}
	}
}

/// One skeleton bone.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
	/// Unique bone name within the armature.
	pub name: String,
	/// Parent bone index, `None` for roots.
	pub parent: Option<usize>,
	/// Default visibility.
	pub visible: bool,
	/// Billboard behavior.
	pub billboard: BillboardMode,
	/// Row-major 3x4 transform relative to the parent.
	pub matrix: [[f32; 4]; 3],
}

impl Bone {
	/// Return the transform with its implicit `(0, 0, 0, 1)` row.
	pub fn matrix4(&self) -> [[f32; 4]; 4] {
		let [a, b, c] = self.matrix;
		[a, b, c, [0.0, 0.0, 0.0, 1.0]]
	}
}

/// Ordered bone table of a model.
///
/// Parent indices always point inside the table and parent chains always end
/// at a root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Armature {
	/// Bones in file order.
	pub bones: Vec<Bone>,
}

impl Armature {
	/// Number of bones.
	pub fn len(&self) -> usize {
		self.bones.len()
	}

	/// Return `true` when the armature has no bones.
	pub fn is_empty(&self) -> bool {
		self.bones.is_empty()
	}

	/// Find a bone index by exact name.
	pub fn find(&self, name: &str) -> Option<usize> {
		self.bones.iter().position(|bone| bone.name == name)
	}

	/// Borrow a bone by index.
	pub fn get(&self, index: usize) -> Option<&Bone> {
		self.bones.get(index)
	}

	/// Indices of bones without a parent.
	pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
		self.bones.iter().enumerate().filter(|(_, bone)| bone.parent.is_none()).map(|(index, _)| index)
	}

	/// Compose the model-space transform of `index` from its parent chain.
	pub fn world_matrix(&self, index: usize) -> Option<[[f32; 4]; 4]> {
		let bone = self.bones.get(index)?;
		let local = bone.matrix4();
		match bone.parent {
			Some(parent) => Some(mul(&self.world_matrix(parent)?, &local)),
			None => Some(local),
		}
	}
}

fn mul(left: &[[f32; 4]; 4], right: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
	let mut out = [[0.0; 4]; 4];
	for (row, out_row) in out.iter_mut().enumerate() {
		for (col, cell) in out_row.iter_mut().enumerate() {
			*cell = (0..4).map(|k| left[row][k] * right[k][col]).sum();
		}
	}
	out
}

struct RawBone {
	name: String,
	parent: u32,
	visible: u32,
	billboard: u32,
	matrix: [[f32; 4]; 3],
}

/// Decode a skeleton container payload.
pub(crate) fn parse_skeleton(body: &mut Cursor<'_>, diagnostics: &mut Vec<Diagnostic>) -> Result<Armature> {
	let mut declared = None;
	let mut raw = Vec::new();

	walk_chunks(body, |header, chunk| match header.tag {
		SKELETON_HEADER => {
			declared = Some(chunk.read_u32_le()?);
			Ok(Dispatch::Handled)
		}
		BONE => {
			raw.push(parse_bone(header, chunk)?);
			Ok(Dispatch::Handled)
		}
		_ => Ok(Dispatch::Skip),
	})?;

	if let Some(declared) = declared {
		if declared as usize != raw.len() {
			record(diagnostics, Diagnostic::BoneCountMismatch { declared, found: raw.len() });
		}
	}

	let count = raw.len();
	let mut names = NameSet::new();
	let mut bones = Vec::with_capacity(count);
	for (index, bone) in raw.into_iter().enumerate() {
		let parent = if bone.name == ROOT_BONE || bone.parent == NO_PARENT || bone.parent as usize == index {
			None
		} else if (bone.parent as usize) < count {
			Some(bone.parent as usize)
		} else {
			return Err(AlamoError::InvalidBoneParent {
				bone: index,
				parent: bone.parent,
				count,
			});
		};

		let billboard = match BillboardMode::from_u32(bone.billboard) {
			Some(mode) => mode,
			None => {
				record(
					diagnostics,
					Diagnostic::InvalidBillboardMode {
						bone: bone.name.clone(),
						value: bone.billboard,
					},
				);
				BillboardMode::Disable
			}
		};

		bones.push(Bone {
			name: names.claim(&truncate_name(&bone.name)),
			parent,
			visible: bone.visible == 1,
			billboard,
			matrix: bone.matrix,
		});
	}

	check_cycles(&bones)?;
	Ok(Armature { bones })
}

fn parse_bone(header: ChunkHeader, body: &mut Cursor<'_>) -> Result<RawBone> {
	let mut name = None;
	let mut data = None;

	walk_chunks(body, |child, chunk| {
		match child.tag {
			BONE_NAME => name = Some(read_chunk_string(chunk)?),
			BONE_DATA_V1 | BONE_DATA_V2 => {
				let parent = chunk.read_u32_le()?;
				let visible = chunk.read_u32_le()?;
				let billboard = if child.tag == BONE_DATA_V2 { chunk.read_u32_le()? } else { 0 };
				let matrix = [chunk.read_vec4()?, chunk.read_vec4()?, chunk.read_vec4()?];
				data = Some((parent, visible, billboard, matrix));
			}
			other => {
				return Err(AlamoError::UnsupportedVersion {
					what: "bone",
					found: other,
					at: child.offset,
				});
			}
		}
		Ok(Dispatch::Handled)
	})?;

	let Some((parent, visible, billboard, matrix)) = data else {
		return Err(AlamoError::UnsupportedVersion {
			what: "bone",
			found: 0,
			at: header.offset,
		});
	};

	Ok(RawBone {
		name: name.unwrap_or_default(),
		parent,
		visible,
		billboard,
		matrix,
	})
}

fn check_cycles(bones: &[Bone]) -> Result<()> {
	for start in 0..bones.len() {
		let mut current = start;
		let mut steps = 0;
		while let Some(parent) = bones[current].parent {
			steps += 1;
			if steps > bones.len() {
				return Err(AlamoError::BoneCycle { bone: start });
			}
			current = parent;
		}
	}
	Ok(())
}
