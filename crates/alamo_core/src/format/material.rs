use std::collections::BTreeMap;

macro_rules! catalog {
	(
		$(#[$meta:meta])*
		$vis:vis enum $name:ident { $($variant:ident => $text:literal,)+ }
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		$vis enum $name {
			$(
				#[doc = concat!("`", $text, "`")]
				$variant,
			)+
		}

		impl $name {
			/// Every catalog entry in declaration order.
			pub const ALL: &'static [$name] = &[$($name::$variant,)+];

			/// Look up a stored name. Matching is exact.
			pub fn from_name(name: &str) -> Option<Self> {
				match name {
					$($text => Some(Self::$variant),)+
					_ => None,
				}
			}

			/// Return the stored name.
			pub fn as_str(self) -> &'static str {
				match self {
					$(Self::$variant => $text,)+
				}
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.as_str())
			}
		}
	};
}

catalog! {
	/// Shader programs known to the engine.
	pub enum ShaderProgram {
		Default => "alDefault.fx",
		BatchMeshAlpha => "BatchMeshAlpha.fx",
		BatchMeshGloss => "BatchMeshGloss.fx",
		Grass => "Grass.fx",
		MeshAdditive => "MeshAdditive.fx",
		MeshAlpha => "MeshAlpha.fx",
		MeshAlphaScroll => "MeshAlphaScroll.fx",
		MeshBumpColorize => "MeshBumpColorize.fx",
		MeshBumpColorizeVertex => "MeshBumpColorizeVertex.fx",
		MeshBumpColorizeDetail => "MeshBumpColorizeDetail.fx",
		MeshBumpLight => "MeshBumpLight.fx",
		MeshCollision => "MeshCollision.fx",
		MeshGloss => "MeshGloss.fx",
		MeshGlossColorize => "MeshGlossColorize.fx",
		MeshShadowVolume => "MeshShadowVolume.fx",
		MeshShield => "MeshShield.fx",
		Nebula => "Nebula.fx",
		Planet => "Planet.fx",
		RSkinAdditive => "RSkinAdditive.fx",
		RSkinAlpha => "RSkinAlpha.fx",
		RSkinBumpColorize => "RSkinBumpColorize.fx",
		RSkinGloss => "RSkinGloss.fx",
		RSkinGlossColorize => "RSkinGlossColorize.fx",
		RSkinShadowVolume => "RSkinShadowVolume.fx",
		Skydome => "Skydome.fx",
		TerrainMeshBump => "TerrainMeshBump.fx",
		TerrainMeshGloss => "TerrainMeshGloss.fx",
		Tree => "Tree.fx",
		LightProxy => "LightProxy.fx",
	}
}

impl ShaderProgram {
	/// Return `true` for vertex-skinned programs, which need an animation mapping.
	pub fn is_skinned(self) -> bool {
		matches!(
			self,
			Self::RSkinAdditive | Self::RSkinAlpha | Self::RSkinBumpColorize | Self::RSkinGloss | Self::RSkinGlossColorize | Self::RSkinShadowVolume
		)
	}

	/// Return `true` for shadow and collision helper programs, which carry no visible surface.
	pub fn is_helper(self) -> bool {
		matches!(self, Self::MeshCollision | Self::MeshShadowVolume | Self::RSkinShadowVolume)
	}
}

impl Default for ShaderProgram {
	fn default() -> Self {
		Self::Default
	}
}

catalog! {
	/// Material parameter names the decoder keeps.
	pub enum MaterialProperty {
		BaseTexture => "BaseTexture",
		NormalTexture => "NormalTexture",
		GlossTexture => "GlossTexture",
		WaveTexture => "WaveTexture",
		DistortionTexture => "DistortionTexture",
		CloudTexture => "CloudTexture",
		CloudNormalTexture => "CloudNormalTexture",
		DetailTexture => "DetailTexture",
		NormalDetailTexture => "NormalDetailTexture",
		Emissive => "Emissive",
		Diffuse => "Diffuse",
		Specular => "Specular",
		Shininess => "Shininess",
		Colorization => "Colorization",
		DebugColor => "DebugColor",
		UvOffset => "UVOffset",
		Color => "Color",
		UvScrollRate => "UVScrollRate",
		DiffuseColor => "DiffuseColor",
		EdgeBrightness => "EdgeBrightness",
		BaseUvScale => "BaseUVScale",
		WaveUvScale => "WaveUVScale",
		DistortUvScale => "DistortUVScale",
		BaseUvScrollRate => "BaseUVScrollRate",
		WaveUvScrollRate => "WaveUVScrollRate",
		DistortUvScrollRate => "DistortUVScrollRate",
		BendScale => "BendScale",
		Diffuse1 => "Diffuse1",
		CloudScrollRate => "CloudScrollRate",
		CloudScale => "CloudScale",
		SFreq => "SFreq",
		TFreq => "TFreq",
		DistortionScale => "DistortionScale",
		Atmosphere => "Atmosphere",
		CityColor => "CityColor",
		AtmospherePower => "AtmospherePower",
	}
}

/// Typed material parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
	/// Integer parameter.
	Int(i32),
	/// Scalar parameter.
	Float(f32),
	/// Three-component parameter.
	Float3([f32; 3]),
	/// Four-component parameter.
	Float4([f32; 4]),
	/// Texture file name with a `.dds` extension, or `None` for an unset slot.
	Texture(Option<String>),
}

/// Shader and parameters of one submesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
	/// Shader program; `alDefault.fx` when the stored name was unknown.
	pub shader: ShaderProgram,
	/// Known parameters in catalog order.
	pub properties: BTreeMap<MaterialProperty, PropertyValue>,
}

impl Material {
	/// Look up one parameter.
	pub fn get(&self, property: MaterialProperty) -> Option<&PropertyValue> {
		self.properties.get(&property)
	}

	/// Return the texture file bound to `property`, if any.
	pub fn texture(&self, property: MaterialProperty) -> Option<&str> {
		match self.properties.get(&property) {
			Some(PropertyValue::Texture(Some(file))) => Some(file),
			_ => None,
		}
	}
}

/// Rewrite a stored texture file name to the `.dds` the engine loads.
///
/// `"None"` marks an unset slot. The last four characters are replaced, which
/// assumes a three-letter extension as the exporter writes.
pub(crate) fn texture_file(stored: &str) -> Option<String> {
	if stored == "None" {
		return None;
	}
	let stem: String = match stored.char_indices().rev().nth(3) {
		Some((cut, _)) => stored[..cut].to_owned(),
		None => String::new(),
	};
	Some(format!("{stem}.dds"))
}
