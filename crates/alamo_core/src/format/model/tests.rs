use std::collections::HashSet;

use alamo_testkit::{
	BoneSpec, ChunkWriter, LightSpec, MeshFlags, MiniWriter, ProxySpec, SubmeshSpec, VertexSpec, connections, light, mesh, sample_model, skeleton,
	u16s, u32s,
};

use crate::format::{
	AlamoError, BillboardMode, BoneMatch, Diagnostic, LightKind, MaterialProperty, ModelOptions, NoTextures, ObjectRef, PropertyValue, ShaderProgram,
	TextureLookup, parse_model, parse_model_with, resolve_connections,
};

struct KnownTextures(HashSet<String>);

impl TextureLookup for KnownTextures {
	fn exists(&self, file: &str) -> bool {
		self.0.contains(file)
	}
}

#[test]
fn sample_model_decodes_every_family() {
	let doc = parse_model(&sample_model()).expect("model parses");

	let armature = doc.armature.as_ref().expect("primary keeps its armature");
	assert!(doc.armature_present);
	assert_eq!(armature.len(), 2);
	assert_eq!(armature.bones[0].name, "Root");
	assert_eq!(armature.bones[0].parent, None);
	assert_eq!(armature.bones[1].parent, Some(0));

	assert_eq!(doc.meshes.iter().map(|mesh| mesh.name.as_str()).collect::<Vec<_>>(), vec!["Hull", "Turret"]);
	assert_eq!(doc.lights[0].name, "Lamp");
	assert_eq!(doc.objects, vec![ObjectRef::Mesh(0), ObjectRef::Mesh(1), ObjectRef::Light(0)]);
	assert_eq!(doc.object_name(2), Some("Lamp"));

	let hull = &doc.meshes[0].submeshes[0];
	assert_eq!(hull.material.shader, ShaderProgram::MeshGloss);
	assert_eq!(hull.material.texture(MaterialProperty::BaseTexture), Some("hull.dds"));
	assert_eq!(hull.material.get(MaterialProperty::Shininess), Some(&PropertyValue::Float(16.0)));
	assert_eq!(hull.vertices.len(), 4);
	assert_eq!(hull.vertices[2].position, [2.0, 0.0, 0.0]);
	assert_eq!(hull.vertices[2].uv, [0.0, -0.25]);
	assert_eq!(hull.faces, vec![[0, 1, 2], [0, 2, 3]]);

	assert_eq!(doc.connections.len(), 3);
	assert_eq!(doc.proxies[0].name, "Muzzle");
	assert_eq!(doc.proxies[0].bone, 1);
	assert!(!doc.proxies[0].hidden);
	assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);
}

#[test]
fn second_submesh_faces_are_offset_by_first_vertex_count() {
	let mut out = ChunkWriter::new();
	mesh(
		&mut out,
		"Hull",
		MeshFlags::default(),
		&[SubmeshSpec::fan("MeshGloss.fx", 10), SubmeshSpec::fan("MeshAlpha.fx", 7)],
	);
	let doc = parse_model(&out.into_bytes()).expect("model parses");

	let mesh = &doc.meshes[0];
	assert_eq!(mesh.vertex_count(), 17);
	assert_eq!(mesh.submeshes[0].faces[0], [0, 1, 2]);
	assert_eq!(mesh.submeshes[1].faces[0], [10, 11, 12]);
	assert_eq!(mesh.submeshes[1].material.shader, ShaderProgram::MeshAlpha);
}

#[test]
fn legacy_vertex_layout_uses_short_stride() {
	let mut slot = SubmeshSpec::fan("MeshGloss.fx", 3);
	slot.legacy = true;
	slot.vertices[1].bone = 5;
	slot.mapping = Some(vec![0, 0, 0, 0, 0, 1]);
	let mut out = ChunkWriter::new();
	mesh(&mut out, "Old", MeshFlags::default(), &[slot]);

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	let sub = &doc.meshes[0].submeshes[0];
	assert_eq!(sub.vertices[1].position, [1.0, 0.0, 0.0]);
	assert_eq!(sub.vertices[1].bone, 5);
	assert_eq!(sub.vertex_bone(1), Some(1));
}

#[test]
fn particle_chunk_is_unsupported_format() {
	let mut out = ChunkWriter::new();
	skeleton(&mut out, &[BoneSpec::new("Root", u32::MAX)]);
	out.container(0x900, |particle| {
		particle.chunk(0x1, &[0; 4]);
	});

	let err = parse_model(&out.into_bytes()).expect_err("particles are not decoded");
	assert!(matches!(err, AlamoError::UnsupportedFormat { tag: 0x900, .. }));
}

#[test]
fn unknown_chunks_are_skipped() {
	let mut out = ChunkWriter::new();
	out.chunk(0x7777, &[1, 2, 3]);
	mesh(&mut out, "Hull", MeshFlags::default(), &[SubmeshSpec::fan("MeshGloss.fx", 3)]);
	out.container(0x7778, |inner| {
		inner.chunk(0x1, &[0; 8]);
	});

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	assert_eq!(doc.meshes.len(), 1);
	assert!(doc.armature.is_none());
}

#[test]
fn unknown_shader_and_property_degrade_with_diagnostics() {
	let mut slot = SubmeshSpec::fan("MeshFancy.fx", 3);
	slot.floats.push(("Sparkle".to_owned(), 1.0));
	slot.floats.push(("EdgeBrightness".to_owned(), 0.5));
	let mut out = ChunkWriter::new();
	mesh(&mut out, "Hull", MeshFlags::default(), &[slot]);

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	let material = &doc.meshes[0].submeshes[0].material;
	assert_eq!(material.shader, ShaderProgram::Default);
	assert_eq!(material.properties.len(), 1);
	assert_eq!(material.get(MaterialProperty::EdgeBrightness), Some(&PropertyValue::Float(0.5)));
	assert!(doc.diagnostics.contains(&Diagnostic::UnknownShader {
		mesh: "Hull".to_owned(),
		name: "MeshFancy.fx".to_owned(),
	}));
	assert!(doc.diagnostics.contains(&Diagnostic::UnknownMaterialProperty {
		mesh: "Hull".to_owned(),
		name: "Sparkle".to_owned(),
	}));
}

#[test]
fn int_and_vector_parameters_are_typed() {
	let mut out = ChunkWriter::new();
	out.container(0x400, |body| {
		body.string(0x401, "Shield");
		body.container(0x10100, |material| {
			material.string(0x10101, "MeshShield.fx");
			let mut int = MiniWriter::new();
			int.string(1, "Colorization").i32(2, 3);
			material.chunk(0x10102, &int.into_bytes());
			let mut color = MiniWriter::new();
			color.string(1, "Color").vec4(2, [1.0, 0.5, 0.25, 1.0]);
			material.chunk(0x10106, &color.into_bytes());
			let mut rate = MiniWriter::new();
			rate.string(1, "UVScrollRate").vec3(2, [0.1, 0.2, 0.0]);
			material.chunk(0x10104, &rate.into_bytes());
		});
	});

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	let material = &doc.meshes[0].submeshes[0].material;
	assert_eq!(material.shader, ShaderProgram::MeshShield);
	assert_eq!(material.get(MaterialProperty::Colorization), Some(&PropertyValue::Int(3)));
	assert_eq!(material.get(MaterialProperty::Color), Some(&PropertyValue::Float4([1.0, 0.5, 0.25, 1.0])));
	assert_eq!(material.get(MaterialProperty::UvScrollRate), Some(&PropertyValue::Float3([0.1, 0.2, 0.0])));
}

#[test]
fn texture_lookup_reports_missing_files_but_never_none() {
	let mut slot = SubmeshSpec::fan("MeshGloss.fx", 3);
	slot.textures.push(("BaseTexture".to_owned(), "hull.tga".to_owned()));
	slot.textures.push(("NormalTexture".to_owned(), "None".to_owned()));
	slot.textures.push(("GlossTexture".to_owned(), "gloss.tga".to_owned()));
	let mut out = ChunkWriter::new();
	mesh(&mut out, "Hull", MeshFlags::default(), &[slot]);

	let textures = KnownTextures(["hull.dds".to_owned()].into_iter().collect());
	let doc = parse_model_with(&out.into_bytes(), &ModelOptions::primary(), &textures).expect("model parses");

	let material = &doc.meshes[0].submeshes[0].material;
	assert_eq!(material.get(MaterialProperty::NormalTexture), Some(&PropertyValue::Texture(None)));
	assert_eq!(
		doc.diagnostics,
		vec![Diagnostic::MissingTexture {
			mesh: "Hull".to_owned(),
			property: "GlossTexture".to_owned(),
			file: "gloss.dds".to_owned(),
		}]
	);
}

#[test]
fn skinning_checks_report_mapping_problems() {
	let skinned = SubmeshSpec::fan("RSkinGloss.fx", 3);
	let mut mapped = SubmeshSpec::fan("MeshGloss.fx", 3);
	mapped.vertices[2].bone = 4;
	mapped.mapping = Some(vec![0, 1]);
	let mut out = ChunkWriter::new();
	mesh(&mut out, "Crew", MeshFlags::default(), &[skinned, mapped]);

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	assert_eq!(
		doc.diagnostics,
		vec![
			Diagnostic::MissingAnimationMapping {
				mesh: "Crew".to_owned(),
				slot: 0,
			},
			Diagnostic::BoneIndexOutsideMapping {
				mesh: "Crew".to_owned(),
				slot: 1,
				bone: 4,
				mapping_len: 2,
			},
		]
	);
}

#[test]
fn submodel_prefixes_mesh_names_and_skips_armature() {
	let long = "L".repeat(70);
	let mut out = ChunkWriter::new();
	skeleton(&mut out, &[BoneSpec::new("Root", u32::MAX)]);
	mesh(&mut out, "Barrel", MeshFlags::default(), &[SubmeshSpec::fan("MeshGloss.fx", 3)]);
	mesh(&mut out, "Barrel", MeshFlags::default(), &[SubmeshSpec::fan("MeshGloss.fx", 3)]);
	mesh(&mut out, &long, MeshFlags::default(), &[SubmeshSpec::fan("MeshGloss.fx", 3)]);

	let doc = parse_model_with(&out.into_bytes(), &ModelOptions::submodel(2), &NoTextures).expect("model parses");
	assert!(doc.armature.is_none());
	assert!(doc.armature_present);
	assert!(doc.is_submodel());
	assert_eq!(doc.meshes[0].name, "sub2_Barrel");
	assert_eq!(doc.meshes[1].name, "sub2_Barrel.001");
	assert_eq!(doc.meshes[2].name.len(), 59);
	assert!(doc.meshes[2].name.starts_with("sub2_LLL"));
}

#[test]
fn duplicate_armature_is_skipped_with_diagnostic() {
	let mut out = ChunkWriter::new();
	skeleton(&mut out, &[BoneSpec::new("Root", u32::MAX)]);
	skeleton(&mut out, &[BoneSpec::new("Root", u32::MAX), BoneSpec::new("Extra", 0)]);

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	assert_eq!(doc.armature.as_ref().map(|armature| armature.len()), Some(1));
	assert!(matches!(doc.diagnostics.as_slice(), [Diagnostic::DuplicateArmature { .. }]));
}

#[test]
fn root_name_forces_root_and_names_are_unique() {
	let mut out = ChunkWriter::new();
	let mut v1 = BoneSpec::new("Arm", 0);
	v1.billboard = None;
	let mut glow = BoneSpec::new("Arm", 0);
	glow.billboard = Some(6);
	let mut bad = BoneSpec::new("Flare", 1);
	bad.billboard = Some(12);
	skeleton(&mut out, &[BoneSpec::new("Root", 3), v1, glow, bad]);

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	let bones = &doc.armature.as_ref().expect("armature").bones;
	assert_eq!(bones[0].parent, None);
	assert_eq!(bones[1].name, "Arm");
	assert_eq!(bones[1].billboard, BillboardMode::Disable);
	assert_eq!(bones[2].name, "Arm.001");
	assert_eq!(bones[2].billboard, BillboardMode::SunlightGlow);
	assert_eq!(bones[3].billboard, BillboardMode::Disable);
	assert_eq!(
		doc.diagnostics,
		vec![Diagnostic::InvalidBillboardMode {
			bone: "Flare".to_owned(),
			value: 12,
		}]
	);
}

#[test]
fn forward_parent_references_are_accepted() {
	let mut out = ChunkWriter::new();
	skeleton(&mut out, &[BoneSpec::new("Root", u32::MAX), BoneSpec::new("Child", 2), BoneSpec::new("Parent", 0)]);

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	let armature = doc.armature.expect("armature");
	assert_eq!(armature.bones[1].parent, Some(2));
	assert_eq!(armature.roots().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn parent_out_of_range_is_fatal() {
	let mut out = ChunkWriter::new();
	skeleton(&mut out, &[BoneSpec::new("Root", u32::MAX), BoneSpec::new("Child", 7)]);

	let err = parse_model(&out.into_bytes()).expect_err("bad parent");
	assert!(matches!(err, AlamoError::InvalidBoneParent { bone: 1, parent: 7, count: 2 }));
}

#[test]
fn parent_cycle_is_fatal() {
	let mut out = ChunkWriter::new();
	skeleton(&mut out, &[BoneSpec::new("A", 1), BoneSpec::new("B", 0)]);

	let err = parse_model(&out.into_bytes()).expect_err("cycle");
	assert!(matches!(err, AlamoError::BoneCycle { bone: 0 }));
}

#[test]
fn unknown_bone_layout_is_unsupported_version() {
	let mut out = ChunkWriter::new();
	out.container(0x200, |skel| {
		let mut header = 1_u32.to_le_bytes().to_vec();
		header.resize(128, 0);
		skel.chunk(0x201, &header);
		skel.container(0x202, |bone| {
			bone.string(0x203, "Root");
			bone.chunk(0x207, &[0; 64]);
		});
	});

	let err = parse_model(&out.into_bytes()).expect_err("bone v3");
	assert!(matches!(err, AlamoError::UnsupportedVersion { found: 0x207, .. }));
}

#[test]
fn missing_name_terminator_is_fatal() {
	let mut out = ChunkWriter::new();
	out.container(0x400, |body| {
		body.chunk(0x401, b"Hull");
	});

	let err = parse_model(&out.into_bytes()).expect_err("no terminator");
	assert!(matches!(err, AlamoError::MissingTerminator { .. }));
}

#[test]
fn spot_light_derives_cone_and_distance() {
	let mut out = ChunkWriter::new();
	light(
		&mut out,
		&LightSpec {
			name: "Beam",
			kind: 2,
			color: [1.0, 1.0, 1.0],
			energy: 3.0,
			far_end: 50.0,
			hotspot: 0.8,
			falloff: std::f32::consts::PI / 2.0,
		},
	);
	light(
		&mut out,
		&LightSpec {
			name: "Odd",
			kind: 9,
			color: [1.0, 1.0, 1.0],
			energy: 1.0,
			far_end: 2.0,
			hotspot: 0.0,
			falloff: 0.0,
		},
	);

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	let beam = &doc.lights[0];
	assert_eq!(beam.kind, LightKind::Spot);
	assert_eq!(beam.distance, 25.0);
	let cone = beam.spot.expect("spot cone");
	assert_eq!(cone.angle, 0.8);
	assert!((cone.blend - 0.4).abs() < 1e-6);

	assert_eq!(doc.lights[1].kind, LightKind::Point);
	assert_eq!(doc.lights[1].spot, None);
	assert!(matches!(doc.diagnostics.as_slice(), [Diagnostic::InvalidLightKind { value: 9, .. }]));
}

#[test]
fn connections_resolve_literally_on_primary() {
	let doc = parse_model(&sample_model()).expect("model parses");
	let armature = doc.armature.clone().expect("armature");
	let resolution = resolve_connections(&doc, &armature);

	assert!(resolution.unresolved.is_empty());
	assert_eq!(resolution.resolved.len(), 3);
	assert_eq!(resolution.resolved[1].object, ObjectRef::Mesh(1));
	assert_eq!(resolution.resolved[1].bone, 1);
	assert!(resolution.resolved.iter().all(|item| item.matched == BoneMatch::Literal));
}

#[test]
fn submodel_connections_fall_back_to_name_heuristic() {
	let mut primary = ChunkWriter::new();
	skeleton(
		&mut primary,
		&[BoneSpec::new("Root", u32::MAX), BoneSpec::new("Turret", 0), BoneSpec::new("Turret_Bone", 1), BoneSpec::new("Hatch", 0)],
	);
	let primary = parse_model(&primary.into_bytes()).expect("primary parses");
	let skeleton_of_primary = primary.armature.expect("armature");

	let mut sub = ChunkWriter::new();
	mesh(&mut sub, "Turret", MeshFlags::default(), &[SubmeshSpec::fan("MeshGloss.fx", 3)]);
	mesh(&mut sub, "Hatch", MeshFlags::default(), &[SubmeshSpec::fan("MeshGloss.fx", 3)]);
	mesh(&mut sub, "Antenna", MeshFlags::default(), &[SubmeshSpec::fan("MeshGloss.fx", 3)]);
	connections(&mut sub, &[(0, 40), (1, 41), (2, 42), (9, 0), (2, 3)], &[]);
	let sub = parse_model_with(&sub.into_bytes(), &ModelOptions::submodel(0), &NoTextures).expect("submodel parses");

	let resolution = resolve_connections(&sub, &skeleton_of_primary);
	let picked: Vec<_> = resolution.resolved.iter().map(|item| (item.connection, item.bone, item.matched)).collect();
	assert_eq!(
		picked,
		vec![(0, 2, BoneMatch::NameHeuristic), (1, 3, BoneMatch::NameHeuristic), (4, 3, BoneMatch::Literal)]
	);
	assert_eq!(resolution.unresolved, vec![2, 3]);
}

#[test]
fn hidden_by_default_covers_helpers_blast_and_lower_lods() {
	let mut out = ChunkWriter::new();
	let plain = || vec![SubmeshSpec::fan("MeshGloss.fx", 3)];
	mesh(&mut out, "HullLOD0", MeshFlags::default(), &plain());
	mesh(&mut out, "HullLOD1", MeshFlags::default(), &plain());
	mesh(&mut out, "HullLOD2", MeshFlags::default(), &plain());
	mesh(&mut out, "Shadow", MeshFlags::default(), &[SubmeshSpec::fan("MeshShadowVolume.fx", 3)]);
	mesh(&mut out, "Blast_01", MeshFlags::default(), &plain());
	mesh(
		&mut out,
		"Flagged",
		MeshFlags {
			hidden: true,
			collision: true,
		},
		&plain(),
	);
	mesh(&mut out, "Deck", MeshFlags::default(), &plain());

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	assert!(doc.meshes[5].collision);
	assert_eq!(doc.hidden_by_default(), vec![true, true, false, true, true, true, false]);
}

#[test]
fn vertex_buffer_shorter_than_header_is_out_of_bounds() {
	let mut out = ChunkWriter::new();
	out.container(0x400, |body| {
		body.string(0x401, "Broken");
		body.container(0x10000, |data| {
			let mut header = [4_u32, 0].iter().flat_map(|value| value.to_le_bytes()).collect::<Vec<_>>();
			header.resize(128, 0);
			data.chunk(0x10001, &header);
			let vertex = VertexSpec {
				pos: [0.0; 3],
				uv: [0.0; 2],
				bone: 0,
			};
			data.chunk(0x10007, &alamo_testkit::vertex_record(&vertex, false));
		});
	});

	let err = parse_model(&out.into_bytes()).expect_err("one vertex of four");
	assert!(matches!(err, AlamoError::OutOfBounds { need: 144, rem: 0, .. }));
}

#[test]
fn proxy_flags_decode_when_set() {
	let mut out = ChunkWriter::new();
	connections(
		&mut out,
		&[],
		&[ProxySpec {
			name: "Exhaust".to_owned(),
			bone: 2,
			hidden: true,
			alt_decrease_stay_hidden: true,
		}],
	);
	let doc = parse_model(&out.into_bytes()).expect("model parses");

	let proxy = &doc.proxies[0];
	assert_eq!(proxy.name, "Exhaust");
	assert_eq!(proxy.bone, 2);
	assert!(proxy.hidden);
	assert!(proxy.alt_decrease_stay_hidden);
	assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);
}

#[test]
fn declared_connection_counts_are_checked() {
	let mut counts = MiniWriter::new();
	counts.u32(1, 2).u32(4, 1);
	let mut link = MiniWriter::new();
	link.u32(2, 0).u32(3, 0);

	let mut out = ChunkWriter::new();
	out.container(0x600, |conn| {
		conn.chunk(0x601, &counts.into_bytes());
		conn.chunk(0x602, &link.into_bytes());
	});
	let doc = parse_model(&out.into_bytes()).expect("model parses");

	assert_eq!(doc.connections.len(), 1);
	assert_eq!(
		doc.diagnostics,
		vec![Diagnostic::ConnectionCountMismatch {
			declared: 2,
			declared_proxies: 1,
			found: 1,
			found_proxies: 0,
		}]
	);
}

#[test]
fn oversized_face_count_is_out_of_bounds() {
	let mut out = ChunkWriter::new();
	out.container(0x400, |mesh| {
		mesh.string(0x401, "Broken");
		mesh.container(0x10000, |data| {
			data.chunk(0x10001, &u32s(&[0, u32::MAX]));
			data.chunk(0x10004, &u16s(&[0, 1, 2]));
		});
	});

	let err = parse_model(&out.into_bytes()).expect_err("face count exceeds index buffer");
	assert!(matches!(err, AlamoError::OutOfBounds { need: 2, rem: 0, .. }));
}

#[test]
fn vertex_offset_follows_vertices_actually_read() {
	let mut out = ChunkWriter::new();
	out.container(0x400, |mesh| {
		mesh.string(0x401, "Hull");
		mesh.container(0x10000, |data| {
			data.chunk(0x10001, &u32s(&[u32::MAX, 0]));
		});
		mesh.container(0x10000, |data| {
			data.chunk(0x10001, &u32s(&[0, 1]));
			data.chunk(0x10004, &u16s(&[1, 1, 1]));
		});
	});

	let doc = parse_model(&out.into_bytes()).expect("model parses");
	let hull = &doc.meshes[0];
	assert!(hull.submeshes[0].vertices.is_empty());
	assert_eq!(hull.submeshes[1].faces, vec![[1, 1, 1]]);
}

#[test]
fn colliding_long_bone_names_stay_within_limit() {
	let long = "B".repeat(62);
	let mut out = ChunkWriter::new();
	skeleton(&mut out, &[BoneSpec::new("Root", u32::MAX), BoneSpec::new(&long, 0), BoneSpec::new(&long, 0)]);
	let armature = parse_model(&out.into_bytes()).expect("model parses").armature.expect("armature");

	let lengths: Vec<_> = armature.bones.iter().map(|bone| bone.name.len()).collect();
	assert_eq!(lengths, vec![4, 62, 63]);
	assert!(armature.bones[2].name.ends_with(".001"));
}
