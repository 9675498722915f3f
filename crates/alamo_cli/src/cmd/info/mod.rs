use std::path::PathBuf;

use alamo::format::{Armature, ModelDocument, ModelOptions, NoTextures, Result, TextureDir, TextureLookup, parse_model_with, resolve_connections};

use crate::cmd::util::{diagnostic_lines, emit_json, print_diagnostics};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Directory to check material textures against.
	#[arg(long)]
	pub textures: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Print armature, mesh, light and connection summaries of one model.
pub fn run(args: Args) -> Result<()> {
	let Args { path, textures, json } = args;

	let bytes = std::fs::read(&path)?;
	let lookup: Box<dyn TextureLookup> = match textures {
		Some(dir) => Box::new(TextureDir::new(dir)),
		None => Box::new(NoTextures),
	};
	let doc = parse_model_with(&bytes, &ModelOptions::primary(), &*lookup)?;

	if json {
		emit_json(&info_json(&path, &doc));
		return Ok(());
	}

	println!("path: {}", path.display());
	match &doc.armature {
		Some(armature) => print_armature(armature),
		None => println!("bones: 0"),
	}

	let hidden = doc.hidden_by_default();
	println!("meshes: {}", doc.meshes.len());
	for (mesh, hidden) in doc.meshes.iter().zip(hidden) {
		let shader = mesh.primary_shader().map_or("-", |shader| shader.as_str());
		let flag = if hidden { " hidden" } else { "" };
		println!(
			"  {}: {} submeshes, {} vertices, {} faces, {shader}{flag}",
			mesh.name,
			mesh.submeshes.len(),
			mesh.vertex_count(),
			mesh.face_count()
		);
	}

	println!("lights: {}", doc.lights.len());
	for light in &doc.lights {
		println!("  {}: {} energy={} distance={}", light.name, light.kind.as_str(), light.energy, light.distance);
	}

	println!("connections: {}", doc.connections.len());
	if let Some(armature) = &doc.armature {
		let resolution = resolve_connections(&doc, armature);
		for item in &resolution.resolved {
			let object = doc.object_name(doc.connections[item.connection].object as usize).unwrap_or("?");
			let bone = armature.get(item.bone).map_or("?", |bone| bone.name.as_str());
			println!("  {object} -> {bone}");
		}
		for index in &resolution.unresolved {
			println!("  connection {index} unresolved");
		}
	}

	println!("proxies: {}", doc.proxies.len());
	for proxy in &doc.proxies {
		let bone = doc.armature.as_ref().and_then(|armature| armature.get(proxy.bone as usize));
		println!("  {} -> {}", proxy.name, bone.map_or("?", |bone| bone.name.as_str()));
	}

	print_diagnostics("", &doc.diagnostics);
	Ok(())
}

fn print_armature(armature: &Armature) {
	println!("bones: {}", armature.len());
	for bone in &armature.bones {
		let parent = bone.parent.and_then(|parent| armature.get(parent)).map_or("-", |parent| parent.name.as_str());
		println!("  {} parent={parent} billboard={}", bone.name, bone.billboard.as_str());
	}
}

pub(crate) fn info_json(path: &std::path::Path, doc: &ModelDocument) -> InfoJson {
	let hidden = doc.hidden_by_default();
	let resolution = doc.armature.as_ref().map(|armature| resolve_connections(doc, armature));

	InfoJson {
		path: path.display().to_string(),
		armature_present: doc.armature_present,
		bones: doc
			.armature
			.iter()
			.flat_map(|armature| armature.bones.iter())
			.map(|bone| BoneJson {
				name: bone.name.clone(),
				parent: bone.parent,
				visible: bone.visible,
				billboard: bone.billboard.as_str(),
			})
			.collect(),
		meshes: doc
			.meshes
			.iter()
			.zip(hidden)
			.map(|(mesh, hidden_by_default)| MeshJson {
				name: mesh.name.clone(),
				hidden: mesh.hidden,
				hidden_by_default,
				collision: mesh.collision,
				vertices: mesh.vertex_count(),
				faces: mesh.face_count(),
				submeshes: mesh
					.submeshes
					.iter()
					.map(|submesh| SubMeshJson {
						shader: submesh.material.shader.as_str(),
						vertices: submesh.vertices.len(),
						faces: submesh.faces.len(),
						mapping: submesh.animation_mapping.len(),
					})
					.collect(),
			})
			.collect(),
		lights: doc
			.lights
			.iter()
			.map(|light| LightJson {
				name: light.name.clone(),
				kind: light.kind.as_str(),
				color: light.color,
				energy: light.energy,
				distance: light.distance,
			})
			.collect(),
		connections: ConnectionsJson {
			declared_objects: doc.connection_counts.map(|counts| counts.objects),
			declared_proxies: doc.connection_counts.map(|counts| counts.proxies),
			count: doc.connections.len(),
			resolved: resolution.as_ref().map_or(0, |resolution| resolution.resolved.len()),
			unresolved: resolution.map_or_else(Vec::new, |resolution| resolution.unresolved),
		},
		proxies: doc
			.proxies
			.iter()
			.map(|proxy| ProxyJson {
				name: proxy.name.clone(),
				bone: proxy.bone,
				hidden: proxy.hidden,
			})
			.collect(),
		diagnostics: diagnostic_lines(&doc.diagnostics),
	}
}

#[derive(serde::Serialize)]
pub(crate) struct InfoJson {
	path: String,
	armature_present: bool,
	bones: Vec<BoneJson>,
	meshes: Vec<MeshJson>,
	lights: Vec<LightJson>,
	connections: ConnectionsJson,
	proxies: Vec<ProxyJson>,
	diagnostics: Vec<String>,
}

#[derive(serde::Serialize)]
struct BoneJson {
	name: String,
	parent: Option<usize>,
	visible: bool,
	billboard: &'static str,
}

#[derive(serde::Serialize)]
struct MeshJson {
	name: String,
	hidden: bool,
	hidden_by_default: bool,
	collision: bool,
	vertices: usize,
	faces: usize,
	submeshes: Vec<SubMeshJson>,
}

#[derive(serde::Serialize)]
struct SubMeshJson {
	shader: &'static str,
	vertices: usize,
	faces: usize,
	mapping: usize,
}

#[derive(serde::Serialize)]
struct LightJson {
	name: String,
	kind: &'static str,
	color: [f32; 3],
	energy: f32,
	distance: f32,
}

#[derive(serde::Serialize)]
struct ConnectionsJson {
	declared_objects: Option<u32>,
	declared_proxies: Option<u32>,
	count: usize,
	resolved: usize,
	unresolved: Vec<usize>,
}

#[derive(serde::Serialize)]
struct ProxyJson {
	name: String,
	bone: u32,
	hidden: bool,
}

#[cfg(test)]
mod tests;
