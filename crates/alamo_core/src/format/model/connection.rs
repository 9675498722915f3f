use crate::format::diag::record;
use crate::format::tags::{CONNECTION, CONNECTION_COUNTS, PROXY};
use crate::format::{Armature, Cursor, Diagnostic, Dispatch, ModelDocument, ObjectRef, Result, read_mini_chunks, walk_chunks};

/// Object and proxy counts from the connections header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionCounts {
	/// Declared object connections.
	pub objects: u32,
	/// Declared proxies.
	pub proxies: u32,
}

/// Attachment of an object to a skeleton bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
	/// Index into the document's object list (meshes and lights in file order).
	pub object: u32,
	/// Stored bone index.
	pub bone: u32,
}

/// Named attachment point on a bone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
	/// Proxy name.
	pub name: String,
	/// Bone index.
	pub bone: u32,
	/// Starts hidden.
	pub hidden: bool,
	/// Stays hidden when the engine lowers detail.
	pub alt_decrease_stay_hidden: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ConnectionChunk {
	pub(crate) counts: Option<ConnectionCounts>,
	pub(crate) connections: Vec<Connection>,
	pub(crate) proxies: Vec<Proxy>,
}

/// Decode a connections container.
pub(crate) fn parse_connections(body: &mut Cursor<'_>, diagnostics: &mut Vec<Diagnostic>) -> Result<ConnectionChunk> {
	let mut out = ConnectionChunk::default();

	walk_chunks(body, |header, chunk| {
		match header.tag {
			CONNECTION_COUNTS => {
				// Records are positional; some exporters append an extra value.
				let minis = read_mini_chunks(chunk)?;
				let mut values = minis.iter();
				let objects = match values.next() {
					Some(mini) => mini.u32()?,
					None => 0,
				};
				let proxies = match values.next() {
					Some(mini) => mini.u32()?,
					None => 0,
				};
				out.counts = Some(ConnectionCounts { objects, proxies });
			}
			CONNECTION => {
				let minis = read_mini_chunks(chunk)?;
				let (Some(object), Some(bone)) = (minis.first(), minis.get(1)) else {
					tracing::debug!(offset = header.offset, "connection record without object or bone");
					return Ok(Dispatch::Handled);
				};
				out.connections.push(Connection {
					object: object.u32()?,
					bone: bone.u32()?,
				});
			}
			PROXY => {
				let mut proxy = Proxy {
					name: String::new(),
					bone: 0,
					hidden: false,
					alt_decrease_stay_hidden: false,
				};
				for mini in read_mini_chunks(chunk)? {
					match mini.id {
						1 => proxy.name = mini.string()?,
						2 => proxy.bone = mini.u32()?,
						7 => proxy.hidden = mini.u32()? == 1,
						8 => proxy.alt_decrease_stay_hidden = mini.u32()? == 1,
						_ => {}
					}
				}
				out.proxies.push(proxy);
			}
			_ => return Ok(Dispatch::Skip),
		}
		Ok(Dispatch::Handled)
	})?;

	if let Some(counts) = out.counts {
		if counts.objects as usize != out.connections.len() || counts.proxies as usize != out.proxies.len() {
			record(
				diagnostics,
				Diagnostic::ConnectionCountMismatch {
					declared: counts.objects,
					declared_proxies: counts.proxies,
					found: out.connections.len(),
					found_proxies: out.proxies.len(),
				},
			);
		}
	}

	Ok(out)
}

/// How a connection found its bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoneMatch {
	/// The stored bone index was used as-is.
	Literal,
	/// Heuristic for submodel meshes: the object name minus its `sub<N>_`
	/// prefix equals a bone name, preferring a `<name>_Bone` bone. It can pick
	/// the wrong bone when unrelated bones share a name with a mesh.
	NameHeuristic,
}

/// A connection attached to a bone of the target skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConnection {
	/// Index into [`ModelDocument::connections`].
	pub connection: usize,
	/// Attached object.
	pub object: ObjectRef,
	/// Bone index in the target skeleton.
	pub bone: usize,
	/// Which rule matched.
	pub matched: BoneMatch,
}

/// Outcome of [`resolve_connections`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionResolution {
	/// Connections with a bone.
	pub resolved: Vec<ResolvedConnection>,
	/// Indices into [`ModelDocument::connections`] that matched nothing.
	pub unresolved: Vec<usize>,
}

/// Attach each connection of `doc` to a bone of `skeleton`.
///
/// The stored bone index wins whenever it is inside `skeleton`. Submodel
/// documents then fall back to [`BoneMatch::NameHeuristic`] for mesh objects.
/// Connections with an object index outside the document stay unresolved.
pub fn resolve_connections(doc: &ModelDocument, skeleton: &Armature) -> ConnectionResolution {
	let mut out = ConnectionResolution::default();

	for (index, connection) in doc.connections.iter().enumerate() {
		let Some(object) = doc.objects.get(connection.object as usize).copied() else {
			out.unresolved.push(index);
			continue;
		};

		let literal = (connection.bone as usize) < skeleton.len();
		let found = if literal {
			Some((connection.bone as usize, BoneMatch::Literal))
		} else if doc.is_submodel() {
			match object {
				ObjectRef::Mesh(mesh) => doc
					.meshes
					.get(mesh)
					.and_then(|mesh| match_by_name(&mesh.name, skeleton))
					.map(|bone| (bone, BoneMatch::NameHeuristic)),
				ObjectRef::Light(_) => None,
			}
		} else {
			None
		};

		match found {
			Some((bone, matched)) => out.resolved.push(ResolvedConnection {
				connection: index,
				object,
				bone,
				matched,
			}),
			None => out.unresolved.push(index),
		}
	}

	out
}

fn match_by_name(object_name: &str, skeleton: &Armature) -> Option<usize> {
	let (_, stripped) = object_name.split_once('_')?;
	let base = skeleton.find(stripped)?;
	Some(skeleton.find(&format!("{stripped}_Bone")).unwrap_or(base))
}
