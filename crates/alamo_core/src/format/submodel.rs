//! Sibling file discovery by naming convention.
//!
//! A model `tank.alo` owns submodels such as `tank_turret.alo` and animations
//! such as `tank_idle.ala` in the same directory.

/// Split `file` into stem and lowercase extension (without the dot).
fn split_ext(file: &str) -> (&str, String) {
	match file.rsplit_once('.') {
		Some((stem, ext)) => (stem, ext.to_ascii_lowercase()),
		None => (file, String::new()),
	}
}

fn stem(file: &str) -> &str {
	split_ext(file).0
}

/// Submodel files of `primary` in `listing`, in listing order.
///
/// A submodel is an `.alo` entry whose stem extends the primary stem and has
/// more `_`-separated segments. Entries whose last segment starts with `d` or
/// `D` are damage or alternate variants and are left out.
pub fn resolve_submodels<S: AsRef<str>>(listing: &[S], primary: &str) -> Vec<String> {
	let base = stem(primary);
	let depth = base.split('_').count();

	listing
		.iter()
		.map(AsRef::as_ref)
		.filter(|entry| {
			let (item, ext) = split_ext(entry);
			if ext != "alo" || item == base || !item.starts_with(base) {
				return false;
			}
			let segments: Vec<&str> = item.split('_').collect();
			let variant = segments.last().is_some_and(|last| last.starts_with(['d', 'D']));
			segments.len() > depth && !variant
		})
		.map(str::to_owned)
		.collect()
}

/// Animation files of `model` in `listing`, in listing order.
///
/// Candidates are `.ala` entries whose stem starts with the model stem. A
/// candidate is dropped when another candidate's stem extends it.
pub fn resolve_animations<S: AsRef<str>>(listing: &[S], model: &str) -> Vec<String> {
	let base = stem(model);
	let candidates: Vec<&str> = listing
		.iter()
		.map(AsRef::as_ref)
		.filter(|entry| {
			let (item, ext) = split_ext(entry);
			ext == "ala" && item.starts_with(base)
		})
		.collect();

	candidates
		.iter()
		.filter(|entry| {
			let item = stem(entry);
			!candidates.iter().any(|other| {
				let other = stem(other);
				other.len() > item.len() && other.starts_with(item)
			})
		})
		.map(|entry| (*entry).to_owned())
		.collect()
}

/// Action name of an animation file: its stem minus the `<model>_` prefix.
pub fn animation_name(model: &str, file: &str) -> String {
	let base = stem(model);
	let item = stem(file);
	match item.strip_prefix(base).and_then(|rest| rest.get(1..)) {
		Some(rest) if !rest.is_empty() => rest.to_owned(),
		_ => item.to_owned(),
	}
}
