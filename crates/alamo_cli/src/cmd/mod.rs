/// Animation summary command.
pub mod anim;
/// Model set import command.
pub mod import;
/// Model summary command.
pub mod info;
/// Sibling file discovery command.
pub mod submodels;

#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod util;
