//! Public library API for decoding Alamo engine `.alo` models and `.ala` animations.

/// Chunk framing, model and animation decoding, name and submodel helpers.
pub mod format;
