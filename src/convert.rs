//! Working-tree content conversion seam.
//!
//! Archive content for regular files passes through a [`ContentTransform`]
//! before keyword substitution, mirroring git's checkout conversion point.
//! This crate ships only the identity transform; smudge-style filters plug
//! in through the trait.

use crate::error::Result;

/// Converts raw blob bytes into their working-tree form for a given path.
pub trait ContentTransform {
    fn convert(&self, path: &str, data: Vec<u8>) -> Result<Vec<u8>>;
}

/// The do-nothing transform: archive content is the raw blob content.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ContentTransform for Identity {
    fn convert(&self, _path: &str, data: Vec<u8>) -> Result<Vec<u8>> {
        Ok(data)
    }
}
