//! Bake errors

use thiserror::Error;

use crate::bake::persistence::PersistenceError;
use crate::render::target::RenderError;

/// Errors that abort a bake
///
/// A bake either returns a complete bundle or one of these; nothing partial is
/// ever handed out. An object without geometry is not an error.
#[derive(Error, Debug)]
pub enum BakeError {
    /// No source object was supplied
    #[error("No source object to bake")]
    MissingInput,

    /// The render environment lacks a shader the bake needs
    #[error("Required shader unavailable: {0}")]
    MissingCapability(String),

    /// Capture or compositing failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Storing the bake output failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}
