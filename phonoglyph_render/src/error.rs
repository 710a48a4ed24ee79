// Errors surfaced by the render crate and the `phonoglyph` binary.
//
// Lexicon and geometry failures are wrapped unchanged so the binary can
// report them with their original messages. Rendering itself has no failure
// modes of its own beyond I/O on the output sink.

use std::io;
use std::path::PathBuf;

use phonoglyph_lexicon::LexiconError;
use thiserror::Error;

use crate::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("invalid layout config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
