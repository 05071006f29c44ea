/// Error taxonomy for the pipeline, matching the fallible entry points of
/// [`crate::pipeline::analyze`] and [`crate::face::Face`] construction.
///
/// `NoCoveringFont` and `ShaperDegenerate` are deliberately absent: the
/// former is recorded on the affected [`crate::itemize::Run`] as a `None`
/// font and logged rather than raised, and the latter is not distinguished
/// from a successful shape — callers inspect the returned glyph buffer with
/// [`crate::shape::GlyphBuffer::is_degenerate`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The font blob could not be parsed as a recognizable sfnt container.
  #[error("blob is not a recognizable font")]
  InvalidFont,
  /// The bidirectional-analysis collaborator reported failure.
  #[error("bidirectional analysis failed")]
  BidiFailed,
  /// Input exceeded the fixed codepoint working buffer.
  #[error("input of {len} codepoints exceeds the {limit}-codepoint working buffer")]
  TooLarge { len: usize, limit: usize },
  /// A font file could not be read from disk.
  #[error("failed to read font file: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
