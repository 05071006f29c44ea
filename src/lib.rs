//! A minimal text-layout engine: given a run of user text, a set of
//! installed fonts, and a base direction, produces a sequence of shaped
//! runs — contiguous slices of text annotated with font, bidi embedding
//! level, script, East-Asian width, and final glyph positions — for an
//! external 2D renderer to draw.
//!
//! [`pipeline::analyze`] is the single entry point. The pipeline stages:
//! - [`face`]: load and classify font faces, then score and prune a
//!   fallback set against a target face.
//! - [`bidi`]: logical-to-visual reorder plus per-codepoint embedding
//!   levels (thin wrapper over `unicode-bidi`).
//! - [`itemize`]: split visual-order text into runs sharing level, script,
//!   width class and font.
//! - [`shape`]: invoke the OpenType shaper (`rustybuzz`) per run.
//!
//! Unicode property lookup, bidi analysis, and glyph shaping are treated
//! as opaque external collaborators; rendering glyphs to pixels is
//! entirely out of scope — this crate's surface ends at [`shape::GlyphBuffer`].

pub mod bidi;
pub mod codepoint;
pub mod error;
pub mod face;
pub mod itemize;
pub mod pipeline;
pub mod score;
pub mod shape;

pub use codepoint::{is_space, is_variant_sel, script_of, utf8_to_codepoints, width_of, Width};
pub use error::{Error, Result};
pub use face::{Face, FaceId, FaceLoader, FaceSet, Serif, Spacing};
pub use itemize::{itemize, Run, Runs};
pub use pipeline::{analyze, PipelineOptions, MAX_CODEPOINTS};
pub use score::compare_fonts;
pub use shape::{GlyphBuffer, GlyphInfo, GlyphPosition};
