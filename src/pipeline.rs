//! Pipeline Facade (spec §4.5): the single entry point wiring bidi
//! resolution, itemization and shaping together.

use icu_locid::LanguageIdentifier;

use crate::bidi;
use crate::error::{Error, Result};
use crate::face::FaceSet;
use crate::itemize::{self, Runs};
use crate::shape;

/// Fixed codepoint working-buffer cap (spec §9 "Fixed-size working
/// buffers"): inputs longer than this are rejected with
/// [`Error::TooLarge`] rather than grown dynamically. The original's
/// literal `4096`; preserved as a documented limit, not grown away, since
/// the spec only mandates *an* error on overflow, not a particular cap
/// value.
pub const MAX_CODEPOINTS: usize = 4096;

/// Caller-supplied knobs for [`analyze`]. Replaces the original's
/// process-wide fontconfig state (spec §9 "Global font configuration")
/// with an explicit value constructed per call — no process-wide state.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
  /// Language used to resolve unified (Han-unified) codepoints during
  /// shaping. Unused by the itemizer itself — script is derived per
  /// codepoint, not from this.
  pub language: LanguageIdentifier,
  /// Pixel size baked into the shaper's hinted metrics; 0 disables
  /// hinting.
  pub font_size_px: u16,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    PipelineOptions { language: "und".parse().expect("\"und\" is a valid language identifier"), font_size_px: 0 }
  }
}

/// Top-level entry point (spec §4.5, §6 `analyze`): codepoints + face set +
/// options -> shaped runs.
///
/// Runs a fixed pipeline: bidi with `base = LTR` to get visual-order
/// codepoints and levels, then itemization, then shaping. Ownership of the
/// resulting runs belongs to the caller; they borrow `faces` for their
/// `font` field, so `faces` must outlive the returned run collection.
pub fn analyze<'a>(codepoints: &[u32], faces: &'a FaceSet, options: &PipelineOptions) -> Result<Runs<'a>> {
  if codepoints.len() > MAX_CODEPOINTS {
    return Err(Error::TooLarge { len: codepoints.len(), limit: MAX_CODEPOINTS });
  }

  let (visual_codepoints, levels) = bidi::resolve(codepoints)?;
  let mut runs = itemize::itemize(&visual_codepoints, &levels, faces);
  shape::shape_runs(&visual_codepoints, &mut runs, &options.language, options.font_size_px);
  Ok(runs)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::face::{Face, Serif, Spacing};

  fn latin_face() -> Face { Face::for_test(0x20u32..=0x7E, false, true, Spacing::Proportional, false, 100.0, 80.0, 0.0, false, Serif::Sans) }

  #[test]
  fn empty_input_yields_zero_runs() {
    let faces = FaceSet::new(vec![latin_face()]);
    let runs = analyze(&[], &faces, &PipelineOptions::default()).unwrap();
    assert!(runs.is_empty());
  }

  #[test]
  fn oversized_input_is_rejected() {
    let faces = FaceSet::new(vec![latin_face()]);
    let codepoints = vec!['a' as u32; MAX_CODEPOINTS + 1];
    let err = analyze(&codepoints, &faces, &PipelineOptions::default()).unwrap_err();
    assert!(matches!(err, Error::TooLarge { .. }));
  }

  #[test]
  fn simple_latin_text_shapes_to_one_run() {
    let faces = FaceSet::new(vec![latin_face()]);
    let codepoints: Vec<u32> = "hi".chars().map(|c| c as u32).collect();
    let runs = analyze(&codepoints, &faces, &PipelineOptions::default()).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!((runs[0].start, runs[0].end), (0, 2));
    assert_eq!(runs[0].level, 0);
  }
}
