//! Itemizer (spec §4.3): walks visual-order codepoints and splits them into
//! [`Run`]s on changes in bidi level, script, width class, or selected
//! font, treating whitespace and variation selectors as sticky.

use smallvec::SmallVec;

use crate::codepoint::{is_space, is_variant_sel, script_of, width_of, Width};
use crate::face::{Face, FaceSet};
use crate::shape::GlyphBuffer;

/// Sentinel priority for "no face in the set covers this codepoint",
/// mirroring the original's `0xFFFFFFFF` ("hope you dont have more than 4b
/// fonts").
pub const NO_FONT_PRIORITY: usize = usize::MAX;

/// Most shaped text is a handful of runs (one script/font/direction
/// change every few words); inline storage for that common case avoids a
/// heap allocation per call. Spills to the heap past this, same as the
/// `SmallVec<[_; 1]>` pattern the wider workspace uses for its own
/// small-is-common collections — the spec's documented 256-run cap (§9)
/// is not enforced as a hard limit, just sized well past this inline
/// capacity.
pub type Runs<'a> = SmallVec<[Run<'a>; 8]>;

/// A contiguous slice of the visual-order codepoint sequence sharing bidi
/// level, script, width class and font (spec §3).
#[derive(Debug)]
pub struct Run<'a> {
  pub start: usize,
  pub end: usize,
  pub level: u8,
  pub script: &'static str,
  pub width: Width,
  pub font: Option<&'a Face>,
  pub font_priority: usize,
  /// Pixels-per-em baked into the shaped metrics; 0 until the Shaper
  /// Orchestrator runs, and means "no hinting" even afterward.
  pub ppem: u16,
  /// Present only once the Shaper Orchestrator has run this run.
  pub glyphs: Option<GlyphBuffer>,
}

/// The first (lowest-index, highest-priority) face in `faces` whose
/// coverage includes `rune`, and its index. `(None, NO_FONT_PRIORITY)` if
/// no face covers it.
fn choose_font_for<'a>(rune: u32, faces: &'a FaceSet) -> (Option<&'a Face>, usize) {
  for (i, face) in faces.into_iter().enumerate() {
    if face.covers(rune) {
      return (Some(face), i);
    }
  }
  (None, NO_FONT_PRIORITY)
}

struct Iter<'a> {
  width: Width,
  script: &'static str,
  level: u8,
  font: Option<&'a Face>,
  font_priority: usize,
}

/// Walk visual-order `codepoints` (with parallel bidi `levels`) and split
/// them into runs over `faces` (spec §4.3).
///
/// Returns one run per maximal span of shared level/script/width-class/font,
/// tiling `[0, codepoints.len())` with no gaps or overlaps. Runs carry a
/// borrow of the face that itemized them; the itemizer never mutates
/// `faces`, which is why sorting/pruning happens before this is called.
pub fn itemize<'a>(codepoints: &[u32], levels: &[u8], faces: &'a FaceSet) -> Runs<'a> {
  let mut runs = Runs::new();
  if codepoints.is_empty() {
    return runs;
  }

  let mut at = 0usize;
  while at < codepoints.len() && is_space(codepoints[at]) {
    at += 1;
  }
  if at >= codepoints.len() {
    // Input is entirely whitespace: the original walk reads past the end
    // of the runes array here (it has no bounds check on the skip loop).
    // We define the sane boundary instead (spec §8: "Single whitespace
    // codepoint -> one run with possibly-null font"): one run over the
    // whole input, seeded from its first codepoint.
    let (font, font_priority) = choose_font_for(codepoints[0], faces);
    push_run(&mut runs, 0, codepoints.len(), levels[0], script_of(codepoints[0]), width_of(codepoints[0]), font, font_priority);
    return runs;
  }

  // The first emitted run starts at 0, not at the post-skip position:
  // leading whitespace is absorbed into whichever run follows it, the
  // same way interior whitespace is absorbed into the run it falls inside
  // (spec §8 invariant 4's "right-neighbor for leading whitespace").
  let mut run_start = 0usize;
  let (font, font_priority) = choose_font_for(codepoints[at], faces);
  let mut iter = Iter { width: width_of(codepoints[at]), script: script_of(codepoints[at]), level: levels[at], font, font_priority };

  at += 1;
  while at < codepoints.len() {
    let rune = codepoints[at];

    // Whitespace and variation selectors never evaluate a change, never
    // advance the run boundary: the current run absorbs them.
    if is_space(rune) || is_variant_sel(rune) {
      at += 1;
      continue;
    }

    if iter.font.is_none() {
      // The run was seeded on whitespace with no font yet; pick one now
      // without marking a change.
      let (font, font_priority) = choose_font_for(rune, faces);
      iter.font = font;
      iter.font_priority = font_priority;
    }

    let cand_width = width_of(rune);
    let mut changed = iter.width == Width::Ambiguous && !matches!(cand_width, Width::Ambiguous | Width::Neutral);

    let mut cand_font = None;
    let mut cand_font_priority = NO_FONT_PRIORITY;
    if let Some(current) = iter.font {
      let (face, priority) = choose_font_for(rune, faces);
      if let Some(face) = face {
        if priority < iter.font_priority || !current.covers(rune) {
          changed = true;
          cand_font = Some(face);
          cand_font_priority = priority;
        }
      }
    }

    let cand_script = script_of(rune);
    changed |= iter.script != cand_script;

    let cand_level = levels[at];
    changed |= iter.level != cand_level;

    if changed {
      push_run(&mut runs, run_start, at, iter.level, iter.script, iter.width, iter.font, iter.font_priority);

      run_start = at;
      iter.width = cand_width;
      iter.script = cand_script;
      iter.level = cand_level;
      iter.font = cand_font;
      iter.font_priority = cand_font_priority;
      if iter.font.is_none() && !is_space(rune) {
        let (font, font_priority) = choose_font_for(rune, faces);
        iter.font = font;
        iter.font_priority = font_priority;
      }
    }

    at += 1;
  }

  push_run(&mut runs, run_start, at, iter.level, iter.script, iter.width, iter.font, iter.font_priority);
  runs
}

fn push_run<'a>(runs: &mut Runs<'a>, start: usize, end: usize, level: u8, script: &'static str, width: Width, font: Option<&'a Face>, font_priority: usize) {
  if font.is_none() {
    log::warn!("no face covers any non-space codepoint in run [{start}, {end})");
  }
  runs.push(Run { start, end, level, script, width, font, font_priority, ppem: 0, glyphs: None });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::face::{Serif, Spacing};

  fn latin_face() -> Face {
    Face::for_test(0x20u32..=0x7E, false, true, Spacing::Proportional, false, 100.0, 80.0, 0.0, false, Serif::Sans)
  }

  fn cjk_face() -> Face {
    Face::for_test(0x3040u32..=0x30FF, false, true, Spacing::Proportional, false, 100.0, 80.0, 0.0, false, Serif::Sans)
  }

  fn codepoints(s: &str) -> Vec<u32> { s.chars().map(|c| c as u32).collect() }

  #[test]
  fn empty_input_yields_no_runs() {
    let faces = FaceSet::new(vec![latin_face()]);
    assert!(itemize(&[], &[], &faces).is_empty());
  }

  #[test]
  fn s1_simple_latin_text_is_one_run() {
    let cps = codepoints("hi");
    let levels = vec![0u8; cps.len()];
    let faces = FaceSet::new(vec![latin_face()]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 1);
    assert_eq!((runs[0].start, runs[0].end), (0, 2));
    assert_eq!(runs[0].level, 0);
    assert_eq!(runs[0].script, "Latn");
    assert!(runs[0].font.is_some());
  }

  #[test]
  fn s3_font_change_splits_a_run_but_space_stays_attached() {
    let cps = codepoints("ab \u{3042}");
    let levels = vec![0u8; cps.len()];
    let faces = FaceSet::new(vec![latin_face(), cjk_face()]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 2);
    assert_eq!((runs[0].start, runs[0].end), (0, 3));
    assert_eq!((runs[1].start, runs[1].end), (3, 4));
  }

  #[test]
  fn s4_variation_selector_does_not_split_a_run() {
    let mut cps = codepoints("a");
    cps.push(0xFE0F);
    cps.push('b' as u32);
    let levels = vec![0u8; cps.len()];
    let faces = FaceSet::new(vec![latin_face()]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 1);
    assert_eq!((runs[0].start, runs[0].end), (0, 3));
  }

  #[test]
  fn all_rtl_input_keeps_odd_level_in_one_run() {
    let cps: Vec<u32> = vec![0x05DD, 0x05D5, 0x05DC, 0x05E9];
    let levels = vec![1u8; cps.len()];
    let hebrew = Face::for_test(0x0590u32..=0x05FF, false, true, Spacing::Proportional, false, 100.0, 80.0, 0.0, false, Serif::Sans);
    let faces = FaceSet::new(vec![hebrew]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].level % 2, 1);
    assert_eq!((runs[0].start, runs[0].end), (0, 4));
  }

  #[test]
  fn single_whitespace_codepoint_is_one_run() {
    // No face covers space here, so the run also exercises the null-font
    // path for an all-whitespace input.
    let cps = vec![0x0020u32];
    let levels = vec![0u8];
    let faces = FaceSet::new(vec![Face::for_test(0x21u32..=0x7E, false, true, Spacing::Proportional, false, 100.0, 80.0, 0.0, false, Serif::Sans)]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 1);
    assert_eq!((runs[0].start, runs[0].end), (0, 1));
    assert!(runs[0].font.is_none());
  }

  #[test]
  fn uncovered_codepoint_yields_null_font_run() {
    let cps = vec![0x05D0u32];
    let levels = vec![0u8];
    let faces = FaceSet::new(vec![latin_face()]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 1);
    assert!(runs[0].font.is_none());
  }

  #[test]
  fn leading_whitespace_is_skipped_before_seeding_the_walk() {
    let cps = codepoints("  hi");
    let levels = vec![0u8; cps.len()];
    let faces = FaceSet::new(vec![latin_face()]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 1);
    assert_eq!((runs[0].start, runs[0].end), (0, 4));
  }

  #[test]
  fn bidi_level_change_splits_a_run() {
    let cps = codepoints("ab");
    let levels = vec![0u8, 1u8];
    let faces = FaceSet::new(vec![latin_face()]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].level, 0);
    assert_eq!(runs[1].level, 1);
  }

  #[test]
  fn ambiguous_to_narrow_transition_splits_but_not_the_reverse() {
    // U+00B1 (±) and U+0024 ($) are both script `Zyyy` (Common), so this
    // isolates the width-only transition rule from script changes. ± is
    // East-Asian-Width Ambiguous, $ is Narrow: Ambiguous -> Narrow must
    // split, but a run already resolved away from Ambiguous must not split
    // again on a later Ambiguous codepoint.
    let cps = vec![0x00B1u32, 0x0024, 0x00B1];
    let levels = vec![0u8; 3];
    let faces = FaceSet::new(vec![Face::for_test(0u32..=0x1000, false, true, Spacing::Proportional, false, 100.0, 80.0, 0.0, false, Serif::Sans)]);
    let runs = itemize(&cps, &levels, &faces);
    assert_eq!(runs.len(), 2);
    assert_eq!((runs[0].start, runs[0].end), (0, 1));
    assert_eq!((runs[1].start, runs[1].end), (1, 3));
  }

  #[test]
  fn tiles_input_contiguously_with_no_gaps() {
    let cps = codepoints("ab \u{3042}c");
    let levels = vec![0u8; cps.len()];
    let faces = FaceSet::new(vec![latin_face(), cjk_face()]);
    let runs = itemize(&cps, &levels, &faces);
    let mut expect_start = 0;
    for run in &runs {
      assert_eq!(run.start, expect_start);
      assert!(run.start < run.end);
      expect_start = run.end;
    }
    assert_eq!(expect_start, cps.len());
  }
}
