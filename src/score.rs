//! Face Scorer (spec §4.2): a similarity score between a target face and a
//! fallback candidate, used to sort and prune a [`crate::face::FaceSet`].

use crate::face::Face;

/// Score `candidate` against `target` — higher is better, intended for a
/// descending sort (spec §4.2).
///
/// Each field contributes an additive term at a documented bit position,
/// not a disjoint OR'd bit: the byte-valued fields (width/weight/slant) are
/// wide enough to spill into the single-bit fields placed below them in
/// the original's bit table. That's the original scorer's own arithmetic
/// (`gp_compare_fonts`), not a bug introduced here — see spec §9's open
/// question on the scoring formula, preserved verbatim.
///
/// The `color` term is deliberately inverted: `true` when target and
/// candidate *differ*. A fallback chain is built to supply what the
/// primary face lacks, so an emoji-capable candidate should outscore a
/// same-color one when the primary is text-only. This also means
/// `compare_fonts(x, x)` does *not* maximize the color bit — see the
/// `self_comparison` test below.
pub fn compare_fonts(target: &Face, candidate: &Face) -> u64 {
  let color = u64::from(target.color != candidate.color);
  let scalable = u64::from(target.scalable == candidate.scalable);
  let spacing = u64::from(target.spacing == candidate.spacing);
  let variable = u64::from(target.variable == candidate.variable);

  // Variable fonts are assumed to cover the design space, so no diff
  // against them; if only the target is variable, compare the candidate
  // against the normal defaults instead of the target's (meaningless,
  // since a variable font has no single width/weight/slant).
  let (width_diff, weight_diff, slant_diff) = if candidate.variable {
    (0.0, 0.0, 0.0)
  } else if target.variable {
    ((100.0 - candidate.width).abs(), (80.0 - candidate.weight).abs(), candidate.slant.abs())
  } else {
    ((target.width - candidate.width).abs(), (target.weight - candidate.weight).abs(), (target.slant - candidate.slant).abs())
  };

  let width = u64::from(!bucket(width_diff, 20.0));
  let weight = u64::from(!bucket(weight_diff, 5.0));
  let slant = u64::from(!bucket(slant_diff, 10.0));

  let ui = u64::from(target.ui == candidate.ui);
  let serif = u64::from(target.serif == candidate.serif);

  (color << 30) + (scalable << 29) + (spacing << 28) + (variable << 27) + (width << 26) + (weight << 18) + (slant << 10) + (ui << 2) + (serif << 1)
}

/// Ones-complement of the bucketed distance: smaller differences produce
/// larger bytes, so this sorts as "closer is better" once shifted into the
/// score.
fn bucket(diff: f32, step: f32) -> u8 { !((diff / step) as u8) }

#[cfg(test)]
mod tests {
  use super::*;
  use crate::face::{Serif, Spacing};

  fn face(width: f32, weight: f32, slant: f32, color: bool, variable: bool) -> Face {
    Face::for_test([], color, true, Spacing::Proportional, variable, width, weight, slant, false, Serif::Sans)
  }

  #[test]
  fn self_comparison_maximizes_every_term_except_the_inverted_color_bit() {
    let f = face(100.0, 80.0, 0.0, true, false);
    let score = compare_fonts(&f, &f);
    let max_minus_color = (1u64 << 29) + (1 << 28) + (1 << 27) + (0xFFu64 << 26) + (0xFFu64 << 18) + (0xFFu64 << 10) + (1 << 2) + (1 << 1);
    assert_eq!(score, max_minus_color);
  }

  #[test]
  fn color_term_rewards_difference_not_equality() {
    let target = face(100.0, 80.0, 0.0, false, false);
    let same_color = face(100.0, 80.0, 0.0, false, false);
    let diff_color = face(100.0, 80.0, 0.0, true, false);
    assert!(compare_fonts(&target, &diff_color) > compare_fonts(&target, &same_color));
  }

  #[test]
  fn smaller_width_diff_scores_higher() {
    let target = face(100.0, 80.0, 0.0, false, false);
    let close = face(100.0, 80.0, 0.0, false, false);
    let mid = face(75.0, 80.0, 0.0, false, false);
    let far = face(150.0, 80.0, 0.0, false, false);
    assert!(compare_fonts(&target, &close) > compare_fonts(&target, &mid));
    assert!(compare_fonts(&target, &mid) > compare_fonts(&target, &far));
  }

  #[test]
  fn variable_candidate_ignores_width_weight_slant_diff() {
    let target = face(200.0, 210.0, 100.0, false, false);
    let variable_candidate = face(50.0, 0.0, 0.0, false, true);
    let nonvariable_far = face(50.0, 0.0, 0.0, false, false);
    assert!(compare_fonts(&target, &variable_candidate) > compare_fonts(&target, &nonvariable_far));
  }

  #[test]
  fn variable_target_compares_candidate_against_normal_defaults() {
    let target = face(50.0, 0.0, 110.0, false, true);
    // candidate at the CSS-normal defaults (100/80/0) should score better
    // than one far from them, even though it's far from `target`'s own
    // (meaningless, since target is variable) width/weight/slant.
    let at_defaults = face(100.0, 80.0, 0.0, false, false);
    let far_from_defaults = face(50.0, 0.0, 110.0, false, false);
    assert!(compare_fonts(&target, &at_defaults) > compare_fonts(&target, &far_from_defaults));
  }
}
