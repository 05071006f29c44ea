//! Bidirectional analysis: logical-to-visual reorder plus per-codepoint
//! embedding levels, treated as an opaque transform per the design.
//!
//! Level *resolution* (determining the embedding level of every character)
//! is delegated entirely to `unicode-bidi`'s `BidiInfo`, which operates on
//! a `&str` and reports levels per UTF-8 byte. The final visual reordering
//! (UAX #9 rule L2 — reverse each maximal run at or above a given level,
//! from the highest level down to the lowest odd level) is small and
//! well-defined enough to implement directly against our codepoint-indexed
//! arrays rather than bouncing back through byte offsets a second time.

use unicode_bidi::{BidiInfo, Level};

use crate::error::{Error, Result};

/// Run the bidirectional algorithm with a fixed LTR base direction (per
/// spec §4.5, the facade always calls the collaborator with `base = LTR`).
///
/// Returns the codepoints in visual order alongside a parallel array of
/// embedding levels (even = LTR, odd = RTL).
pub fn resolve(codepoints: &[u32]) -> Result<(Vec<u32>, Vec<u8>)> {
  if codepoints.is_empty() {
    return Ok((Vec::new(), Vec::new()));
  }

  let text: String = codepoints
    .iter()
    .map(|&cp| char::from_u32(cp).ok_or(Error::BidiFailed))
    .collect::<Result<_>>()?;

  let bidi_info = BidiInfo::new(&text, Some(Level::ltr()));

  let mut levels = Vec::with_capacity(codepoints.len());
  let mut byte_pos = 0usize;
  for ch in text.chars() {
    let level = bidi_info.levels.get(byte_pos).copied().unwrap_or_else(Level::ltr);
    levels.push(level.number());
    byte_pos += ch.len_utf8();
  }

  let order = reorder_visual(&levels);
  let visual_codepoints = order.iter().map(|&i| codepoints[i]).collect();
  let visual_levels = order.iter().map(|&i| levels[i]).collect();
  Ok((visual_codepoints, visual_levels))
}

/// UAX #9 rule L2: from the highest level in the text down to the lowest
/// odd level, reverse each maximal contiguous run of characters at or
/// above that level. Returns a permutation of `0..levels.len()` mapping
/// visual position to logical index.
fn reorder_visual(levels: &[u8]) -> Vec<usize> {
  let mut order: Vec<usize> = (0..levels.len()).collect();
  let Some(&max_level) = levels.iter().max() else { return order };
  let min_odd_level = levels.iter().copied().filter(|l| l % 2 == 1).min();
  let Some(min_odd_level) = min_odd_level else { return order };

  let mut level = max_level;
  loop {
    let mut i = 0;
    while i < order.len() {
      if levels[order[i]] >= level {
        let start = i;
        while i < order.len() && levels[order[i]] >= level {
          i += 1;
        }
        order[start..i].reverse();
      } else {
        i += 1;
      }
    }
    if level == min_odd_level {
      break;
    }
    level -= 1;
  }
  order
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_input_is_empty_output() {
    let (cps, levels) = resolve(&[]).unwrap();
    assert!(cps.is_empty());
    assert!(levels.is_empty());
  }

  #[test]
  fn pure_ltr_text_keeps_order_and_even_levels() {
    let input: Vec<u32> = "hello".chars().map(|c| c as u32).collect();
    let (cps, levels) = resolve(&input).unwrap();
    assert_eq!(cps, input);
    assert!(levels.iter().all(|&l| l % 2 == 0));
  }

  #[test]
  fn pure_rtl_text_is_reversed_with_odd_levels() {
    let input: Vec<u32> = vec![0x05E9, 0x05DC, 0x05D5, 0x05DD];
    let (cps, levels) = resolve(&input).unwrap();
    assert!(levels.iter().all(|&l| l % 2 == 1));
    assert_eq!(cps, vec![0x05DD, 0x05D5, 0x05DC, 0x05E9]);
  }

  #[test]
  fn reorder_visual_is_identity_for_uniform_levels() {
    let levels = [0u8, 0, 0, 0];
    assert_eq!(reorder_visual(&levels), vec![0, 1, 2, 3]);
  }

  #[test]
  fn reorder_visual_reverses_a_single_rtl_run() {
    let levels = [0u8, 1, 1, 1, 0];
    assert_eq!(reorder_visual(&levels), vec![0, 3, 2, 1, 4]);
  }
}
