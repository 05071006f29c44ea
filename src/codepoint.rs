//! Decoding and per-codepoint Unicode property queries.
//!
//! Everything here is an "opaque collaborator" per the design: script and
//! East-Asian width classification are delegated to `unicode-script` and
//! `icu_properties`, the two crates the wider example corpus reaches for
//! this exact job (see `servo-fonts`'s `unicode-script` + `icu_properties`
//! pairing).

use unicode_script::UnicodeScript;

/// The Unicode East-Asian Width property, used by the itemizer to decide
/// whether a width-class transition splits a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
  Neutral,
  Narrow,
  HalfWidth,
  Wide,
  FullWidth,
  Ambiguous,
}

impl Width {
  fn from_icu(w: icu_properties::EastAsianWidth) -> Self {
    use icu_properties::EastAsianWidth as Eaw;
    match w {
      Eaw::Narrow => Width::Narrow,
      Eaw::Halfwidth => Width::HalfWidth,
      Eaw::Wide => Width::Wide,
      Eaw::Fullwidth => Width::FullWidth,
      Eaw::Ambiguous => Width::Ambiguous,
      _ => Width::Neutral,
    }
  }
}

/// Decode UTF-8 bytes into Unicode scalar values, in order.
///
/// Mirrors the original collaborator's `gp_utf8_to_runes`: malformed
/// sequences are not expected on this boundary (the caller owns a `&str`
/// or validated bytes upstream), so invalid UTF-8 is replaced with
/// U+FFFD rather than aborting the whole decode.
pub fn utf8_to_codepoints(bytes: &[u8]) -> Vec<u32> {
  String::from_utf8_lossy(bytes).chars().map(|c| c as u32).collect()
}

/// The East-Asian width class of a single codepoint.
pub fn width_of(rune: u32) -> Width {
  let Some(c) = char::from_u32(rune) else { return Width::Neutral };
  Width::from_icu(icu_properties::maps::east_asian_width().get(c))
}

/// The ISO 15924 four-letter script tag of a single codepoint, e.g. `"Latn"`.
pub fn script_of(rune: u32) -> &'static str {
  let Some(c) = char::from_u32(rune) else { return "Zzzz" };
  c.script().short_name()
}

/// Codepoints the itemizer treats as whitespace: it never splits a run on
/// one, and a leading run of these is skipped before seeding the walk.
pub fn is_space(rune: u32) -> bool {
  matches!(rune, 0x0009..=0x000D
    | 0x0020
    | 0x0085
    | 0x00A0
    | 0x1680
    | 0x2000..=0x200D
    | 0x2028
    | 0x2029
    | 0x202F
    | 0x205F
    | 0x3000)
}

/// Variation selectors (U+FE00–U+FE0F, U+E0100–U+E01EF): like whitespace,
/// these never open a new run — they modify whatever base character
/// precedes them.
pub fn is_variant_sel(rune: u32) -> bool {
  matches!(rune, 0xFE00..=0xFE0F | 0xE0100..=0xE01EF)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_ascii_and_multibyte() {
    let s = "hi \u{05E9}\u{05DC}\u{05D5}\u{05DD} \u{3042}";
    let cps = utf8_to_codepoints(s.as_bytes());
    let back: String = cps.iter().filter_map(|&c| char::from_u32(c)).collect();
    assert_eq!(back, s);
  }

  #[test]
  fn classifies_known_spaces() {
    assert!(is_space(0x0020));
    assert!(is_space(0x3000));
    assert!(!is_space(0x0041));
  }

  #[test]
  fn classifies_variation_selectors() {
    assert!(is_variant_sel(0xFE0F));
    assert!(is_variant_sel(0xE0100));
    assert!(!is_variant_sel(0x0041));
  }

  #[test]
  fn script_tag_is_iso15924() {
    assert_eq!(script_of('a' as u32), "Latn");
    assert_eq!(script_of(0x05D0), "Hebr");
  }

  #[test]
  fn width_class_of_fullwidth_is_fullwidth() {
    assert_eq!(width_of(0xFF21), Width::FullWidth);
  }
}
