//! Shaper Orchestrator (spec §4.4): for each [`crate::itemize::Run`],
//! materializes segment properties, invokes `rustybuzz`, and attaches the
//! resulting glyph buffer.

use icu_locid::LanguageIdentifier;
use rustybuzz::ttf_parser::Tag;

use crate::itemize::Run;

/// A single positioned glyph's shaper-assigned identity: which glyph in
/// the font, and which source cluster (codepoint index within the run) it
/// came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphInfo {
  pub glyph_id: u32,
  pub cluster: u32,
}

/// A single positioned glyph's placement, always in the fixed `2048`-unit
/// design space spec §4.4 step 1 mandates regardless of the font's native
/// `unitsPerEm` — rustybuzz has no `hb_font_set_scale` equivalent to ask
/// for this directly, so `shape_one` post-scales every raw position by
/// `DESIGN_SCALE / face.units_per_em()` after shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphPosition {
  pub x_advance: i32,
  pub y_advance: i32,
  pub x_offset: i32,
  pub y_offset: i32,
}

/// Positioned glyph output for one run. An owned copy of rustybuzz's
/// `GlyphBuffer` contents: we don't keep rustybuzz's buffer (or its
/// borrowed face) alive past the shaping call, since `Face` reconstructs a
/// transient `rustybuzz::Face` per call rather than keeping one resident.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphBuffer {
  pub infos: Vec<GlyphInfo>,
  pub positions: Vec<GlyphPosition>,
}

impl GlyphBuffer {
  /// True iff the shaper ran but produced only `.notdef` (glyph id 0) —
  /// spec §7 `ShaperDegenerate`, "not distinguished from success, surfaced
  /// via glyph inspection" rather than as a distinct error.
  pub fn is_degenerate(&self) -> bool { !self.infos.is_empty() && self.infos.iter().all(|g| g.glyph_id == 0) }
}

/// Fixed power-of-two design scale baked into every `GlyphPosition` (spec
/// §4.4 step 1), independent of `ppem` and of the font's own `unitsPerEm`.
const DESIGN_SCALE: f32 = 2048.0;

/// Shape every run in place (spec §4.4). Runs with no font (spec
/// `NoCoveringFont`) are left unshaped — `glyphs` stays `None` — since
/// there's nothing to construct a shaper font from.
pub fn shape_runs(codepoints: &[u32], runs: &mut [Run<'_>], language: &LanguageIdentifier, font_size_px: u16) {
  for run in runs {
    shape_one(codepoints, run, language, font_size_px);
  }
}

fn shape_one(codepoints: &[u32], run: &mut Run<'_>, language: &LanguageIdentifier, font_size_px: u16) {
  let Some(font) = run.font else {
    log::warn!("skipping shaping for run [{}, {}): no covering font", run.start, run.end);
    return;
  };

  let rtl = run.level % 2 == 1;
  // The caller has already bidi-reordered into visual order; rustybuzz
  // (like the harfbuzz it's a port of) always wants logical-order text, so
  // an RTL run's visual-order slice must be reversed back before shaping
  // (spec §4.4 step 4).
  let mut chars: Vec<char> = codepoints[run.start..run.end].iter().filter_map(|&cp| char::from_u32(cp)).collect();
  if rtl {
    chars.reverse();
  }
  let text: String = chars.into_iter().collect();

  log::trace!("shaping run [{}, {}) script={} rtl={rtl}", run.start, run.end, run.script);

  let glyphs = font.with_rustybuzz_face(|face| {
    if font_size_px > 0 {
      face.set_points_per_em(Some(font_size_px as f32));
    }

    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(&text);
    buffer.set_direction(if rtl { rustybuzz::Direction::RightToLeft } else { rustybuzz::Direction::LeftToRight });

    let mut script_tag = [0u8; 4];
    script_tag.copy_from_slice(run.script.as_bytes());
    if let Some(script) = rustybuzz::Script::from_iso15924_tag(Tag::from_bytes(&script_tag)) {
      buffer.set_script(script);
    }
    if let Ok(lang) = language.to_string().parse() {
      buffer.set_language(lang);
    }

    let shaped = rustybuzz::shape(face, &[], buffer);

    // rustybuzz reports positions in the font's own unitsPerEm space; scale
    // into the fixed 2048 design space `gp.c:191`'s `hb_font_set_scale`
    // establishes up front, so two faces with different native upem yield
    // comparable GlyphPosition values.
    let scale = DESIGN_SCALE / face.units_per_em().max(1) as f32;

    let infos = shaped.glyph_infos().iter().map(|i| GlyphInfo { glyph_id: i.glyph_id, cluster: i.cluster }).collect();
    let positions = shaped
      .glyph_positions()
      .iter()
      .map(|p| GlyphPosition {
        x_advance: (p.x_advance as f32 * scale).round() as i32,
        y_advance: (p.y_advance as f32 * scale).round() as i32,
        x_offset: (p.x_offset as f32 * scale).round() as i32,
        y_offset: (p.y_offset as f32 * scale).round() as i32,
      })
      .collect();
    GlyphBuffer { infos, positions }
  });

  run.ppem = font_size_px;
  run.glyphs = glyphs;
}
