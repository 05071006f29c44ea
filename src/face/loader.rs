//! Face Loader (spec §4.1): turns a font blob into a [`Face`] record,
//! deriving coverage, a stable id, and the classification attributes the
//! Scorer and Itemizer consume. Every rule here is a contract, not a
//! heuristic choice left to the implementer — reproduced verbatim from
//! the original C collaborator (`gp_ttf.c`).

use std::cell::Cell;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use rustybuzz::ttf_parser::{self, Tag};

use crate::error::{Error, Result};

/// The set of codepoints a face can render (spec §3 "coverage"). Keyed
/// with `ahash` rather than the default `SipHash` — matches
/// `ribir_algo::FrameCache`'s `HashMap<_, _, ahash::RandomState>` pattern;
/// a coverage set is queried once per codepoint per itemizer step, so
/// hasher speed matters more than DoS resistance here.
pub type CoverageSet = HashSet<u32, ahash::RandomState>;

/// A stable 64-bit fingerprint of a face, derived by folding the OpenType
/// table directory (tag, checksum, length per record) when present, or the
/// first 500 bytes of the blob otherwise.
///
/// This hashes the table *directory*, not table contents: two fonts with
/// identical directories but mutated table bytes collide. That's accepted
/// as a non-cryptographic fingerprint, not a defect — see spec §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::From, derive_more::Into)]
pub struct FaceId(u64);

/// Glyph-advance spacing class, from sampling glyph advances across the
/// face's coverage (spec §4.1 "Spacing").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
  Mono = 1,
  Dual = 2,
  Proportional = 3,
}

/// Coarse serif/sans classification (spec §4.1 "Serif").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serif {
  Unknown = 0,
  Sans = 1,
  Serif = 2,
}

/// An immutable record for a single loaded font face.
///
/// `blob`/`face_index` replace the spec's owned `hb_face` handle: rather
/// than keep a persistent shaper-face view alive (which would make `Face`
/// self-referential in safe Rust), we keep the owned bytes and reconstruct
/// a transient [`rustybuzz::Face`] on demand via
/// [`Face::with_rustybuzz_face`] — cheap, since it's just a table-directory
/// parse, and the same pattern `ttf-parser`-based crates use throughout
/// the example corpus.
pub struct Face {
  blob: Arc<[u8]>,
  face_index: u32,
  pub coverage: CoverageSet,
  pub id: FaceId,
  /// Scratch field written by the Scorer; not an intrinsic property of the
  /// face. Shared mutability is deliberate — the pipeline is single
  /// threaded (spec §5), so a `Cell` is sufficient and callers sharing a
  /// `Face` across threads must serialize access to `sort_and_prune`
  /// themselves.
  pub score: Cell<u64>,
  pub color: bool,
  pub scalable: bool,
  pub spacing: Spacing,
  pub variable: bool,
  pub width: f32,
  pub weight: f32,
  pub slant: f32,
  pub ui: bool,
  pub serif: Serif,
  pub family: String,
}

impl Face {
  /// Parse a font blob (optionally one face of a multi-face container) and
  /// classify it. Fails with [`Error::InvalidFont`] if the shaper cannot
  /// parse the blob.
  pub fn from_blob(blob: impl Into<Arc<[u8]>>, face_index: u32) -> Result<Self> {
    let blob: Arc<[u8]> = blob.into();
    let rb_face = rustybuzz::Face::from_slice(&blob, face_index).ok_or(Error::InvalidFont)?;
    let raw = rb_face.raw_face();

    let color = COLOR_TABLES.iter().any(|tag| has_nonempty_table(&raw, tag));
    let scalable = SCALABLE_TABLES.iter().any(|tag| has_nonempty_table(&raw, tag));
    let coverage = collect_coverage(&rb_face);
    let spacing = classify_spacing(&rb_face, &coverage);
    let variable = rb_face.is_variable();

    let family = name_by_id(&rb_face, 1).unwrap_or_default();
    let style = name_by_id(&rb_face, 2).unwrap_or_default();
    let subfamily = name_by_id(&rb_face, 17).unwrap_or_default();
    let width = find_keyword(WIDTH_KEYWORDS, &subfamily, &style).unwrap_or(100.0);
    let weight = find_keyword(WEIGHT_KEYWORDS, &subfamily, &style).unwrap_or(80.0);
    let slant = find_keyword(SLANT_KEYWORDS, &subfamily, &style).unwrap_or(0.0);
    let ui = contains_whole_word_icase(&family, "ui");
    let os2 = raw.table(Tag::from_bytes(b"OS/2"));
    let serif = classify_serif(os2, &family);
    let id = FaceId(compute_id(&blob));

    Ok(Face {
      blob,
      face_index,
      coverage,
      id,
      score: Cell::new(0),
      color,
      scalable,
      spacing,
      variable,
      width,
      weight,
      slant,
      ui,
      serif,
      family,
    })
  }

  /// Read a font file from disk and parse face `face_index` of it.
  pub fn from_file(path: impl AsRef<Path>, face_index: u32) -> Result<Self> {
    let bytes = std::fs::read(path)?;
    Self::from_blob(bytes, face_index)
  }

  /// True iff this face's coverage includes `rune`.
  pub fn covers(&self, rune: u32) -> bool {
    self.coverage.contains(&rune)
  }

  /// Reconstruct a transient shaper-facing view of this face. Cheap: this
  /// is a table-directory parse, not a full font load. `&mut` so callers
  /// can set per-shape state (ppem, variations) on the transient face
  /// before shaping.
  pub fn with_rustybuzz_face<R>(&self, f: impl FnOnce(&mut rustybuzz::Face) -> R) -> Option<R> {
    rustybuzz::Face::from_slice(&self.blob, self.face_index).map(|mut face| f(&mut face))
  }

  /// Construct a bare test double with the given coverage and
  /// classification attributes, skipping font-blob parsing entirely (spec
  /// §9 "Polymorphism over face backends" — the Loader and Scorer consume
  /// only `coverage`/classification fields, so tests never need a real
  /// sfnt blob).
  #[cfg(any(test, feature = "test-utils"))]
  #[allow(clippy::too_many_arguments)]
  pub fn for_test(
    coverage: impl IntoIterator<Item = u32>,
    color: bool,
    scalable: bool,
    spacing: Spacing,
    variable: bool,
    width: f32,
    weight: f32,
    slant: f32,
    ui: bool,
    serif: Serif,
  ) -> Face {
    Face {
      blob: Arc::from(Vec::<u8>::new()),
      face_index: 0,
      coverage: coverage.into_iter().collect(),
      id: FaceId(0),
      score: Cell::new(0),
      color,
      scalable,
      spacing,
      variable,
      width,
      weight,
      slant,
      ui,
      serif,
      family: String::new(),
    }
  }
}

impl std::fmt::Debug for Face {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Face")
      .field("id", &self.id)
      .field("family", &self.family)
      .field("coverage_len", &self.coverage.len())
      .field("color", &self.color)
      .field("scalable", &self.scalable)
      .field("spacing", &self.spacing)
      .field("variable", &self.variable)
      .field("width", &self.width)
      .field("weight", &self.weight)
      .field("slant", &self.slant)
      .field("ui", &self.ui)
      .field("serif", &self.serif)
      .finish()
  }
}

/// Loads faces from font files. Holds no process-wide state (spec §9
/// deliberately replaces the original's fontconfig singleton with an
/// explicit, caller-constructed value).
#[derive(Debug, Default, Clone, Copy)]
pub struct FaceLoader;

impl FaceLoader {
  pub fn new() -> Self {
    FaceLoader
  }

  /// Walk a directory of font files and classify every face found,
  /// skipping any blob the shaper can't parse. A thin convenience over
  /// `fontdb`'s directory walk — `fontdb` supplies file discovery only,
  /// none of its own parsed metadata is trusted (spec §4.1's rules must be
  /// reproduced verbatim, not approximated by another library's opinion of
  /// family/style/weight).
  pub fn load_dir(&self, dir: impl AsRef<Path>) -> Vec<Face> {
    let mut db = fontdb::Database::new();
    db.load_fonts_dir(dir);
    db
      .faces()
      .filter_map(|info| db.with_face_data(info.id, |data, index| Face::from_blob(data.to_vec(), index).ok()).flatten())
      .collect()
  }
}

const COLOR_TABLES: [[u8; 4]; 3] = [*b"COLR", *b"CBDT", *b"sbix"];
const SCALABLE_TABLES: [[u8; 4]; 3] = [*b"glyf", *b"CFF ", *b"CFF2"];

fn has_nonempty_table(raw: &ttf_parser::RawFace, tag: &[u8; 4]) -> bool {
  raw.table(Tag::from_bytes(tag)).is_some_and(|t| !t.is_empty())
}

fn collect_coverage(face: &rustybuzz::Face) -> CoverageSet {
  let mut set = CoverageSet::default();
  if let Some(cmap) = face.tables().cmap {
    for subtable in cmap.subtables {
      if subtable.is_unicode() {
        subtable.codepoints(|cp| {
          set.insert(cp);
        });
      }
    }
  }
  set
}

fn name_by_id(face: &rustybuzz::Face, id: u16) -> Option<String> {
  face.names().into_iter().find(|n| n.name_id == id).and_then(|n| n.to_string())
}

/// Sample glyph advances from `coverage` in ascending order to classify
/// mono/dual/proportional spacing (spec §4.1 "Spacing").
fn classify_spacing(face: &rustybuzz::Face, coverage: &CoverageSet) -> Spacing {
  let max_advances: usize = if coverage.len() > 256 { 7 } else { 3 };
  let mut advances: Vec<u16> = Vec::with_capacity(max_advances);
  let mut checked = 0usize;

  // Spec §4.1 requires sampling coverage "in ascending order"; the set
  // itself is unordered (ahash-backed), so sort a scratch copy once here.
  let mut ordered: Vec<u32> = coverage.iter().copied().collect();
  ordered.sort_unstable();

  for cp in ordered {
    if advances.len() >= max_advances {
      break;
    }
    if checked >= 50 && cp >= 0xFFFF {
      break;
    }
    let Some(c) = char::from_u32(cp) else { continue };
    let Some(glyph) = face.glyph_index(c) else { continue };
    let Some(advance) = face.glyph_hor_advance(glyph) else { continue };
    if advance == 0 {
      continue;
    }
    checked += 1;
    let matched = advances.iter().any(|&a| within_3_percent(a, advance));
    if !matched {
      advances.push(advance);
    }
  }

  match advances.len() {
    1 => Spacing::Mono,
    n if n < max_advances => Spacing::Dual,
    _ => Spacing::Proportional,
  }
}

fn within_3_percent(a: u16, b: u16) -> bool {
  (a as f32 - b as f32).abs() <= 0.03 * b as f32
}

fn classify_serif(os2: Option<&[u8]>, family: &str) -> Serif {
  if let Some(data) = os2 {
    if data.len() > 43 {
      let panose0 = data[32];
      let panose1 = data[33];
      if panose0 == 2 {
        if (1..=10).contains(&panose1) {
          return Serif::Serif;
        }
        if panose1 >= 11 {
          return Serif::Sans;
        }
      }
    }
  }
  const SERIF_KEYWORDS: &[(&str, Serif)] =
    &[("roman", Serif::Serif), ("serif", Serif::Serif), ("mincho", Serif::Serif), ("pmincho", Serif::Serif), ("sun", Serif::Serif), ("gothic", Serif::Sans), ("pgothic", Serif::Sans), ("hei", Serif::Sans), ("sans", Serif::Sans)];
  for &(keyword, serif) in SERIF_KEYWORDS {
    if contains_whole_word_icase(family, keyword) {
      return serif;
    }
  }
  Serif::Unknown
}

const SLANT_KEYWORDS: &[(&str, f32)] = &[("italic", 100.0), ("kursiv", 100.0), ("oblique", 110.0)];

const WEIGHT_KEYWORDS: &[(&str, f32)] = &[
  ("thin", 0.0),
  ("extralight", 40.0),
  ("ultralight", 40.0),
  ("demilight", 55.0),
  ("semilight", 55.0),
  ("light", 50.0),
  ("book", 75.0),
  ("regular", 80.0),
  ("normal", 80.0),
  ("medium", 100.0),
  ("demibold", 180.0),
  ("demi", 180.0),
  ("semibold", 180.0),
  ("extrabold", 205.0),
  ("superbold", 205.0),
  ("ultrabold", 205.0),
  ("bold", 200.0),
  ("ultrablack", 215.0),
  ("superblack", 215.0),
  ("extrablack", 215.0),
  ("ultra", 205.0),
  ("black", 210.0),
  ("heavy", 210.0),
];

const WIDTH_KEYWORDS: &[(&str, f32)] = &[
  ("ultracondensed", 50.0),
  ("extracondensed", 63.0),
  ("semicondensed", 87.0),
  ("condensed", 75.0),
  ("normal", 100.0),
  ("semiexpanded", 113.0),
  ("extraexpanded", 150.0),
  ("ultraexpanded", 200.0),
  ("expanded", 125.0),
  ("extended", 125.0),
];

/// Scan `subfamily` first, then `style`, for the first whole-word keyword
/// match (spec §4.1: "Scan the subfamily name first, then the style
/// name...First match wins").
fn find_keyword(table: &[(&str, f32)], subfamily: &str, style: &str) -> Option<f32> {
  for &(keyword, value) in table {
    if contains_whole_word_icase(subfamily, keyword) {
      return Some(value);
    }
  }
  for &(keyword, value) in table {
    if contains_whole_word_icase(style, keyword) {
      return Some(value);
    }
  }
  None
}

/// Whole-word, case-insensitive (ASCII) substring search: `needle` must be
/// preceded by string start or a space and followed by a space or string
/// end.
fn contains_whole_word_icase(haystack: &str, needle: &str) -> bool {
  let hay = haystack.as_bytes();
  let need = needle.as_bytes();
  if need.is_empty() || need.len() > hay.len() {
    return false;
  }
  for start in 0..=hay.len() - need.len() {
    if hay[start..start + need.len()].eq_ignore_ascii_case(need) {
      let before_ok = start == 0 || hay[start - 1] == b' ';
      let after = start + need.len();
      let after_ok = after == hay.len() || hay[after] == b' ';
      if before_ok && after_ok {
        return true;
      }
    }
  }
  false
}

/// Fold the OpenType table directory (or the first 500 bytes for
/// non-sfnt-recognizable blobs) into a 64-bit id via the recurrence
/// `id = id * 37 + word`.
fn compute_id(data: &[u8]) -> u64 {
  const SFNT_TRUETYPE: u32 = 0x0001_0000;
  let sfnt_cff = u32::from_be_bytes(*b"OTTO");

  if data.len() >= 12 {
    let tag = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    if tag == SFNT_TRUETYPE || tag == sfnt_cff {
      let table_count = u16::from_be_bytes([data[4], data[5]]) as usize;
      let mut id: u64 = 0;
      let mut offset = 12usize;
      for _ in 0..table_count {
        if offset + 16 > data.len() {
          break;
        }
        let record_tag = u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap());
        let checksum = u32::from_be_bytes(data[offset + 4..offset + 8].try_into().unwrap());
        let length = u32::from_be_bytes(data[offset + 12..offset + 16].try_into().unwrap());
        id = id.wrapping_mul(37).wrapping_add(record_tag as u64);
        id = id.wrapping_mul(37).wrapping_add(checksum as u64);
        id = id.wrapping_mul(37).wrapping_add(length as u64);
        offset += 16;
      }
      return id;
    }
  }

  if data.len() >= 500 {
    let mut id: u64 = 0;
    for &byte in &data[..500] {
      id = id.wrapping_mul(37).wrapping_add(byte as u64);
    }
    return id;
  }

  0
}
