//! FaceSet (spec §3): a contiguous, priority-ordered sequence of faces, plus
//! the scorer-driven sort and coverage-pruning pass from spec §4.2.

use crate::face::Face;
use crate::score::compare_fonts;

/// A contiguous, priority-ordered sequence of [`Face`]s; index 0 is highest
/// priority. Borrowed during itemization — the itemizer never mutates it.
#[derive(Debug, Default)]
pub struct FaceSet {
  faces: Vec<Face>,
}

impl FaceSet {
  pub fn new(faces: Vec<Face>) -> Self { FaceSet { faces } }

  pub fn as_slice(&self) -> &[Face] { &self.faces }

  pub fn len(&self) -> usize { self.faces.len() }

  pub fn is_empty(&self) -> bool { self.faces.is_empty() }

  pub fn get(&self, index: usize) -> Option<&Face> { self.faces.get(index) }

  /// Score every face against `target` (spec §4.2 `compare_fonts`), sort
  /// descending, then prune faces whose coverage adds nothing beyond the
  /// faces already accepted ahead of them. Mutates in place.
  ///
  /// Sort and prune are two separate passes matching the original
  /// `gp_sort_face_set`: scoring doesn't account for overlap, so it has to
  /// run to completion (and the array fully sorted) before the coverage
  /// walk can decide what's redundant.
  pub fn sort_and_prune(&mut self, target: &Face) {
    for face in &self.faces {
      face.score.set(compare_fonts(target, face));
    }
    self.faces.sort_by(|a, b| b.score.get().cmp(&a.score.get()));

    let mut total_coverage = target.coverage.clone();
    let mut fallback_faces = 0usize;
    for i in 0..self.faces.len() {
      if self.faces[i].coverage.is_subset(&total_coverage) {
        continue;
      }
      total_coverage.extend(self.faces[i].coverage.iter().copied());
      if fallback_faces != i {
        self.faces.swap(i, fallback_faces);
      }
      fallback_faces += 1;
    }

    let pruned = self.faces.len() - fallback_faces;
    if pruned > 0 {
      log::debug!("coverage pruning dropped {pruned} of {} faces with no new coverage", self.faces.len());
    }
    self.faces.truncate(fallback_faces);
  }

  /// Build a minimal, scored fallback chain from `pool` suitable for
  /// substituting codepoints `target` cannot cover — e.g. a color/emoji
  /// chain behind a primary text face. The original kept this as a second,
  /// separately-built `fs_color` fontset (see `gp.h`'s "fs_color is used
  /// for emojis" note); this is the same `compare_fonts` +
  /// `sort_and_prune` the primary set uses, just run against a
  /// color-capable candidate pool instead of the primary's own siblings.
  pub fn build_fallback_chain(target: &Face, pool: Vec<Face>) -> FaceSet {
    let mut set = FaceSet::new(pool);
    set.sort_and_prune(target);
    set
  }
}

impl<'a> IntoIterator for &'a FaceSet {
  type Item = &'a Face;
  type IntoIter = std::slice::Iter<'a, Face>;

  fn into_iter(self) -> Self::IntoIter { self.faces.iter() }
}
