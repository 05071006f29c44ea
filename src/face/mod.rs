//! Face representation, loading and classification (spec §4.1), plus the
//! ordered, pruned collection the Itemizer and pipeline consult (spec §4.3).

mod loader;
mod set;

pub use loader::{Face, FaceId, FaceLoader, Serif, Spacing};
pub use set::FaceSet;
