//! Pure change-detection functions.
//!
//! - `hash_content`: canonical SHA-256 fingerprint of a value
//! - `diff`: recursive structural diff with stable paths
//! - `array_diff` / `array_diff_by`: standalone sequence diff
//! - `string_similarity`: normalized edit-distance score
//! - `compare`: diff and tally two snapshots
//!
//! None of these perform I/O or fail on well-formed content.

pub mod compare;
pub mod diff;
pub mod hash;
pub mod sequence;
pub mod similarity;

pub use compare::compare;
pub use diff::diff;
pub use hash::{canonicalize, hash_content};
pub use sequence::{array_diff, array_diff_by, array_diff_by_key};
pub use similarity::{edit_distance, string_similarity};
