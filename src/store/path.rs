use crate::request::types::PersonId;
use std::path::{Path, PathBuf};

/// Number of leading identifier characters turned into directory levels.
pub const SHARD_DEPTH: usize = 3;

/// Where one person's record lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocation {
    /// Innermost shard directory, e.g. `root/a/b/c`.
    pub dir: PathBuf,
    /// Record file inside `dir`, e.g. `root/a/b/c/abcdef.txt`.
    pub file: PathBuf,
}

/// Maps `abcdef` to `root/a/b/c/abcdef.<extension>`.
///
/// `PersonId` is at least four characters long, so the three shard levels
/// always exist.
pub fn resolve(person_id: &PersonId, root: &Path, extension: &str) -> RecordLocation {
    let mut dir = root.to_path_buf();
    for shard in person_id.as_str().chars().take(SHARD_DEPTH) {
        dir.push(shard.to_string());
    }
    let file = dir.join(format!("{}.{}", person_id.as_str(), extension));
    RecordLocation { dir, file }
}
