use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const TRAIN_PREFIX: &str = "train.";
pub const VALID_PREFIX: &str = "valid.";

/// A target difficulty level (reading grade). Used as a file-path suffix and
/// as the decoder-selection key; no arithmetic beyond equality and ordering
/// for display is ever performed on the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(pub u32);

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Level {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Level)
    }
}

/// Append a level's canonical string form to a base path: base `data/src.`
/// and level `3` resolve to `data/src.3`. Pure string concatenation, no I/O.
pub fn level_path<P: AsRef<Path>>(base: P, level: Level) -> PathBuf {
    let mut joined = base.as_ref().as_os_str().to_os_string();
    joined.push(level.to_string());
    PathBuf::from(joined)
}

/// Insert a prefix before the filename component of `path`, leaving the
/// directory untouched: `data/src.3` with `train.` becomes `data/train.src.3`.
pub fn prefixed<P: AsRef<Path>>(path: P, prefix: &str) -> PathBuf {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", prefix, name))
}
