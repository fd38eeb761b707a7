//! Location of the persisted session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Resolve the session file path, preferring an explicit override.
pub fn session_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let dirs = ProjectDirs::from("", "", "duet").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = session_path(Some(Path::new("/tmp/duet/session.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/duet/session.json"));
    }

    #[test]
    fn default_path_ends_with_session_file() {
        if let Ok(path) = session_path(None) {
            assert!(path.ends_with("session.json"));
        }
    }
}
