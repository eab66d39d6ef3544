//! Store file discovery.

use super::{StoreError, StoreResult};
use directories::BaseDirs;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Store locations relative to the user's home directory, newest layout first.
const HOME_RELATIVE_CANDIDATES: &[&str] = &[
    "Library/Group Containers/9K33E3U3T4.net.shinyfrog.bear/Application Data/database.sqlite",
    "Library/Containers/net.shinyfrog.bear/Data/Documents/Application Data/database.sqlite",
];

/// Returns the platform candidate paths for the host app's store.
///
/// Empty when the home directory cannot be resolved.
pub fn default_candidates() -> Vec<PathBuf> {
    match BaseDirs::new() {
        Some(dirs) => candidates_under(dirs.home_dir()),
        None => {
            warn!("event=store_locate module=db status=error error_code=no_home_dir");
            Vec::new()
        }
    }
}

fn candidates_under(home: &Path) -> Vec<PathBuf> {
    HOME_RELATIVE_CANDIDATES
        .iter()
        .map(|relative| home.join(relative))
        .collect()
}

/// Ordered list of candidate store paths; the first existing one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocator {
    candidates: Vec<PathBuf>,
}

impl StoreLocator {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Locator over [`default_candidates`], with `preferred` checked first.
    pub fn with_defaults(preferred: Option<PathBuf>) -> Self {
        let mut candidates: Vec<PathBuf> = preferred.into_iter().collect();
        candidates.extend(default_candidates());
        Self::new(candidates)
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Returns the first candidate that exists on disk.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] when no candidate exists.
    pub fn locate(&self) -> StoreResult<PathBuf> {
        for candidate in &self.candidates {
            if candidate.exists() {
                debug!(
                    "event=store_locate module=db status=ok path={}",
                    candidate.display()
                );
                return Ok(candidate.clone());
            }
        }

        warn!(
            "event=store_locate module=db status=error error_code=store_not_found candidates={}",
            self.candidates.len()
        );
        Err(StoreError::NotFound {
            candidates: self.candidates.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{candidates_under, StoreLocator};
    use crate::db::StoreError;
    use std::path::Path;

    #[test]
    fn home_candidates_keep_declared_order() {
        let candidates = candidates_under(Path::new("/Users/someone"));
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0]
            .to_string_lossy()
            .contains("Group Containers/9K33E3U3T4.net.shinyfrog.bear"));
        assert!(candidates[1]
            .to_string_lossy()
            .contains("Containers/net.shinyfrog.bear"));
    }

    #[test]
    fn locate_picks_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.sqlite");
        let second = dir.path().join("second.sqlite");
        let third = dir.path().join("third.sqlite");
        std::fs::write(&second, b"").unwrap();
        std::fs::write(&third, b"").unwrap();

        let locator = StoreLocator::new(vec![missing, second.clone(), third]);
        assert_eq!(locator.locate().unwrap(), second);
    }

    #[test]
    fn locate_reports_all_candidates_when_nothing_exists() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![dir.path().join("a.sqlite"), dir.path().join("b.sqlite")];
        let locator = StoreLocator::new(candidates.clone());

        match locator.locate() {
            Err(StoreError::NotFound { candidates: checked }) => assert_eq!(checked, candidates),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(!dir.path().join("a.sqlite").exists());
    }
}
