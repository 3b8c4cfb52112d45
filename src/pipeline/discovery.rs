//! File discovery: glob the raw directory, derive entity names from the
//! bracketed filename segment, resolve companion files.
//!
//! Naming convention of the simulator: `<prefix>[<entity>]_<Metric>.csv`,
//! e.g. `C[auth-service_cpu]_Usage.csv`.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, glob_with};
use log::{debug, warn};

use crate::utils::error::{ReportError, Result};

/// A matched input file and the entity it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub entity: String,
}

/// Substring between the first `[` and the next `]`.
pub fn entity_name(file_name: &str) -> Option<&str> {
    let start = file_name.find('[')? + 1;
    let len = file_name[start..].find(']')?;
    Some(&file_name[start..start + len])
}

/// Glob for `<prefix>[<anything>]_<metric>.csv`. Brackets are glob syntax, so the
/// literal `[` is written as the one-character class `[[]`.
pub fn metric_pattern(prefix: &str, metric: &str) -> String {
    format!(
        "{}[[]*]_{}.csv",
        Pattern::escape(prefix),
        Pattern::escape(metric)
    )
}

/// Lists files in `dir` matching `pattern`, sorted by path.
pub fn discover(dir: &Path, pattern: &str) -> Result<Vec<DiscoveredFile>> {
    let full = format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), pattern);
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut found = Vec::new();
    for entry in glob_with(&full, options)? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                // Unreadable directory entry; the glob itself is still valid.
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let entity = match entity_name(&file_name) {
            Some(name) => name.to_string(),
            None => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file_name.clone());
                warn!("{} has no [entity] segment, using '{}'", file_name, stem);
                stem
            }
        };
        found.push(DiscoveredFile { path, entity });
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Discovered {} file(s) for {}", found.len(), full);
    Ok(found)
}

/// Derives the paired file name by swapping `from_suffix` for `to_suffix`.
/// A name not ending in `from_suffix` gets `to_suffix` appended to its stem.
pub fn companion_path(primary: &Path, from_suffix: &str, to_suffix: &str) -> PathBuf {
    let name = primary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let companion = match name.strip_suffix(from_suffix) {
        Some(base) => format!("{base}{to_suffix}"),
        None => {
            let stem = name.strip_suffix(".csv").unwrap_or(&name);
            format!("{stem}{to_suffix}")
        }
    };
    primary.with_file_name(companion)
}

/// [`companion_path`] that fails when the derived file does not exist.
pub fn require_companion(primary: &Path, from_suffix: &str, to_suffix: &str) -> Result<PathBuf> {
    let path = companion_path(primary, from_suffix, to_suffix);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ReportError::MissingCompanion { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn entity_is_first_bracket_pair() {
        assert_eq!(entity_name("C[auth_cpu]_Usage.csv"), Some("auth_cpu"));
        assert_eq!(
            entity_name("G[LIMBO]_[gateway(login)]_Load.csv"),
            Some("LIMBO")
        );
        assert_eq!(entity_name("R[]_InSystem.csv"), Some(""));
        assert_eq!(entity_name("Usage.csv"), None);
        assert_eq!(entity_name("C[unterminated_Usage.csv"), None);
    }

    #[test]
    fn pattern_escapes_brackets() {
        let pattern = metric_pattern("C", "Usage");
        assert_eq!(pattern, "C[[]*]_Usage.csv");
        let p = Pattern::new(&pattern).unwrap();
        assert!(p.matches("C[node]_Usage.csv"));
        assert!(!p.matches("C[node]_Usage_processed.csv"));
        assert!(!p.matches("S[node]_Usage.csv"));
    }

    #[test]
    fn discover_sorts_and_names_entities() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "C[b]_Usage.csv",
            "C[a]_Usage.csv",
            "C[a]_ActiveProcesses.csv",
            "C[a]_Usage_processed.csv",
        ] {
            fs::write(dir.path().join(name), "SimulationTime;Value\n").unwrap();
        }

        let files = discover(dir.path(), &metric_pattern("C", "Usage")).unwrap();
        let entities: Vec<_> = files.iter().map(|f| f.entity.as_str()).collect();
        assert_eq!(entities, vec!["a", "b"]);
    }

    #[test]
    fn discover_in_empty_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), "*.csv").unwrap().is_empty());
    }

    #[test]
    fn companion_swaps_suffix() {
        let p = Path::new("raw/C[a]_Usage.csv");
        assert_eq!(
            companion_path(p, "_Usage.csv", "_TotalProcesses.csv"),
            PathBuf::from("raw/C[a]_TotalProcesses.csv")
        );
    }

    #[test]
    fn missing_companion_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("G[x]_SuccessfulRequests.csv");
        fs::write(&primary, "SimulationTime;Value\n").unwrap();

        match require_companion(&primary, "_SuccessfulRequests.csv", "_FailedRequests.csv") {
            Err(ReportError::MissingCompanion { path }) => {
                assert!(path.ends_with("G[x]_FailedRequests.csv"))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
