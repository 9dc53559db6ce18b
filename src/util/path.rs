//! Path helpers

use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
///
/// Unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// `expand_env_vars` for `Path` values.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(expand_env_vars(path.to_string_lossy().as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unknown_variable_when_expanding_then_returns_input() {
        let raw = "$ENTITREE_SURELY_UNSET_VARIABLE/data.json";
        assert_eq!(expand_env_vars(raw), raw);
    }

    #[test]
    fn given_plain_path_when_expanding_then_unchanged() {
        assert_eq!(
            expand_path(Path::new("/var/lib/entities.json")),
            PathBuf::from("/var/lib/entities.json")
        );
    }
}
