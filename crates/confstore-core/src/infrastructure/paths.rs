//! Home-directory expansion for configuration paths.
//!
//! `~` and `~/rest` are rewritten against the user's home directory, taken
//! from `HOME` and falling back to `USERPROFILE` on Windows-style setups.
//! `~user/...` forms are left alone.

use std::path::{Path, PathBuf};

/// Expands a leading `~` against `home`.
///
/// Paths without a leading `~`, or with no home directory, are returned
/// unchanged.
pub fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
    let (Some(text), Some(home)) = (path.to_str(), home) else {
        return path.to_path_buf();
    };

    if text == "~" {
        return home.to_path_buf();
    }

    match text
        .strip_prefix("~/")
        .or_else(|| text.strip_prefix("~\\"))
    {
        Some(rest) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Resolves the home directory from the environment.
pub fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}
