//! Shared utility functions for devforge crates

use anyhow::anyhow;
use std::path::PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// sandboxed shells and CI overrides behave the same way generated shell
/// scripts (which read $HOME) do.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_get_home_dir_prefers_env() {
        let saved = env::var("HOME").ok();
        env::set_var("HOME", "/tmp/devforge-test-home");

        let home = get_home_dir().unwrap();
        assert_eq!(home, PathBuf::from("/tmp/devforge-test-home"));

        match saved {
            Some(value) => env::set_var("HOME", value),
            None => env::remove_var("HOME"),
        }
    }

    #[test]
    #[serial]
    fn test_get_home_dir_resolves() {
        let home = get_home_dir().unwrap();
        assert!(!home.as_os_str().is_empty());
    }
}
