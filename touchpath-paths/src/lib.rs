//! XDG Base Directory paths for touchpath.
//!
//! The CLI resolves its config and output locations through XDG paths on
//! every platform, the same layout tools like gh and kubectl use.

use std::path::PathBuf;

/// Environment variable that relocates the project config directory.
pub const PROJECT_CONFIG_DIR_ENV: &str = "TOUCHPATH_PROJECT_CONFIG_DIR";

/// Get the touchpath config directory.
///
/// Returns `$XDG_CONFIG_HOME/touchpath` if set, otherwise `~/.config/touchpath`.
///
/// # Examples
///
/// ```
/// use touchpath_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("touchpath"));
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("touchpath")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/touchpath")
    } else {
        PathBuf::from(".config/touchpath")
    }
}

/// Get the touchpath data directory.
///
/// Returns `$XDG_DATA_HOME/touchpath` if set, otherwise `~/.local/share/touchpath`.
/// Run outputs land under `runs/` here unless `--output` is given.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("touchpath")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share/touchpath")
    } else {
        PathBuf::from(".local/share/touchpath")
    }
}

/// User-level config file (`<config_dir>/config.toml`).
pub fn user_config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Project-level config file.
///
/// `.touchpath/config.toml` relative to the working directory, or
/// `$TOUCHPATH_PROJECT_CONFIG_DIR/config.toml` when that is set.
pub fn project_config_file() -> PathBuf {
    if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
        PathBuf::from(dir).join("config.toml")
    } else {
        PathBuf::from(".touchpath/config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_touchpath() {
        let path = config_dir();
        assert!(
            path.ends_with("touchpath"),
            "config_dir should end with 'touchpath'"
        );
    }

    #[test]
    fn test_data_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_DATA_HOME", "/tmp/test-data");
        }
        let path = data_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-data/touchpath"));
        unsafe {
            std::env::remove_var("XDG_DATA_HOME");
        }
    }

    #[test]
    fn test_project_config_file_override() {
        unsafe {
            std::env::set_var(PROJECT_CONFIG_DIR_ENV, "/tmp/project-cfg");
        }
        assert_eq!(
            project_config_file(),
            PathBuf::from("/tmp/project-cfg/config.toml")
        );
        unsafe {
            std::env::remove_var(PROJECT_CONFIG_DIR_ENV);
        }
        assert_eq!(
            project_config_file(),
            PathBuf::from(".touchpath/config.toml")
        );
    }

    #[test]
    fn test_user_config_file_is_toml() {
        let path = user_config_file();
        assert_eq!(path.file_name().unwrap(), "config.toml");
    }
}
