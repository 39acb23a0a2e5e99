//! Configuration loading for `vigo.toml`.
//!
//! Only scroll thresholds and the tab stop are configurable. Values are
//! kept raw here; the clamping to pane geometry (`threshold ≤ (extent-1)/2`)
//! belongs to the view, which knows its size at the moment of use.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_VERTICAL_THRESHOLD: usize = 5;
pub const DEFAULT_HORIZONTAL_THRESHOLD: usize = 10;
pub const DEFAULT_TABSTOP: usize = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub vertical_threshold: usize,
    pub horizontal_threshold: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            vertical_threshold: DEFAULT_VERTICAL_THRESHOLD,
            horizontal_threshold: DEFAULT_HORIZONTAL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub tabstop: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            tabstop: DEFAULT_TABSTOP,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scroll: ScrollConfig,
    pub text: TextConfig,
}

/// Preferred config path: `vigo.toml` in the working directory, then the
/// platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("vigo.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("vigo").join("vigo.toml");
    }
    local
}

/// Load configuration, falling back to defaults when the file is missing
/// or malformed. A malformed file is reported but never fatal.
pub fn load_from(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match toml::from_str::<Config>(&content) {
        Ok(cfg) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            cfg
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let cfg = load_from(Some(PathBuf::from("__no_such_config__.toml")));
        assert_eq!(cfg.scroll.vertical_threshold, 5);
        assert_eq!(cfg.scroll.horizontal_threshold, 10);
        assert_eq!(cfg.text.tabstop, 8);
    }

    #[test]
    fn parses_thresholds() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[scroll]\nvertical_threshold = 2\nhorizontal_threshold = 4\n[text]\ntabstop = 4\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.scroll.vertical_threshold, 2);
        assert_eq!(cfg.scroll.horizontal_threshold, 4);
        assert_eq!(cfg.text.tabstop, 4);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[scroll]\nvertical_threshold = 1\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.scroll.vertical_threshold, 1);
        assert_eq!(cfg.scroll.horizontal_threshold, 10);
        assert_eq!(cfg.text.tabstop, 8);
    }

    #[test]
    fn malformed_file_falls_back() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "scroll = [not toml").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.scroll.vertical_threshold, 5);
    }
}
