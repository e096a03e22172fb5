use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

/// Where a site's pieces live on disk.
///
/// The defaults are the fixed conventions: a `base.html` layout next to
/// a `source/` tree of pages, a `static/` tree of verbatim assets, and
/// a `docs/` output root.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SitePaths {
    /// The shared root layout every page is rendered through
    pub layout: PathBuf,
    /// Tree of content files; every regular file is rendered
    pub source: PathBuf,
    /// Tree of assets copied and served byte for byte
    #[serde(rename = "static")]
    pub static_dir: PathBuf,
    /// Build output root; mirrors `source` plus a copy of `static`
    pub output: PathBuf,
}

impl Default for SitePaths {
    fn default() -> Self {
        Self {
            layout: PathBuf::from("base.html"),
            source: PathBuf::from("source"),
            static_dir: PathBuf::from("static"),
            output: PathBuf::from("docs"),
        }
    }
}

impl SitePaths {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let paths: SitePaths = toml::from_str(&data)?;

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventions() {
        let paths = SitePaths::default();
        assert_eq!(paths.layout, PathBuf::from("base.html"));
        assert_eq!(paths.source, PathBuf::from("source"));
        assert_eq!(paths.static_dir, PathBuf::from("static"));
        assert_eq!(paths.output, PathBuf::from("docs"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let paths: SitePaths = toml::from_str("output = \"public\"").unwrap();
        assert_eq!(paths.output, PathBuf::from("public"));
        assert_eq!(paths.source, PathBuf::from("source"));
    }

    #[test]
    fn static_key_is_renamed() {
        let paths: SitePaths = toml::from_str("static = \"assets\"").unwrap();
        assert_eq!(paths.static_dir, PathBuf::from("assets"));
    }
}
