//! Layered configuration for the library and query service.
//!
//! Later layers override earlier ones:
//!
//! 1. built-in defaults,
//! 2. a configuration file (an explicit path, or else `config.toml` in the
//!    platform configuration directory followed by `mdq.{toml,yaml,yml,json}`
//!    in the working directory),
//! 3. `MDQ_`-prefixed environment variables, with `__` separating sections
//!    (`MDQ_LIBRARY__REFRESH_INTERVAL=300`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use mdq_cache::ServiceOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "MDQ_";
const LOCAL_FILES: &[&str] = &["mdq.toml", "mdq.yaml", "mdq.yml", "mdq.json"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub service: ServiceOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Seconds between scheduled refreshes; `0` turns the timer off.
    pub refresh_interval: u64,
}

impl LibraryConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    /// Carry these settings over to a library builder.
    pub fn apply<T: Send + Sync + 'static>(&self, builder: mdq_library::Builder<T>) -> mdq_library::Builder<T> {
        builder.refresh_interval(self.refresh_interval())
    }
}

impl Config {
    /// Load from the default file locations and the environment.
    pub fn load() -> Result<Self> {
        let mut figment = Self::defaults();
        for path in default_files() {
            figment = merge_file(figment, &path)?;
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load from one specific file, which must exist, and the environment.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::Invalid(format!("no configuration file at {}", path.display())));
        }
        let figment = merge_file(Self::defaults(), path)?;
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    fn validate(&self) -> Result<()> {
        let encodings = &self.service.encodings;
        for (index, compression) in encodings.iter().enumerate() {
            if compression.is_identity() {
                exn::bail!(ErrorKind::Invalid(
                    "service.encodings must not list identity, it is always available".to_string()
                ));
            }
            if encodings[..index].contains(compression) {
                exn::bail!(ErrorKind::Invalid(format!("service.encodings lists {compression} more than once")));
            }
        }
        Ok(())
    }
}

fn default_files() -> Vec<PathBuf> {
    let platform = ProjectDirs::from("", "", "mdq").map(|dirs| dirs.config_dir().join("config.toml"));
    platform
        .into_iter()
        .chain(LOCAL_FILES.iter().map(PathBuf::from))
        .filter(|path| path.is_file())
        .collect()
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    tracing::debug!(path = %path.display(), "Loading configuration file");
    let figment = match path.extension().and_then(|extension| extension.to_str()) {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::Invalid(format!(
            "unrecognised configuration format: {}",
            path.display()
        ))),
    };
    Ok(figment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdq_cache::Compression;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let config = Config::from_figment(Config::defaults()).unwrap();
        assert_eq!(config.library.refresh_interval(), Duration::ZERO);
        assert_eq!(config.service.encodings, vec![Compression::Gzip, Compression::Deflate]);
    }

    #[rstest]
    #[case::toml("mdq.toml", "[library]\nrefresh_interval = 300\n[service]\nencodings = [\"gzip\"]\n")]
    #[case::yaml("mdq.yaml", "library:\n  refresh_interval: 300\nservice:\n  encodings: [gzip]\n")]
    #[case::json("mdq.json", r#"{"library": {"refresh_interval": 300}, "service": {"encodings": ["gzip"]}}"#)]
    fn file_formats(#[case] name: &str, #[case] contents: &str) {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, name, contents);
        let config = Config::from_figment(merge_file(Config::defaults(), &path).unwrap()).unwrap();
        assert_eq!(config.library.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.service.encodings, vec![Compression::Gzip]);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mdq.toml", "[library]\nrefresh_interval = 60\n");
        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.library.refresh_interval, 60);
        assert_eq!(config.service, ServiceOptions::default());
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mdq.toml", "[library]\nrefresh_interval = 60\n");
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("MDQ_CONFIG_TEST_LIBRARY__REFRESH_INTERVAL", "15") };
        let figment = merge_file(Config::defaults(), &path)
            .unwrap()
            .merge(Env::prefixed("MDQ_CONFIG_TEST_").split("__"));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.library.refresh_interval, 15);
    }

    #[rstest]
    #[case::unknown("[service]\nencodings = [\"compress\"]\n", ErrorKind::Load)]
    #[case::negative("[library]\nrefresh_interval = -1\n", ErrorKind::Load)]
    #[case::identity(
        "[service]\nencodings = [\"identity\"]\n",
        ErrorKind::Invalid("service.encodings must not list identity, it is always available".to_string())
    )]
    #[case::duplicate(
        "[service]\nencodings = [\"gzip\", \"x-gzip\"]\n",
        ErrorKind::Invalid("service.encodings lists gzip more than once".to_string())
    )]
    fn rejected(#[case] contents: &str, #[case] expected: ErrorKind) {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mdq.toml", contents);
        let err = Config::load_file(&path).unwrap_err();
        assert_eq!(*err, expected);
    }

    #[test]
    fn missing_or_unknown_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(*err, ErrorKind::Invalid(_)));

        let path = write(&dir, "mdq.ini", "refresh_interval = 1\n");
        let err = Config::load_file(&path).unwrap_err();
        assert!(matches!(*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn applies_to_library_builder() {
        let config = LibraryConfig { refresh_interval: 0 };
        let library = config
            .apply(mdq_library::Library::builder())
            .source(mdq_library::StaticSource::new([mdq_library::Item::new(()).with_id("a")]))
            .build()
            .unwrap();
        assert_eq!(library.refresh_interval(), Duration::ZERO);
        assert!(library.get("a").is_some());
    }
}
