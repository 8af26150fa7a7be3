//! Layered configuration for subcat.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. `config.toml`, `config.yaml` or `config.json` in the platform config
//!    directory,
//! 3. a file given on the command line,
//! 4. `SUBCAT_*` environment variables, with `__` separating nested keys
//!    (`SUBCAT_DOWNLOAD__BASE_URL`, `SUBCAT_PACK__SIZE_FLOOR`).

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use subcat_catalog::{DEFAULT_BASE_URL, PackPolicy, Pipeline, Synthesizer, Urls};
use subcat_classify::Lexicon;
use subcat_classify::language::{DEFAULT_DUAL_AUDIO, DEFAULT_ENGLISH, DEFAULT_GROUPS};
use subcat_dump::{AttachmentSizes, DEFAULT_ATTACHMENT_SIZE, Schema};
use tracing::instrument;

pub const ENV_PREFIX: &str = "SUBCAT_";
const DEFAULT_FILES: [&str; 3] = ["config.toml", "config.yaml", "config.json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Scheme and host that every download URL is built under.
    pub base_url: String,
}
impl Default for DownloadConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string() }
    }
}

/// Phrase lists used to resolve undetermined subtitle languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub groups: Vec<String>,
    pub dual_audio: Vec<String>,
    pub english: Vec<String>,
}
impl Default for LanguageConfig {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self { groups: owned(DEFAULT_GROUPS), dual_audio: owned(DEFAULT_DUAL_AUDIO), english: owned(DEFAULT_ENGLISH) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Byte size assumed for attachments with no reported size.
    pub attachment_size: u64,
}
impl Default for Defaults {
    fn default() -> Self {
        Self { attachment_size: DEFAULT_ATTACHMENT_SIZE }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub download: DownloadConfig,
    pub schema: Schema,
    pub pack: PackPolicy,
    pub language: LanguageConfig,
    pub defaults: Defaults,
    /// Worker threads; rayon's default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}
impl Config {
    /// Load from every source, using the platform config directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::extract(Self::figment(default_dir().as_deref(), explicit)?)
    }

    /// Assemble the sources without extracting them.
    #[instrument(level = "debug")]
    pub fn figment(default_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dir) = default_dir {
            for path in DEFAULT_FILES.iter().map(|name| dir.join(name)).filter(|path| path.is_file()) {
                tracing::debug!(path = %path.display(), "merging default configuration file");
                figment = merge_file(figment, &path)?;
            }
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            figment = merge_file(figment, path)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate.
    pub fn extract(figment: Figment) -> Result<Self> {
        let mut config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<()> {
        self.download.base_url = self.download.base_url.trim().trim_end_matches('/').to_string();
        if self.download.base_url.is_empty() {
            exn::bail!(ErrorKind::InvalidValue { key: "download.base_url", reason: "must not be empty" });
        }
        if self.pack.size_floor == 0 {
            exn::bail!(ErrorKind::InvalidValue { key: "pack.size_floor", reason: "must be greater than zero" });
        }
        if self.workers == Some(0) {
            exn::bail!(ErrorKind::InvalidValue { key: "workers", reason: "must be greater than zero" });
        }
        self.lexicon()?;
        Ok(())
    }

    pub fn lexicon(&self) -> Result<Lexicon> {
        let language = &self.language;
        Lexicon::new(language.groups.as_slice(), language.dual_audio.as_slice(), language.english.as_slice())
            .or_raise(|| ErrorKind::InvalidValue { key: "language", reason: "phrases must not be blank" })
    }

    pub fn urls(&self) -> Urls {
        Urls::new(&self.download.base_url)
    }

    pub fn sizes(&self) -> AttachmentSizes {
        AttachmentSizes::new(self.defaults.attachment_size)
    }

    pub fn pipeline(&self) -> Result<Pipeline> {
        Ok(Pipeline::new(self.lexicon()?, Synthesizer::new(self.pack.clone(), self.urls())))
    }
}

/// The platform configuration directory, e.g. `~/.config/subcat` on Linux.
pub fn default_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "subcat", "subcat").map(|dirs| dirs.config_dir().to_path_buf())
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::fs;

    fn load(default_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Config> {
        Config::extract(Config::figment(default_dir, explicit)?)
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_| {
            let config = load(None, None).unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.urls().base(), "https://storage.animetosho.org");
            assert_eq!(config.pack.size_floor, 2_000_000);
            assert_eq!(config.sizes().resolve(1, None), 50_000);
            Ok(())
        });
    }

    #[rstest]
    #[case::toml("custom.toml", "workers = 3\n[download]\nbase_url = \"https://mirror.example/\"\n")]
    #[case::yaml("custom.yaml", "workers: 3\ndownload:\n  base_url: https://mirror.example/\n")]
    #[case::json("custom.json", r#"{"workers": 3, "download": {"base_url": "https://mirror.example/"}}"#)]
    fn test_explicit_file(#[case] name: &str, #[case] contents: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        Jail::expect_with(|_| {
            let config = load(None, Some(&path)).unwrap();
            assert_eq!(config.workers, Some(3));
            assert_eq!(config.download.base_url, "https://mirror.example");
            Ok(())
        });
    }

    #[test]
    fn test_layering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "[pack]\nsize_floor = 10\nmin_attachments = 5\n").unwrap();
        let explicit = dir.path().join("override.yaml");
        fs::write(&explicit, "pack:\n  size_floor: 20\n").unwrap();
        Jail::expect_with(|jail| {
            jail.set_env("SUBCAT_PACK__MIN_LANGUAGES", "4");
            let config = load(Some(dir.path()), Some(&explicit)).unwrap();
            assert_eq!(config.pack.size_floor, 20);
            assert_eq!(config.pack.min_attachments, 5);
            assert_eq!(config.pack.min_languages, 4);
            // Untouched keys keep their defaults.
            assert_eq!(config.pack.min_file_count, 3);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), r#"{"download": {"base_url": "https://file.example"}}"#).unwrap();
        Jail::expect_with(|jail| {
            jail.set_env("SUBCAT_DOWNLOAD__BASE_URL", "https://env.example/");
            jail.set_env("SUBCAT_DEFAULTS__ATTACHMENT_SIZE", "1234");
            let config = load(Some(dir.path()), None).unwrap();
            assert_eq!(config.download.base_url, "https://env.example");
            assert_eq!(config.defaults.attachment_size, 1234);
            Ok(())
        });
    }

    #[rstest]
    #[case::empty_url("[download]\nbase_url = \" / \"\n", "download.base_url")]
    #[case::zero_floor("[pack]\nsize_floor = 0\n", "pack.size_floor")]
    #[case::zero_workers("workers = 0\n", "workers")]
    #[case::blank_phrase("[language]\nenglish = [\"  \"]\n", "language")]
    fn test_invalid_values(#[case] contents: &str, #[case] expected: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        Jail::expect_with(|_| {
            let err = load(None, Some(&path)).unwrap_err();
            assert!(matches!(&*err, ErrorKind::InvalidValue { key, .. } if *key == expected), "{err:?}");
            Ok(())
        });
    }

    #[test]
    fn test_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(*load(None, Some(&missing)).unwrap_err(), ErrorKind::NotFound(missing.clone()));

        let ini = dir.path().join("config.ini");
        fs::write(&ini, "workers=1").unwrap();
        assert_eq!(*load(None, Some(&ini)).unwrap_err(), ErrorKind::UnsupportedFormat(ini.clone()));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "workers = \"many\"").unwrap();
        Jail::expect_with(|_| {
            assert_eq!(*load(None, Some(&broken)).unwrap_err(), ErrorKind::Load);
            Ok(())
        });
    }

    #[test]
    fn test_pipeline_uses_configured_urls() {
        let config = Config {
            download: DownloadConfig { base_url: "https://mirror.example".into() },
            ..Default::default()
        };
        let pipeline = config.pipeline().unwrap();
        assert_eq!(pipeline.synthesizer.urls.attachment(1), "https://mirror.example/attach/00000001/file.xz");
    }
}
