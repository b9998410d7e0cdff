use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use call_reconcile_core::classify::{RuleSet, DECLINE_KEYWORDS};
use call_reconcile_core::merge::JoinStrategy;
use call_reconcile_core::models::Outcome;
use call_reconcile_core::schema::{CallSchema, ContactSchema};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_root")]
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}

fn default_store_root() -> PathBuf {
    PathBuf::from("teleapo_jobs")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_output_name")]
    pub default_output_name: String,
    /// Prefix the outbound call list with a UTF-8 byte-order mark so
    /// spreadsheet tools detect the encoding.
    #[serde(default = "default_true")]
    pub upload_bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_output_name: default_output_name(),
            upload_bom: true,
        }
    }
}

fn default_output_name() -> String {
    "AIテレアポ用リスト".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub join: JoinStrategy,
    /// Label records no rule matched as `未分類` instead of leaving them blank.
    #[serde(default = "default_true")]
    pub mark_unclassified: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            join: JoinStrategy::default(),
            mark_unclassified: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    /// Replaces the built-in decline keyword list when set.
    #[serde(default)]
    pub decline_keywords: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SchemaConfig {
    #[serde(default)]
    pub contacts: ContactSchema,
    #[serde(default)]
    pub calls: CallSchema,
}

impl Config {
    /// Build the classifier rule set described by `[classifier]` and
    /// `[analysis]`.
    pub fn rule_set(&self) -> RuleSet {
        let fallback = self
            .analysis
            .mark_unclassified
            .then_some(Outcome::Unclassified);
        match &self.classifier.decline_keywords {
            Some(words) => {
                let words: Vec<&str> = words.iter().map(String::as_str).collect();
                RuleSet::with_decline_keywords(&words, fallback)
            }
            None => RuleSet::with_decline_keywords(DECLINE_KEYWORDS, fallback),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.store.root.as_os_str().is_empty() {
        anyhow::bail!("store.root must not be empty");
    }

    let name = config.export.default_output_name.trim();
    if name.is_empty() {
        anyhow::bail!("export.default_output_name must not be empty");
    }
    if name.contains(['/', '\\']) {
        anyhow::bail!("export.default_output_name must not contain path separators");
    }

    if let Some(words) = &config.classifier.decline_keywords {
        if words.is_empty() || words.iter().any(|w| w.trim().is_empty()) {
            anyhow::bail!("classifier.decline_keywords must be a non-empty list of non-empty strings");
        }
    }

    Ok(config)
}

/// Load the config file, or fall back to built-in defaults when it does
/// not exist. A file that exists but fails to parse is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let f = write_config("");
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.store.root, PathBuf::from("teleapo_jobs"));
        assert!(cfg.export.upload_bom);
        assert_eq!(cfg.analysis.join, JoinStrategy::FingerprintFirst);
        assert!(cfg.analysis.mark_unclassified);
        assert_eq!(cfg.schema.calls.status, "ステータス");
    }

    #[test]
    fn test_overrides() {
        let f = write_config(
            r#"
[store]
root = "/tmp/jobs"

[analysis]
join = "company"
mark_unclassified = false

[classifier]
decline_keywords = ["no thanks"]

[schema.calls]
status = "Status"
"#,
        );
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.store.root, PathBuf::from("/tmp/jobs"));
        assert_eq!(cfg.analysis.join, JoinStrategy::CompanyName);
        assert_eq!(cfg.schema.calls.status, "Status");
        assert_eq!(cfg.schema.calls.company, "社名");
        let rules = cfg.rule_set();
        assert_eq!(rules.fallback(), None);
    }

    #[test]
    fn test_rejects_unknown_join() {
        let f = write_config("[analysis]\njoin = \"fuzzy\"\n");
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn test_rejects_empty_keyword_list() {
        let f = write_config("[classifier]\ndecline_keywords = []\n");
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let cfg = load_config_or_default(Path::new("/nonexistent/recon.toml")).unwrap();
        assert_eq!(cfg.export.default_output_name, "AIテレアポ用リスト");
    }
}
