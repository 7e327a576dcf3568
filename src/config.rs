use std::{
    collections::BTreeMap,
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".stratarc.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_upstream_dir")]
    pub upstream_dir: String,
    #[serde(default = "default_custom_dir")]
    pub custom_dir: String,
    #[serde(default = "default_final_dir")]
    pub final_dir: String,
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    #[serde(default = "default_excluded_locales")]
    pub excluded_locales: Vec<String>,
    #[serde(default = "default_locale_aliases")]
    pub locale_aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_checker")]
    pub checker: Vec<String>,
    #[serde(default = "default_backport_prefix")]
    pub backport_prefix: String,
}

fn default_upstream_dir() -> String {
    "translations-upstream".to_string()
}

fn default_custom_dir() -> String {
    "translations-custom".to_string()
}

fn default_final_dir() -> String {
    "translations".to_string()
}

fn default_source_locale() -> String {
    "en".to_string()
}

fn default_excluded_locales() -> Vec<String> {
    vec!["qqq".to_string()]
}

fn default_locale_aliases() -> BTreeMap<String, String> {
    [("pt-br", "pt_BR"), ("zh-hans", "zh_CN")]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

fn default_checker() -> Vec<String> {
    ["msgfmt", "-v", "--strict", "--check", "-o", "/dev/null"]
        .map(String::from)
        .to_vec()
}

fn default_backport_prefix() -> String {
    "wm-".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_dir: default_upstream_dir(),
            custom_dir: default_custom_dir(),
            final_dir: default_final_dir(),
            source_locale: default_source_locale(),
            excluded_locales: default_excluded_locales(),
            locale_aliases: default_locale_aliases(),
            ignores: Vec::new(),
            checker: default_checker(),
            backport_prefix: default_backport_prefix(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Rejects invalid `ignores` globs, an empty source locale, alias chains
    /// and layer directories that coincide.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.source_locale.trim().is_empty() {
            bail!("'sourceLocale' must not be empty");
        }

        for (from, to) in &self.locale_aliases {
            if from.is_empty() || to.is_empty() {
                bail!("Empty locale code in 'localeAliases': \"{}\" -> \"{}\"", from, to);
            }
            if self.locale_aliases.contains_key(to) {
                bail!(
                    "Locale alias \"{}\" points at \"{}\", which is itself an alias",
                    from,
                    to
                );
            }
        }

        let dirs = [
            ("upstreamDir", &self.upstream_dir),
            ("customDir", &self.custom_dir),
            ("finalDir", &self.final_dir),
        ];
        for (i, (name, dir)) in dirs.iter().enumerate() {
            for (other_name, other) in &dirs[i + 1..] {
                if normalized(dir) == normalized(other) {
                    bail!("'{}' and '{}' point at the same directory", name, other_name);
                }
            }
        }

        Ok(())
    }

    /// Resolve a configured directory against the workspace root.
    pub fn resolve_dir(root: &Path, dir: &str) -> PathBuf {
        let p = Path::new(dir);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root.join(p.strip_prefix(".").unwrap_or(p))
        }
    }
}

fn normalized(dir: &str) -> PathBuf {
    Path::new(dir)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Path of the file the config came from; `None` means defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn from_file(&self) -> bool {
        self.path.is_some()
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
