//! 設定ファイル（`$VCIM_HOME/config.toml`）
//!
//! ファイルが存在しない場合はデフォルト設定（`gpg/0` のみ）を使う。

use crate::env::{expand_home, vcim_home};
use crate::error::{Result, VcimError};
use crate::importer::{
    DemoImporter, GnuPgImporter, Importer, ImporterKind, JsonImporter, RemoteImporter,
};
use crate::registry::ImporterRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "contacts.json";

fn default_true() -> bool {
    true
}

/// 全体設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub import: ImportSettings,
    pub store: StoreSettings,
    pub importers: ImportersConfig,
}

/// `[importers]` を書かなければ `gpg/0` だけが有効
impl Default for Config {
    fn default() -> Self {
        Self {
            import: ImportSettings::default(),
            store: StoreSettings::default(),
            importers: ImportersConfig {
                gpg: vec![GpgConfig::default()],
                ..ImportersConfig::default()
            },
        }
    }
}

/// インポート実行の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// 同時に走らせるインポーター数
    pub concurrency: usize,
    /// インポーターごとのタイムアウト（秒、0 で無制限）
    pub timeout_secs: u64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout_secs: 30,
        }
    }
}

impl ImportSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// アドレス帳ストアの設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub path: Option<String>,
}

/// 種別ごとのインポーター設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportersConfig {
    pub gpg: Vec<GpgConfig>,
    pub demo: Vec<DemoConfig>,
    pub json: Vec<JsonConfig>,
    pub http: Vec<HttpConfig>,
}

/// GnuPG インポーター
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpgConfig {
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub gpg_home: Option<String>,
    #[serde(default)]
    pub gpg_binary: Option<String>,
}

impl Default for GpgConfig {
    fn default() -> Self {
        Self {
            active: true,
            gpg_home: None,
            gpg_binary: None,
        }
    }
}

/// デモインポーター
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "DemoConfig::default_name")]
    pub name: String,
    #[serde(default = "DemoConfig::default_email")]
    pub email: String,
}

impl DemoConfig {
    fn default_name() -> String {
        "Mr. Rogers".to_string()
    }

    fn default_email() -> String {
        "mr@rogers.com".to_string()
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            active: true,
            name: Self::default_name(),
            email: Self::default_email(),
        }
    }
}

/// JSON ファイルインポーター
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonConfig {
    #[serde(default = "default_true")]
    pub active: bool,
    pub path: String,
}

/// HTTP インポーター（既定で無効）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub active: bool,
    pub endpoint: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// 既定の設定ファイルパス
    pub fn default_path() -> PathBuf {
        vcim_home().join(CONFIG_FILE)
    }

    /// 設定を読み込み（ファイルがなければデフォルト）
    pub fn load(path: &Path) -> Result<Self> {
        let config: Config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(VcimError::Io(e)),
        };

        config.validate()?;
        Ok(config)
    }

    /// `path` 指定があればそれを、なければ既定パスを読む
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load(&Self::default_path()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.import.concurrency == 0 {
            return Err(VcimError::Config(
                "import.concurrency must be at least 1".to_string(),
            ));
        }
        for (i, json) in self.importers.json.iter().enumerate() {
            if json.path.trim().is_empty() {
                return Err(VcimError::Config(format!("importers.json[{}].path is empty", i)));
            }
        }
        for (i, http) in self.importers.http.iter().enumerate() {
            if http.endpoint.trim().is_empty() {
                return Err(VcimError::Config(format!(
                    "importers.http[{}].endpoint is empty",
                    i
                )));
            }
        }
        if matches!(&self.store.path, Some(p) if p.trim().is_empty()) {
            return Err(VcimError::Config("store.path is empty".to_string()));
        }
        Ok(())
    }

    /// アドレス帳ストアのパス
    pub fn store_path(&self) -> PathBuf {
        match self.store.path.as_deref() {
            Some(path) => expand_home(path),
            None => vcim_home().join(STORE_FILE),
        }
    }

    /// 設定からレジストリを組み立てる（gpg, demo, json, http の順）
    pub fn build_registry(&self) -> Result<ImporterRegistry> {
        let mut registry = ImporterRegistry::new();

        for kind in ImporterKind::all() {
            let importers: Vec<Arc<dyn Importer>> = match kind {
                ImporterKind::Gpg => self
                    .importers
                    .gpg
                    .iter()
                    .enumerate()
                    .map(|(i, c)| Arc::new(GnuPgImporter::from_config(i, c)) as Arc<dyn Importer>)
                    .collect(),
                ImporterKind::Demo => self
                    .importers
                    .demo
                    .iter()
                    .enumerate()
                    .map(|(i, c)| Arc::new(DemoImporter::from_config(i, c)) as Arc<dyn Importer>)
                    .collect(),
                ImporterKind::Json => self
                    .importers
                    .json
                    .iter()
                    .enumerate()
                    .map(|(i, c)| Arc::new(JsonImporter::from_config(i, c)) as Arc<dyn Importer>)
                    .collect(),
                ImporterKind::Http => self
                    .importers
                    .http
                    .iter()
                    .enumerate()
                    .map(|(i, c)| Arc::new(RemoteImporter::from_config(i, c)) as Arc<dyn Importer>)
                    .collect(),
            };

            for importer in importers {
                registry.register(importer)?;
            }
        }

        Ok(registry)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
