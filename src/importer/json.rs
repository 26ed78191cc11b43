//! JSON ファイルからのインポーター

use super::{Importer, ImporterKind};
use crate::config::JsonConfig;
use crate::env::expand_home;
use crate::source::{IdentitySource, JsonFileSource};

/// JSON アイデンティティ文書を読むインポーター
///
/// 文書側が URI 形式のトークンを持つので、key 行にはそのまま載せる。
pub struct JsonImporter {
    id: String,
    active: bool,
    source: JsonFileSource,
}

impl JsonImporter {
    pub fn from_config(index: usize, config: &JsonConfig) -> Self {
        Self {
            id: format!("{}/{}", ImporterKind::Json, index),
            active: config.active,
            source: JsonFileSource::new(expand_home(&config.path)),
        }
    }
}

impl Importer for JsonImporter {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ImporterKind {
        ImporterKind::Json
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn source(&self) -> &dyn IdentitySource {
        &self.source
    }

    fn key_value(&self, token: &str) -> String {
        token.to_string()
    }
}
