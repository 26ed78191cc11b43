//! HTTP エンドポイントからのインポーター

use super::{Importer, ImporterKind};
use crate::config::HttpConfig;
use crate::source::{HttpSource, IdentitySource};
use std::time::Duration;

/// リモートの JSON アイデンティティ文書を取得するインポーター
pub struct RemoteImporter {
    id: String,
    active: bool,
    source: HttpSource,
}

impl RemoteImporter {
    pub fn from_config(index: usize, config: &HttpConfig) -> Self {
        Self {
            id: format!("{}/{}", ImporterKind::Http, index),
            active: config.active,
            source: HttpSource::new(
                config.endpoint.clone(),
                config.timeout_secs.map(Duration::from_secs),
            ),
        }
    }
}

impl Importer for RemoteImporter {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ImporterKind {
        ImporterKind::Http
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
