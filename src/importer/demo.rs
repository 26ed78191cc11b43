//! デモ用インポーター
//!
//! 設定された1人分の連絡先を返す。動作確認とテスト用。

use super::{Importer, ImporterKind};
use crate::config::DemoConfig;
use crate::source::{IdentitySource, RawIdentity, StaticSource, SubIdentity};

const DEMO_KEY_PREFIX: &str = "urn:x-vcim-demo:";

pub struct DemoImporter {
    id: String,
    active: bool,
    source: StaticSource,
}

impl DemoImporter {
    pub fn from_config(index: usize, config: &DemoConfig) -> Self {
        let id = format!("{}/{}", ImporterKind::Demo, index);
        let identity = RawIdentity::new(
            config.email.clone(),
            vec![SubIdentity::new(Some(&config.email), Some(&config.name))],
        );

        Self {
            source: StaticSource::new(id.clone(), vec![identity]),
            id,
            active: config.active,
        }
    }
}

impl Importer for DemoImporter {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ImporterKind {
        ImporterKind::Demo
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn source(&self) -> &dyn IdentitySource {
        &self.source
    }

    fn key_value(&self, token: &str) -> String {
        format!("{}{}", DEMO_KEY_PREFIX, token)
    }
}
