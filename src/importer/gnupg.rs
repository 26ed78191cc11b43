//! GnuPG キーリングからのインポーター

use super::{Importer, ImporterKind};
use crate::config::GpgConfig;
use crate::env::{default_gnupg_home, expand_home};
use crate::source::{GnuPgSource, IdentitySource};

/// key 行の形式（既存のアドレス帳との互換のため固定）
pub const PGP_KEY_FORMAT_PREFIX: &str = "data:application/x-pgp-fingerprint,";

/// GnuPG キーリングのキーごとに連絡先を作るインポーター
pub struct GnuPgImporter {
    id: String,
    active: bool,
    source: Box<dyn IdentitySource>,
}

impl GnuPgImporter {
    pub fn from_config(index: usize, config: &GpgConfig) -> Self {
        let home = config
            .gpg_home
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(default_gnupg_home);

        let mut source = GnuPgSource::new(home);
        if let Some(binary) = config.gpg_binary.as_deref() {
            source = source.with_binary(binary);
        }

        Self {
            id: format!("{}/{}", ImporterKind::Gpg, index),
            active: config.active,
            source: Box::new(source),
        }
    }

    /// ソースを差し替える（テスト用）
    pub fn with_source(mut self, source: Box<dyn IdentitySource>) -> Self {
        self.source = source;
        self
    }
}

impl Importer for GnuPgImporter {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ImporterKind {
        ImporterKind::Gpg
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn source(&self) -> &dyn IdentitySource {
        self.source.as_ref()
    }

    fn key_value(&self, token: &str) -> String {
        format!("{}{}", PGP_KEY_FORMAT_PREFIX, token)
    }
}
