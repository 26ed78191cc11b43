//! ローカル JSON ファイルのソース

use super::{parse_identity_document, IdentitySnapshot, IdentitySource};
use crate::error::{Result, VcimError};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// JSON アイデンティティ文書をファイルから読むソース
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<IdentitySnapshot> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| VcimError::unavailable(self.describe(), e.to_string()))?;
        parse_identity_document(&self.describe(), &content)
    }
}

impl IdentitySource for JsonFileSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        Box::pin(self.read())
    }
}
