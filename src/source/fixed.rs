//! 固定データのソース

use super::{IdentitySnapshot, IdentitySource, RawIdentity};
use crate::error::{Result, VcimError};
use std::future::Future;
use std::pin::Pin;

/// メモリ上の固定アイデンティティを返すソース
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    label: String,
    identities: Vec<RawIdentity>,
}

impl StaticSource {
    pub fn new(label: impl Into<String>, identities: Vec<RawIdentity>) -> Self {
        Self {
            label: label.into(),
            identities,
        }
    }
}

impl IdentitySource for StaticSource {
    fn describe(&self) -> String {
        format!("static:{}", self.label)
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        let snapshot: IdentitySnapshot = self.identities.iter().cloned().map(Ok).collect();
        Box::pin(std::future::ready(Ok::<_, VcimError>(snapshot)))
    }
}
