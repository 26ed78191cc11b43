//! インポーターレジストリ
//!
//! 登録順を保持する明示的なレジストリ。オーケストレーターに注入して使う。
//! 反復順は常に登録順で、マージ結果の再現性はこれに依存する。

use crate::error::{Result, VcimError};
use crate::importer::{Importer, ImporterKind};
use std::sync::Arc;

/// インポーターレジストリ
#[derive(Default, Clone)]
pub struct ImporterRegistry {
    importers: Vec<Arc<dyn Importer>>,
}

impl std::fmt::Debug for ImporterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImporterRegistry")
            .field("importers", &self.ids())
            .finish()
    }
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// インポーターを登録（識別子の重複・不正はエラー）
    pub fn register(&mut self, importer: Arc<dyn Importer>) -> Result<()> {
        let id = importer.id().to_string();
        if !is_valid_importer_id(&id) {
            return Err(VcimError::Registry(format!("invalid importer id: '{}'", id)));
        }
        if self.get(&id).is_some() {
            return Err(VcimError::Registry(format!(
                "importer already registered: {}",
                id
            )));
        }

        self.importers.push(importer);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.importers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }

    /// 登録順の識別子一覧
    pub fn ids(&self) -> Vec<String> {
        self.importers.iter().map(|i| i.id().to_string()).collect()
    }

    /// 登録順で反復
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Importer>> {
        self.importers.iter()
    }

    /// 識別子で取得
    pub fn get(&self, id: &str) -> Option<Arc<dyn Importer>> {
        let id = id.trim();
        self.importers.iter().find(|i| i.id() == id).cloned()
    }

    /// 識別子または種別名に一致するものだけを残した新しいレジストリ
    ///
    /// `selectors` が空なら全件。登録順は保持される。
    pub fn select(&self, selectors: &[String]) -> Result<Self> {
        if selectors.is_empty() {
            return Ok(self.clone());
        }

        for selector in selectors {
            if !self.iter().any(|i| matches_selector(i.as_ref(), selector)) {
                return Err(VcimError::Registry(format!(
                    "no importer matches '{}'",
                    selector
                )));
            }
        }

        let importers = self
            .importers
            .iter()
            .filter(|i| selectors.iter().any(|s| matches_selector(i.as_ref(), s)))
            .cloned()
            .collect();
        Ok(Self { importers })
    }
}

fn matches_selector(importer: &dyn Importer, selector: &str) -> bool {
    let selector = selector.trim();
    importer.id() == selector || importer.kind().as_str() == selector
}

/// `<kind>/<index>` または小文字英数字・`_`・`-` からなる識別子
fn is_valid_importer_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let (head, index) = match value.split_once('/') {
        Some((head, index)) => (head, Some(index)),
        None => (value, None),
    };
    let head_ok = !head.is_empty()
        && head
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    let index_ok = index.map_or(true, |i| !i.is_empty() && i.chars().all(|c| c.is_ascii_digit()));
    head_ok && index_ok
}

/// 種別名から `ImporterKind` を解決
pub fn parse_kind(value: &str) -> Option<ImporterKind> {
    ImporterKind::all()
        .iter()
        .copied()
        .find(|k| k.as_str() == value.trim())
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
