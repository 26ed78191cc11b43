//! インポート実行結果の定義

use crate::card::Card;
use crate::error::VcimError;
use crate::source::MalformedRecord;

/// 実行の終了状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// 成功（カード数は `ImportRun::cards` を参照）
    Succeeded,
    /// 無効化されていたため実行しなかった（エラーではない）
    SkippedDisabled,
    /// 失敗
    Failed {
        /// 原因タグ（`VcimError::cause()`）
        cause: &'static str,
        message: String,
    },
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunStatus::Failed { .. })
    }

    /// 表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            RunStatus::Succeeded => "Succeeded",
            RunStatus::SkippedDisabled => "Skipped",
            RunStatus::Failed { .. } => "Failed",
        }
    }
}

/// 1インポーター1回分の実行結果
#[derive(Debug, Clone)]
pub struct ImportRun {
    /// インポーター識別子
    pub importer: String,
    pub status: RunStatus,
    /// マージ済みカード（作成順）
    pub cards: Vec<Card>,
    /// スキップした不正レコード
    pub malformed: Vec<MalformedRecord>,
    /// メールを持たず破棄したグループ数
    pub dropped: usize,
}

impl ImportRun {
    pub fn succeeded(
        importer: impl Into<String>,
        cards: Vec<Card>,
        malformed: Vec<MalformedRecord>,
        dropped: usize,
    ) -> Self {
        Self {
            importer: importer.into(),
            status: RunStatus::Succeeded,
            cards,
            malformed,
            dropped,
        }
    }

    pub fn skipped(importer: impl Into<String>) -> Self {
        Self {
            importer: importer.into(),
            status: RunStatus::SkippedDisabled,
            cards: Vec::new(),
            malformed: Vec::new(),
            dropped: 0,
        }
    }

    pub fn failed(importer: impl Into<String>, error: &VcimError) -> Self {
        Self::failed_with(importer, error.cause(), error.to_string())
    }

    pub fn failed_with(
        importer: impl Into<String>,
        cause: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            importer: importer.into(),
            status: RunStatus::Failed {
                cause,
                message: message.into(),
            },
            cards: Vec::new(),
            malformed: Vec::new(),
            dropped: 0,
        }
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// 人間向けの要約（"succeeded with 3 card(s)" など）
    pub fn summary(&self) -> String {
        match &self.status {
            RunStatus::Succeeded => format!("succeeded with {} card(s)", self.cards.len()),
            RunStatus::SkippedDisabled => "skipped (disabled)".to_string(),
            RunStatus::Failed { cause, message } => format!("failed ({}): {}", cause, message),
        }
    }
}
