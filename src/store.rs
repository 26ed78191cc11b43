//! アドレス帳ストア
//!
//! インポート結果の受け入れ先。同一人物の判定（メール集合の交差）は
//! ストア側の責務で、インポーター間の重複もここで吸収される。

mod json;
mod memory;

pub use json::{JsonCardStore, StoredBook};
pub use memory::MemoryCardStore;

use crate::card::Card;
use crate::error::Result;

/// 追加操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// 新しいカードとして追加
    Inserted,
    /// 既存カードへ統合（追加した行数）
    Merged { added_lines: usize },
}

/// アドレス帳ストアの抽象化trait
pub trait CardStore: Send {
    /// カードを追加、またはメールが交差する既存カードへ統合
    fn upsert(&mut self, card: Card) -> Result<UpsertOutcome>;

    /// 保持しているカード（追加順）
    fn cards(&mut self) -> Result<Vec<Card>>;

    /// 未保存の変更を永続化
    ///
    /// 失敗した場合、前回の `flush()` 以降の変更はすべて破棄される。
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// `cards` に `card` を統合する（最初にメールが交差したカードへ未保持の行だけ追記）
pub(crate) fn merge_into(cards: &mut Vec<Card>, card: Card) -> UpsertOutcome {
    match cards.iter_mut().find(|stored| stored.shares_identity(&card)) {
        Some(stored) => {
            let added_lines = stored.add_missing(card.lines().iter().cloned());
            UpsertOutcome::Merged { added_lines }
        }
        None => {
            cards.push(card);
            UpsertOutcome::Inserted
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
