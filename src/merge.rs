//! マージエンジン
//!
//! 1回のインポート実行で得られたソースグループ列を、共有メールアドレスで
//! 畳み込んで最小のカード集合にする。純粋関数で、呼び出し間で状態を持たない。
//!
//! ## アルゴリズム
//!
//! ```text
//! for group in groups:
//!     emails が空        -> 破棄（メール以外の同一性キーは扱わない）
//!     既存カードにヒット -> グループ内のメール順で最初に見つかったカードへ追記
//!     ヒットなし         -> 新規カード作成、全メールをマップに登録
//! ```
//!
//! 既存カードに追記した場合、そのグループの新しいメールはマップに登録しない。
//! 結果は入力順に依存する（あるメールを最初に定義したグループが勝つ）。

mod group;

pub use group::SourceGroup;

use crate::card::Card;
use std::collections::HashMap;

/// 畳み込み結果
#[derive(Debug, Clone, Default)]
pub struct FoldOutcome {
    /// 作成順のカード
    pub cards: Vec<Card>,
    /// メールを持たず破棄されたグループのトークン
    pub dropped: Vec<String>,
}

/// グループ列をカード列に畳み込む
pub fn fold<I>(groups: I) -> Vec<Card>
where
    I: IntoIterator<Item = SourceGroup>,
{
    fold_with_outcome(groups).cards
}

/// 破棄されたグループも報告する版
pub fn fold_with_outcome<I>(groups: I) -> FoldOutcome
where
    I: IntoIterator<Item = SourceGroup>,
{
    let mut outcome = FoldOutcome::default();
    // email -> outcome.cards のインデックス（この呼び出し専有）
    let mut by_email: HashMap<String, usize> = HashMap::new();

    for group in groups {
        if !group.has_emails() {
            outcome.dropped.push(group.token().to_string());
            continue;
        }

        let existing = group
            .emails()
            .iter()
            .find_map(|email| by_email.get(email.as_str()).copied());

        match existing {
            Some(index) => outcome.cards[index].add(group.lines()),
            None => {
                let index = outcome.cards.len();
                outcome.cards.push(Card::new(group.lines()));
                for email in group.emails() {
                    by_email.insert(email.clone(), index);
                }
            }
        }
    }

    outcome
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;

#[cfg(test)]
#[path = "merge_proptests.rs"]
mod proptests;
