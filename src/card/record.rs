//! カードレコード

use super::line::{AttributeLine, LineName};
use serde::{Deserialize, Serialize};

/// 正規化済み連絡先カード
///
/// 属性行の順序付き列。同一性メール集合は常に email 行の値から導出されるため、
/// 行を追加する以外に変化せず、縮むことはない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    lines: Vec<AttributeLine>,
}

impl Card {
    pub fn new(lines: Vec<AttributeLine>) -> Self {
        Self { lines }
    }

    /// 全属性行
    pub fn lines(&self) -> &[AttributeLine] {
        &self.lines
    }

    /// 行を末尾に追加
    pub fn add<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = AttributeLine>,
    {
        self.lines.extend(lines);
    }

    /// まだ保持していない行だけを追加し、追加した行数を返す
    pub fn add_missing<I>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = AttributeLine>,
    {
        let mut added = 0;
        for line in lines {
            if !self.lines.contains(&line) {
                self.lines.push(line);
                added += 1;
            }
        }
        added
    }

    /// 指定名の行の値（出現順）
    pub fn values(&self, name: LineName) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(move |l| l.is(name))
            .map(|l| l.value())
    }

    /// 同一性メール集合（出現順・重複なし）
    pub fn emails(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for email in self.values(LineName::Email) {
            if !out.contains(&email) {
                out.push(email);
            }
        }
        out
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.values(LineName::Email).any(|e| e == email)
    }

    /// 同一性メール集合が交差するか（＝同一人物とみなす）
    pub fn shares_identity(&self, other: &Card) -> bool {
        other.values(LineName::Email).any(|e| self.has_email(e))
    }

    /// 表示名（最初の fn、なければ最初のメール）
    pub fn display_name(&self) -> Option<&str> {
        self.values(LineName::Fn)
            .next()
            .or_else(|| self.values(LineName::Email).next())
    }

    /// email / fn の値に部分一致するか（大文字小文字無視）
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.lines
            .iter()
            .filter(|l| l.is(LineName::Email) || l.is(LineName::Fn))
            .any(|l| l.value().to_lowercase().contains(&needle))
    }

    /// vCard 4.0 形式のテキストに変換
    pub fn to_vcard(&self) -> String {
        let mut out = String::from("BEGIN:VCARD\r\nVERSION:4.0\r\n");
        for line in &self.lines {
            out.push_str(&line.to_content_line());
            out.push_str("\r\n");
        }
        out.push_str("END:VCARD\r\n");
        out
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
