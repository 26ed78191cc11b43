//! ソースグループ（1スキャン内で同一トークンに属する属性の集まり）

use crate::card::AttributeLine;

/// ソースグループ
///
/// key 行は必ず1つ。email と fn はトリム後に空でない値だけを、
/// 初出順・重複なしで保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroup {
    token: String,
    key: AttributeLine,
    emails: Vec<String>,
    names: Vec<String>,
}

impl SourceGroup {
    /// `token` はソース上の識別子、`key_value` は key 行に載せる整形済みの値
    pub fn new(token: impl Into<String>, key_value: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            key: AttributeLine::key(key_value),
            emails: Vec::new(),
            names: Vec::new(),
        }
    }

    /// メールを追加（空・重複は無視）
    pub fn push_email(&mut self, email: &str) {
        push_distinct(&mut self.emails, email);
    }

    /// 表示名を追加（空・重複は無視）
    pub fn push_name(&mut self, name: &str) {
        push_distinct(&mut self.names, name);
    }

    pub fn with_emails<'a>(mut self, emails: impl IntoIterator<Item = &'a str>) -> Self {
        for email in emails {
            self.push_email(email);
        }
        self
    }

    pub fn with_names<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in names {
            self.push_name(name);
        }
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_emails(&self) -> bool {
        !self.emails.is_empty()
    }

    /// グループの属性行（key → email → fn の順）
    pub fn lines(&self) -> Vec<AttributeLine> {
        let mut lines = Vec::with_capacity(1 + self.emails.len() + self.names.len());
        lines.push(self.key.clone());
        lines.extend(self.emails.iter().map(|e| AttributeLine::email(e.as_str())));
        lines.extend(self.names.iter().map(|n| AttributeLine::fn_name(n.as_str())));
        lines
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if value.is_empty() || values.iter().any(|v| v == value) {
        return;
    }
    values.push(value.to_string());
}
