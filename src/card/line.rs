//! 属性行（name, value, parameters）

use serde::{Deserialize, Serialize};
use std::fmt;

/// よく使う属性名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineName {
    /// 表示名
    Fn,
    /// メールアドレス（唯一の同一性キー）
    Email,
    /// ソース固有の識別子（URI 形式）
    Key,
}

impl LineName {
    /// 属性名の文字列表現（小文字）
    pub fn as_str(&self) -> &'static str {
        match self {
            LineName::Fn => "fn",
            LineName::Email => "email",
            LineName::Key => "key",
        }
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// カードの属性行
///
/// 生成後は不変。名前は小文字に正規化される。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeLine {
    name: String,
    value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<(String, String)>,
}

impl AttributeLine {
    pub fn new(name: impl AsRef<str>, value: impl Into<String>) -> Self {
        Self {
            name: name.as_ref().trim().to_ascii_lowercase(),
            value: value.into(),
            params: Vec::new(),
        }
    }

    /// パラメータ付きで作成
    pub fn with_params(
        name: impl AsRef<str>,
        value: impl Into<String>,
        params: Vec<(String, String)>,
    ) -> Self {
        let mut line = Self::new(name, value);
        line.params = params
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        line
    }

    pub fn email(value: impl Into<String>) -> Self {
        Self::new(LineName::Email.as_str(), value)
    }

    pub fn fn_name(value: impl Into<String>) -> Self {
        Self::new(LineName::Fn.as_str(), value)
    }

    pub fn key(value: impl Into<String>) -> Self {
        Self::new(LineName::Key.as_str(), value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// 指定した属性名かどうか
    pub fn is(&self, name: LineName) -> bool {
        self.name == name.as_str()
    }

    /// vCard のコンテンツ行として整形
    ///
    /// `KEY;param=value:escaped-value` 形式。
    pub fn to_content_line(&self) -> String {
        let mut out = self.name.to_ascii_uppercase();
        for (k, v) in &self.params {
            out.push(';');
            out.push_str(k);
            out.push('=');
            out.push_str(&param_value(v));
        }
        out.push(':');
        // key 行の URI はカンマを含むのでエスケープしない
        if self.is(LineName::Key) {
            out.push_str(&self.value);
        } else {
            out.push_str(&escape_value(&self.value));
        }
        out
    }
}

/// パラメータ値の整形（RFC 6868 の `^` エスケープ、区切り文字を含めば引用符で囲む）
fn param_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '^' => escaped.push_str("^^"),
            '"' => escaped.push_str("^'"),
            '\n' => escaped.push_str("^n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    if escaped.contains([':', ';', ',']) {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

/// vCard 値のエスケープ（\\ , ; 改行）
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
