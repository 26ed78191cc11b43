//! JSON アイデンティティ文書の解析
//!
//! ```json
//! {"identities": [{"token": "urn:x:1", "uids": [{"email": "a@x.com", "name": "A"}]}]}
//! ```
//!
//! エントリは個別に解析する。壊れたエントリは `MalformedRecord` になり、
//! 文書全体が読めない場合のみエラーを返す。

use super::{IdentitySnapshot, MalformedRecord, RawIdentity, SubIdentity};
use crate::error::{Result, VcimError};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Document {
    identities: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    token: String,
    #[serde(default)]
    uids: Vec<SubIdentity>,
}

/// JSON 文書をスナップショットに変換
///
/// `origin` はエラーメッセージ用のソース名。
pub fn parse_identity_document(origin: &str, content: &str) -> Result<IdentitySnapshot> {
    let document: Document = serde_json::from_str(content)
        .map_err(|e| VcimError::malformed(origin, format!("invalid identity document: {}", e)))?;

    Ok(document
        .identities
        .into_iter()
        .enumerate()
        .map(|(index, value)| parse_entry(index, value))
        .collect())
}

fn parse_entry(index: usize, value: Value) -> std::result::Result<RawIdentity, MalformedRecord> {
    let label = value
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index));

    let entry: Entry =
        serde_json::from_value(value).map_err(|e| MalformedRecord::new(&label, e.to_string()))?;

    let token = entry.token.trim();
    if token.is_empty() {
        return Err(MalformedRecord::new(label, "empty token"));
    }

    Ok(RawIdentity::new(token, entry.uids))
}
