//! GnuPG キーリングのソース
//!
//! `gpg --with-colons` の出力を解析する。
//!
//! ```text
//! pub:u:4096:1:7848252F...        ← キー開始（field 5 = key id）
//! fpr:::::::::<FINGERPRINT>:      ← 最初の fpr がキーのトークン
//! uid:u::::...::Name (c) <e@x>:   ← field 10 = ユーザーID（\xHH エスケープ）
//! sub:...                         ← 以降の fpr はサブキーなので無視
//! ```

use super::{IdentitySnapshot, IdentitySource, MalformedRecord, RawIdentity, SubIdentity};
use crate::error::{Result, VcimError};
use regex::Regex;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::debug;

static UID_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?P<email>[^<>]*)>").expect("uid email pattern is valid"));

static UID_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("uid comment pattern is valid"));

/// GnuPG キーリングを列挙するソース
#[derive(Debug, Clone)]
pub struct GnuPgSource {
    home: PathBuf,
    binary: String,
}

impl GnuPgSource {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            binary: "gpg".to_string(),
        }
    }

    /// gpg 実行ファイルを差し替える
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    async fn run_gpg(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--homedir")
            .arg(&self.home)
            .args([
                "--batch",
                "--no-tty",
                "--with-colons",
                "--fixed-list-mode",
                "--fingerprint",
                "--list-keys",
            ])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                VcimError::unavailable(self.describe(), format!("failed to run {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcimError::unavailable(
                self.describe(),
                format!("{} exited with {}: {}", self.binary, output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn list_keys(&self) -> Result<IdentitySnapshot> {
        let listing = self.run_gpg().await?;
        let snapshot = parse_colon_listing(&listing);
        debug!(source = %self.describe(), keys = snapshot.len(), "gpg listing parsed");
        Ok(snapshot)
    }
}

impl IdentitySource for GnuPgSource {
    fn describe(&self) -> String {
        format!("gnupg:{}", self.home.display())
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        Box::pin(self.list_keys())
    }
}

/// 解析中のキー
struct KeyBuilder {
    key_id: String,
    fingerprint: Option<String>,
    in_subkey: bool,
    uids: Vec<SubIdentity>,
}

impl KeyBuilder {
    fn finish(self) -> std::result::Result<RawIdentity, MalformedRecord> {
        match self.fingerprint {
            Some(fpr) if !fpr.is_empty() => Ok(RawIdentity::new(fpr, self.uids)),
            _ => Err(MalformedRecord::new(self.key_id, "key has no fingerprint")),
        }
    }
}

/// `gpg --with-colons` の出力をスナップショットに変換（キーの出現順）
pub fn parse_colon_listing(listing: &str) -> IdentitySnapshot {
    let mut entries = Vec::new();
    let mut current: Option<KeyBuilder> = None;

    for line in listing.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        match fields[0] {
            "pub" => {
                if let Some(key) = current.take() {
                    entries.push(key.finish());
                }
                let key_id = fields.get(4).copied().unwrap_or_default();
                current = Some(KeyBuilder {
                    key_id: if key_id.is_empty() { "unknown".to_string() } else { key_id.to_string() },
                    fingerprint: None,
                    in_subkey: false,
                    uids: Vec::new(),
                });
            }
            "fpr" => {
                if let Some(key) = current.as_mut() {
                    if !key.in_subkey && key.fingerprint.is_none() {
                        key.fingerprint = fields.get(9).map(|f| f.trim().to_string());
                    }
                }
            }
            "sub" | "ssb" => {
                if let Some(key) = current.as_mut() {
                    key.in_subkey = true;
                }
            }
            "uid" => {
                if let Some(key) = current.as_mut() {
                    let raw = fields.get(9).copied().unwrap_or_default();
                    key.uids.push(parse_uid(&unescape_colon_field(raw)));
                }
            }
            _ => {}
        }
    }

    if let Some(key) = current.take() {
        entries.push(key.finish());
    }

    IdentitySnapshot::new(entries)
}

/// ユーザーID を名前とメールに分解
///
/// `<email>` はどこにあってもよい。残りからコメント `(...)` を除いた部分が名前。
fn parse_uid(uid: &str) -> SubIdentity {
    let uid = uid.trim();

    let found = UID_EMAIL_RE
        .captures(uid)
        .and_then(|caps| Some((caps.get(0)?, caps.name("email")?)));
    if let Some((whole, email)) = found {
        let rest = format!("{} {}", &uid[..whole.start()], &uid[whole.end()..]);
        let email = email.as_str().trim();
        return SubIdentity::new(
            Some(email).filter(|e| !e.is_empty()),
            uid_name(&rest).as_deref(),
        );
    }

    // 山括弧なしのアドレスのみのユーザーID
    if is_bare_email(uid) {
        SubIdentity::new(Some(uid), None)
    } else {
        SubIdentity::new(None, uid_name(uid).as_deref())
    }
}

/// コメントを除き空白を詰めた名前
fn uid_name(text: &str) -> Option<String> {
    let stripped = UID_COMMENT_RE.replace_all(text, " ");
    let name = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

fn is_bare_email(value: &str) -> bool {
    value.contains('@') && !value.contains(char::is_whitespace)
}

/// `\xHH` エスケープを復元
fn unescape_colon_field(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() && bytes[i + 1] == b'x' {
            let decoded = std::str::from_utf8(&bytes[i + 2..i + 4])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
#[path = "gnupg_test.rs"]
mod tests;
