//! 構文木の解釈
//!
//! 構文木を1回走査して、変数・provider の token 式・droplet 設定を組み立てます。
//! 走査中に共有状態は持たず、結果は [`Interpretation`] として返します。
//! 副作用は `ssh_keys` 内の `file("...")` が指す公開鍵の読み込みのみです。

use crate::error::{FlowError, Result};
use crate::model::{
    AttrValue, DropletConfig, PROVIDER_DIGITALOCEAN, RESOURCE_DROPLET, TokenExpr, Variables,
};
use crate::syntax::{Block, Body, Expr, SourceFile, dequote};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// 解釈結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpretation {
    pub variables: Variables,
    pub token: Option<TokenExpr>,
    pub droplet: Option<DropletConfig>,
}

/// 構文木インタプリタ
#[derive(Debug, Clone)]
pub struct Interpreter {
    /// `~` の展開先
    home_dir: Option<PathBuf>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            home_dir: dirs::home_dir(),
        }
    }

    /// `~` の展開先を指定して作成
    pub fn with_home_dir(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: Some(home_dir.into()),
        }
    }

    /// 構文木を解釈
    pub fn interpret(&self, file: &SourceFile) -> Result<Interpretation> {
        let mut result = Interpretation::default();
        let mut provider_seen = false;

        for block in &file.blocks {
            match block {
                Block::Variable { name, body } => {
                    let name = dequote(name);
                    // default のない変数は記録しない
                    if let Some(value) = last_value(body, "default") {
                        let value = dequote(&value.text()).to_string();
                        tracing::debug!("[var] {}", name);
                        result.variables.insert(name, value);
                    }
                }
                Block::Provider { name, body } => {
                    let name = dequote(name);
                    if name != PROVIDER_DIGITALOCEAN {
                        return Err(FlowError::UnsupportedProvider(name.to_string()));
                    }
                    if provider_seen {
                        return Err(FlowError::DuplicateProvider);
                    }
                    provider_seen = true;
                    result.token = last_value(body, "token").map(|e| TokenExpr::from_raw(&e.text()));
                }
                Block::Resource {
                    resource_type,
                    name,
                    body,
                } => {
                    let resource_type = dequote(resource_type);
                    let name = dequote(name);
                    if resource_type != RESOURCE_DROPLET {
                        tracing::debug!("Skipping resource {}.{}", resource_type, name);
                        continue;
                    }
                    if result.droplet.is_some() {
                        tracing::warn!(
                            "Ignoring additional {} resource '{}': only one droplet is supported",
                            RESOURCE_DROPLET,
                            name
                        );
                        continue;
                    }
                    result.droplet = Some(self.droplet(name, body)?);
                }
            }
        }

        Ok(result)
    }

    fn droplet(&self, name: &str, body: &Body) -> Result<DropletConfig> {
        let mut droplet = DropletConfig::new(name);

        for pair in &body.pairs {
            let value = match &pair.value {
                Expr::List(items) => AttrValue::List(items.iter().map(Expr::text).collect()),
                scalar => AttrValue::Scalar(dequote(&scalar.text()).to_string()),
            };
            droplet.attributes.insert(pair.key.clone(), value);
        }

        self.resolve_ssh_keys(&mut droplet)?;
        Ok(droplet)
    }

    /// `ssh_keys` から参照・公開鍵ファイルを取り出す
    fn resolve_ssh_keys(&self, droplet: &mut DropletConfig) -> Result<()> {
        let items = match droplet.get("ssh_keys") {
            None => return Ok(()),
            Some(AttrValue::List(items)) => items.clone(),
            Some(AttrValue::Scalar(value)) => {
                return Err(FlowError::InvalidSshKeysType(value.clone()));
            }
        };

        let file_re = Regex::new(r#"file\("([^"]+)"\)"#)
            .map_err(|e| FlowError::InvalidConfig(format!("正規表現のコンパイルエラー: {}", e)))?;

        for item in items {
            if item.contains("digitalocean_ssh_key") {
                droplet.ssh_key_reference = Some(item);
            } else if item.contains("file(") {
                let Some(captures) = file_re.captures(&item) else {
                    continue;
                };
                let path = self.expand_home(&captures[1]);
                let content = fs::read_to_string(&path)
                    .map_err(|_| FlowError::SshKeyFileNotFound { path: path.clone() })?;
                tracing::debug!("Loaded SSH public key from {}", path.display());
                droplet.ssh_key_content = Some(content.trim().to_string());
                droplet.ssh_key_path = Some(path);
            }
        }

        Ok(())
    }

    /// 先頭の `~` をホームディレクトリに展開
    pub fn expand_home(&self, path: &str) -> PathBuf {
        expand_home_with(path, self.home_dir.as_deref())
    }
}

/// 先頭の `~` を現在のユーザーのホームディレクトリに展開
pub fn expand_home(path: &str) -> PathBuf {
    expand_home_with(path, dirs::home_dir().as_deref())
}

/// `~` 単体または `~/...` を `home` に展開する
///
/// `~user/...` や `home` がない場合はそのまま返す。
pub fn expand_home_with(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest.trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}

/// 同じキーが複数あるときは後勝ち
fn last_value<'a>(body: &'a Body, key: &str) -> Option<&'a Expr> {
    body.pairs
        .iter()
        .rev()
        .find(|kv| kv.key == key)
        .map(|kv| &kv.value)
}

#[cfg(test)]
mod tests;
