//! 設定モデル
//!
//! インタプリタが構文木から組み立てる、変数・トークン式・droplet設定の定義

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// サポートするプロバイダー名
pub const PROVIDER_DIGITALOCEAN: &str = "digitalocean";

/// 対象とするリソースタイプ
pub const RESOURCE_DROPLET: &str = "digitalocean_droplet";

/// `variable` ブロックから集めた変数（default を持つもののみ）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// provider の token 式（未評価）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenExpr {
    /// クォートを外したリテラル
    Literal(String),
    /// `var.<name>` 参照
    VariableRef(String),
}

impl TokenExpr {
    /// 生テキストから分類
    ///
    /// `var.token` → `VariableRef("token")`、`"abc"` → `Literal("abc")`
    pub fn from_raw(raw: &str) -> Self {
        match raw.strip_prefix("var.") {
            Some(rest) => {
                let name = rest.split('.').next().unwrap_or_default();
                TokenExpr::VariableRef(name.to_string())
            }
            None => TokenExpr::Literal(raw.trim_matches('"').to_string()),
        }
    }
}

/// droplet 属性値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    /// クォートを外したスカラー
    Scalar(String),
    /// リスト要素の生テキスト
    List(Vec<String>),
}

impl AttrValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AttrValue::Scalar(s) => Some(s),
            AttrValue::List(_) => None,
        }
    }
}

/// `resource "digitalocean_droplet"` ブロックの設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropletConfig {
    /// リソース名（`resource "digitalocean_droplet" "web"` の `web`）
    pub resource_name: String,

    /// ブロック内の key = value
    pub attributes: BTreeMap<String, AttrValue>,

    /// `digitalocean_ssh_key.*` への参照
    pub ssh_key_reference: Option<String>,

    /// `file("...")` で読み込んだ公開鍵（trim済み）
    pub ssh_key_content: Option<String>,

    /// 展開後の公開鍵パス
    pub ssh_key_path: Option<PathBuf>,
}

impl DropletConfig {
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_scalar)
    }

    /// 必須のスカラー属性を取得
    pub fn required(&self, key: &str) -> Result<&str> {
        self.scalar(key).ok_or_else(|| FlowError::MissingAttribute {
            key: key.to_string(),
        })
    }
}

/// 解決済みのデプロイ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// 解決済みの API トークン
    pub token: String,
    pub droplet: DropletConfig,
    pub variables: Variables,
}
