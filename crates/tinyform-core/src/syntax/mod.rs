//! 構文木
//!
//! HCLサブセットの設定ファイルをパースした結果。ノードの種類は
//! `variable` / `provider` / `resource` の3ブロックに限られる。
//! クォート付きのリテラルは、インタプリタが明示的に外すまでクォートを保持する。

mod lexer;
mod parser;

pub use parser::{parse_file, parse_source};

/// パース済みのソースファイル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFile {
    pub blocks: Vec<Block>,
}

/// トップレベルのブロック
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Variable {
        /// クォート付きの変数名（例: `"token"`）
        name: String,
        body: Body,
    },
    Provider {
        name: String,
        body: Body,
    },
    Resource {
        resource_type: String,
        name: String,
        body: Body,
    },
}

/// `{ key = expr ... }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub pairs: Vec<KeyValue>,
}

impl Body {
    /// 最初に現れた `key` の式
    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.pairs.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Expr,
}

/// 式: スカラーは空白を除いたトークン列の生テキスト、リストは要素の列
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Scalar(String),
    List(Vec<Expr>),
}

impl Expr {
    /// 生テキスト（例: `file("~/.ssh/id_rsa.pub")`, `[a,b]`）
    pub fn text(&self) -> String {
        match self {
            Expr::Scalar(text) => text.clone(),
            Expr::List(items) => {
                let inner: Vec<String> = items.iter().map(Expr::text).collect();
                format!("[{}]", inner.join(","))
            }
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::List(items) => Some(items),
            Expr::Scalar(_) => None,
        }
    }
}

/// 両端のダブルクォートを外す
pub fn dequote(text: &str) -> &str {
    text.trim_matches('"')
}
