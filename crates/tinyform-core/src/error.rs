use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("構文エラー ({line}:{column}): {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("サポートされていないプロバイダーです: '{0}' ('digitalocean' のみ対応)")]
    UnsupportedProvider(String),

    #[error("provider ブロックが複数定義されています")]
    DuplicateProvider,

    #[error("provider ブロックに token が指定されていません")]
    MissingToken,

    #[error("provider ブロックで未定義の変数 '{0}' が使われています")]
    UndefinedVariable(String),

    #[error("digitalocean_droplet リソースが見つかりません")]
    MissingResource,

    #[error("ssh_keys はリストである必要があります: {0}")]
    InvalidSshKeysType(String),

    #[error("SSHキーファイル '{}' が見つかりません", path.display())]
    SshKeyFileNotFound { path: PathBuf },

    #[error("droplet に '{key}' が指定されていません")]
    MissingAttribute { key: String },
}

pub type Result<T> = std::result::Result<T, FlowError>;
