use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error("設定ファイル {} を読み込めません: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("設定ファイル {} の形式が不正です: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("設定ファイル {} の {name} の値が不正です: '{value}'", path.display())]
    InvalidSetting {
        path: PathBuf,
        name: String,
        value: String,
    },

    #[error("環境変数 {name} の値が不正です: '{value}'")]
    InvalidEnv { name: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
