pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tinyform_cloud::{
    DEFAULT_POLL_INTERVAL, DEFAULT_PUBLIC_KEY, DEFAULT_STATE_FILE, DIGITALOCEAN_API_BASE,
};

const CONFIG_FILE: &str = "config.yaml";

/// Tinyformの設定ディレクトリ (~/.config/tinyform)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("tinyform"))
}

/// ユーザー設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// DigitalOcean API のベースURL
    pub api_url: String,

    /// 状態ファイルのパス
    pub state_file: PathBuf,

    /// ssh_keys に file(...) がないときに使う公開鍵
    pub public_key_path: String,

    /// IPアドレス割り当て待ちのポーリング間隔（秒）
    pub poll_interval_secs: u64,

    /// ポーリング回数の上限（未指定なら無制限）
    pub max_poll_attempts: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DIGITALOCEAN_API_BASE.to_string(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            public_key_path: DEFAULT_PUBLIC_KEY.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            max_poll_attempts: None,
        }
    }
}

impl Settings {
    /// 設定を読み込む
    ///
    /// 以下の順で上書き:
    /// 1. デフォルト値
    /// 2. 設定ファイル (TINYFORM_CONFIG_PATH、なければ ~/.config/tinyform/config.yaml)
    /// 3. 環境変数 TINYFORM_API_URL / TINYFORM_STATE_FILE / TINYFORM_PUBLIC_KEY /
    ///    TINYFORM_POLL_INTERVAL / TINYFORM_MAX_POLL_ATTEMPTS
    pub fn load() -> Result<Self> {
        let mut settings = match find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env()?;
        Ok(settings)
    }

    /// YAMLファイルから読み込む（未指定の項目はデフォルト値）
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        // 0秒だと待機なしで API を叩き続ける
        if settings.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                path: path.to_path_buf(),
                name: "poll_interval_secs".to_string(),
                value: "0".to_string(),
            });
        }
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// 環境変数で上書き
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("TINYFORM_API_URL") {
            self.api_url = url;
        }
        if let Ok(path) = std::env::var("TINYFORM_STATE_FILE") {
            self.state_file = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("TINYFORM_PUBLIC_KEY") {
            self.public_key_path = path;
        }
        if let Some(secs) = parse_env::<u64>("TINYFORM_POLL_INTERVAL")? {
            if secs == 0 {
                return Err(ConfigError::InvalidEnv {
                    name: "TINYFORM_POLL_INTERVAL".to_string(),
                    value: secs.to_string(),
                });
            }
            self.poll_interval_secs = secs;
        }
        if let Some(attempts) = parse_env("TINYFORM_MAX_POLL_ATTEMPTS")? {
            self.max_poll_attempts = Some(attempts);
        }
        Ok(())
    }
}

/// 設定ファイルを探す
///
/// 1. 環境変数 TINYFORM_CONFIG_PATH（存在する場合）
/// 2. ~/.config/tinyform/config.yaml
fn find_config_file() -> Option<PathBuf> {
    if let Ok(config_path) = std::env::var("TINYFORM_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!("TINYFORM_CONFIG_PATH {} does not exist", path.display());
    }

    get_config_dir()
        .ok()
        .map(|dir| dir.join(CONFIG_FILE))
        .filter(|path| path.exists())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const ENV_VARS: [&str; 6] = [
        "TINYFORM_CONFIG_PATH",
        "TINYFORM_API_URL",
        "TINYFORM_STATE_FILE",
        "TINYFORM_PUBLIC_KEY",
        "TINYFORM_POLL_INTERVAL",
        "TINYFORM_MAX_POLL_ATTEMPTS",
    ];

    fn cleared<'a>() -> Vec<(&'static str, Option<&'a str>)> {
        ENV_VARS.iter().map(|name| (*name, None)).collect()
    }

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("tinyform"));
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, "https://api.digitalocean.com/v2");
        assert_eq!(settings.state_file, PathBuf::from(".tfstate"));
        assert_eq!(settings.public_key_path, "~/.ssh/id_rsa.pub");
        assert_eq!(settings.poll_interval_secs, 5);
        assert_eq!(settings.max_poll_attempts, None);
    }

    #[test]
    fn test_defaults_follow_cloud_crate() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, DIGITALOCEAN_API_BASE);
        assert_eq!(settings.state_file, PathBuf::from(DEFAULT_STATE_FILE));
        assert_eq!(settings.public_key_path, DEFAULT_PUBLIC_KEY);
        assert_eq!(
            std::time::Duration::from_secs(settings.poll_interval_secs),
            DEFAULT_POLL_INTERVAL
        );
    }

    #[test]
    fn test_from_file_partial_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "state_file: deploy/.tfstate\nmax_poll_attempts: 60\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.state_file, PathBuf::from("deploy/.tfstate"));
        assert_eq!(settings.max_poll_attempts, Some(60));
        // 未指定の項目はデフォルト
        assert_eq!(settings.poll_interval_secs, 5);
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "poll_interval_secs: [not, a, number]\n").unwrap();

        let result = Settings::from_file(&path);
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    #[serial]
    fn test_load_with_config_path_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "api_url: http://127.0.0.1:8080/v2\n").unwrap();

        let mut vars = cleared();
        vars[0] = ("TINYFORM_CONFIG_PATH", path.to_str());

        temp_env::with_vars(vars, || {
            let settings = Settings::load().unwrap();
            assert_eq!(settings.api_url, "http://127.0.0.1:8080/v2");
        });
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "poll_interval_secs: 10\nstate_file: a.json\n").unwrap();

        let mut vars = cleared();
        vars[0] = ("TINYFORM_CONFIG_PATH", path.to_str());
        vars[4] = ("TINYFORM_POLL_INTERVAL", Some("1"));
        vars[5] = ("TINYFORM_MAX_POLL_ATTEMPTS", Some("3"));

        temp_env::with_vars(vars, || {
            let settings = Settings::load().unwrap();
            assert_eq!(settings.poll_interval_secs, 1);
            assert_eq!(settings.max_poll_attempts, Some(3));
            assert_eq!(settings.state_file, PathBuf::from("a.json"));
        });
    }

    #[test]
    fn test_from_file_rejects_zero_poll_interval() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "poll_interval_secs: 0\n").unwrap();

        let result = Settings::from_file(&path);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSetting { ref name, .. }) if name == "poll_interval_secs"
        ));
    }

    #[test]
    #[serial]
    fn test_zero_poll_interval_env_is_rejected() {
        let mut vars = cleared();
        vars[4] = ("TINYFORM_POLL_INTERVAL", Some("0"));

        temp_env::with_vars(vars, || {
            let mut settings = Settings::default();
            let result = settings.apply_env();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidEnv { ref name, .. }) if name == "TINYFORM_POLL_INTERVAL"
            ));
            assert_eq!(settings.poll_interval_secs, 5);
        });
    }

    #[test]
    #[serial]
    fn test_invalid_env_value() {
        let mut vars = cleared();
        vars[5] = ("TINYFORM_MAX_POLL_ATTEMPTS", Some("forever"));

        temp_env::with_vars(vars, || {
            let mut settings = Settings::default();
            let result = settings.apply_env();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidEnv { ref name, .. }) if name == "TINYFORM_MAX_POLL_ATTEMPTS"
            ));
        });
    }
}
