mod commands;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tinyform_cloud::DigitalOceanClient;
use tinyform_config::Settings;

#[derive(Parser)]
#[command(name = "tinyform", version)]
#[command(about = "HCLファイル1つで DigitalOcean の droplet を作成・削除します。", long_about = None)]
struct Cli {
    /// 設定ファイル (例: main.tf)
    file: PathBuf,

    /// 状態ファイルに記録された droplet を削除する
    #[arg(short, long)]
    destroy: bool,

    /// 状態ファイルのパス（デフォルト: .tfstate）
    #[arg(long)]
    state: Option<PathBuf>,

    /// IPアドレス割り当て待ちのポーリング回数の上限
    #[arg(long)]
    max_poll_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ログは stderr に出力（RUST_LOG で制御）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(state) = cli.state {
        settings.state_file = state;
    }
    if let Some(attempts) = cli.max_poll_attempts {
        settings.max_poll_attempts = Some(attempts);
    }
    tracing::debug!("Settings: {:?}", settings);

    println!(
        "設定ファイル: {}",
        cli.file.display().to_string().cyan()
    );
    let deployment = tinyform_core::load_configuration(&cli.file)?;

    let client = DigitalOceanClient::with_base_url(&deployment.token, &settings.api_url);

    if cli.destroy {
        commands::destroy::handle(&client, &settings).await
    } else {
        commands::apply::handle(&client, &deployment, &settings).await
    }
}
