use colored::Colorize;
use tinyform_cloud::CloudApi;
use tinyform_config::Settings;

pub async fn handle<A: CloudApi + ?Sized>(api: &A, settings: &Settings) -> anyhow::Result<()> {
    println!(
        "状態ファイル: {}",
        settings.state_file.display().to_string().cyan()
    );

    let state = super::orchestrator(api, settings).destroy().await?;

    println!();
    println!("{}", "✓ droplet を削除しました".green().bold());
    println!("Droplet destroyed with ID ({})", state.id);

    Ok(())
}
