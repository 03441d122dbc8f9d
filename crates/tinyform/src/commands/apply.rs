use colored::Colorize;
use tinyform_cloud::CloudApi;
use tinyform_config::Settings;
use tinyform_core::Deployment;

pub async fn handle<A: CloudApi + ?Sized>(
    api: &A,
    deployment: &Deployment,
    settings: &Settings,
) -> anyhow::Result<()> {
    println!("{}", "SSHキーを確認中...".blue());

    let state = super::orchestrator(api, settings)
        .create(&deployment.droplet)
        .await?;

    println!();
    println!("{}", "✓ droplet の作成が完了しました".green().bold());
    println!(
        "Droplet available at IP ({}) with ID ({})",
        state.ip, state.id
    );

    Ok(())
}
