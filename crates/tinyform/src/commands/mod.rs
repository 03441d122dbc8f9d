pub mod apply;
pub mod destroy;

use colored::Colorize;
use std::time::Duration;
use tinyform_cloud::{CloudApi, LifecycleEvent, Orchestrator, PollPolicy, StateManager};
use tinyform_config::Settings;
use tinyform_core::expand_home;

/// 設定値から Orchestrator を組み立てる
pub fn orchestrator<'a, A: CloudApi + ?Sized>(
    api: &'a A,
    settings: &Settings,
) -> Orchestrator<'a, A> {
    Orchestrator::new(api, StateManager::new(&settings.state_file))
        .with_poll_policy(PollPolicy {
            interval: Duration::from_secs(settings.poll_interval_secs),
            max_attempts: settings.max_poll_attempts,
        })
        .with_default_public_key(expand_home(&settings.public_key_path))
        .with_observer(print_event)
}

/// 進捗を表示
fn print_event(event: &LifecycleEvent) {
    match event {
        LifecycleEvent::SshKeyReused { name, fingerprint } => {
            println!("  ✓ 登録済みのSSHキーを使用: {} ({})", name.cyan(), fingerprint);
        }
        LifecycleEvent::SshKeyUploaded { name, fingerprint } => {
            println!("  ✓ SSHキーを登録しました: {} ({})", name.cyan(), fingerprint);
        }
        LifecycleEvent::CreatingDroplet { name } => {
            println!();
            println!(
                "{}",
                format!("■ droplet {} を作成中...", name).green().bold()
            );
        }
        LifecycleEvent::DropletCreated { id } => {
            println!("  ✓ 作成リクエスト受付 (ID: {})", id);
        }
        LifecycleEvent::WaitingForAddress { .. } => {
            println!("  ⏳ IPアドレスの割り当てを待機中...");
        }
        LifecycleEvent::PollAttempt { attempt, .. } => {
            tracing::debug!("Poll attempt {}", attempt);
        }
        LifecycleEvent::DropletReady { ip, .. } => {
            println!("  ✓ IPアドレス: {}", ip.cyan());
        }
        LifecycleEvent::StateSaved { path } => {
            println!("  ✓ 状態を保存しました: {}", path.display());
        }
        LifecycleEvent::DeletingDroplet { id } => {
            println!(
                "{}",
                format!("■ droplet {} を削除中...", id).yellow().bold()
            );
        }
        LifecycleEvent::DropletDeleted { .. } => {
            println!("  ✓ 削除完了");
        }
    }
}
