use anyhow::Result;
use taller_application::{Console, NoticeLevel};
use tokio::sync::broadcast::error::RecvError;

/// Prints notices and the unread count until Ctrl-C.
pub async fn run(console: &Console) -> Result<()> {
    let mut notices = console.notices().subscribe();
    let mut changes = console.feed().changes();

    let unread = console.feed().refresh().await?;
    println!(
        "Watching for assignments ({} unread). Ctrl-C to stop.",
        unread.iter().filter(|r| !r.read).count()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            notice = notices.recv() => match notice {
                Ok(notice) => match notice.level {
                    NoticeLevel::Info => println!("> {}", notice.message),
                    NoticeLevel::Error => eprintln!("! {}", notice.message),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[cli] Skipped {} notices", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                // Invalidations bump the revision too; only report fresh data.
                if console.feed().is_cached() {
                    println!("  {} unread", console.feed().unread_count());
                }
            }
        }
    }
    Ok(())
}
