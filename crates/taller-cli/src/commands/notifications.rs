use anyhow::{Result, bail};
use taller_application::{Console, MarkAllOutcome};
use taller_core::notification::NotificationId;

pub async fn list(console: &Console, unread_only: bool) -> Result<()> {
    console.feed().refresh().await?;
    let records = if unread_only {
        console.feed().unread()
    } else {
        console.feed().records()
    };

    if records.is_empty() {
        println!("No notifications");
        return Ok(());
    }
    for record in &records {
        println!(
            "{} #{:<5} {}  {} (orden {})",
            if record.read { " " } else { "*" },
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.message,
            record.reference_id
        );
    }
    println!("{} unread", console.feed().unread_count());
    Ok(())
}

pub async fn read(console: &Console, id: NotificationId) -> Result<()> {
    console.mark_read(id).await?;
    println!("Notification {id} marked read");
    Ok(())
}

pub async fn read_all(console: &Console) -> Result<()> {
    let outcome = console.mark_all_read().await;
    println!("{}", marked_summary(&outcome));
    if !outcome.is_complete() {
        for (id, e) in &outcome.failed {
            eprintln!("  #{id}: {e}");
        }
        bail!("{} notification(s) could not be marked", outcome.failed.len());
    }
    Ok(())
}

fn marked_summary(outcome: &MarkAllOutcome) -> String {
    format!("{} marked read", outcome.marked.len())
}
