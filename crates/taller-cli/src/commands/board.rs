use anyhow::Result;
use chrono::Local;
use taller_application::Console;
use taller_core::work_order::{FilterState, StageKey, WorkOrder, board_view};

use crate::BoardArgs;

pub async fn show(console: &Console, args: BoardArgs) -> Result<()> {
    let orders = console.board().orders().await?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let filter = filter_from(args);

    let view = board_view(&orders, &filter, today);
    for key in StageKey::ALL {
        println!("{} ({})", key, view.counts.get(key));
        for order in view.buckets.get(key) {
            println!("  {}", summary(order));
        }
    }
    Ok(())
}

fn filter_from(args: BoardArgs) -> FilterState {
    let mut filter = FilterState::default().with_due_soon(args.due_soon);
    if let Some(search) = args.search {
        filter = filter.with_search(search);
    }
    for priority in args.priority {
        filter = filter.with_priority(priority);
    }
    filter
}

fn summary(order: &WorkOrder) -> String {
    let client = order.client_first_name().unwrap_or("-");
    let sub_state = order.sub_state.map(|s| s.as_str()).unwrap_or("-");
    let promised = order
        .promised_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let technician = order
        .technician_id
        .map(|id| format!("tec {id}"))
        .unwrap_or_else(|| "sin técnico".to_string());
    format!(
        "#{:<5} {:<10} {:<10} {:<6} {:<10} {:<12} {}",
        order.id,
        order.order_number,
        sub_state,
        order.priority.as_str(),
        promised,
        client,
        technician
    )
}
