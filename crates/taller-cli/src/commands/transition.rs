use anyhow::Result;
use taller_application::Console;

use crate::MoveArgs;

pub async fn move_order(console: &Console, args: MoveArgs) -> Result<()> {
    let mut form = console.transitions().open_form(args.id).await?;
    form.set_stage(args.stage);
    if let Some(sub_state) = args.sub_state {
        form.set_sub_state(sub_state);
    }
    if args.technician.is_some() {
        form.set_technician(args.technician);
    }

    let updated = console.submit_transition(&form).await?;
    println!(
        "Order {} is now {}/{}",
        updated.order_number,
        updated.stage.map(|s| s.as_str()).unwrap_or("-"),
        updated.sub_state.map(|s| s.as_str()).unwrap_or("-")
    );
    Ok(())
}
