use clap::Subcommand;

use crate::cli::utils::{output_rows, require_enabled};
use crate::cli::{CliContext, OutputFormat};
use crate::models::ShiftAssignment;

#[derive(Subcommand)]
pub enum ShiftCommands {
    #[command(about = "List shifts overlapping the upcoming window")]
    List {
        #[arg(long, default_value_t = 14, help = "Window length in days")]
        days: i64,
    },
}

pub async fn handle(cmd: ShiftCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load().await?;
    let account = ctx.account_id();

    match cmd {
        ShiftCommands::List { days } => {
            let shifts = require_enabled(
                ctx.service.upcoming_shifts(account.as_deref(), days).await?,
            )?;
            output_rows(&output_format, "shifts", &shifts, render_shift)
        }
    }
}

fn render_shift(shift: &ShiftAssignment) -> String {
    let site = shift
        .site
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or(shift.site_id.as_str());
    let guard = shift
        .guard
        .as_ref()
        .map(|g| format!("{} {}", g.first_name, g.last_name))
        .unwrap_or_else(|| "unassigned".to_string());
    format!(
        "{}  {} -> {}  [{}]  {}  {}",
        shift.id,
        shift.start_time.format("%Y-%m-%d %H:%M"),
        shift.end_time.format("%Y-%m-%d %H:%M"),
        shift.status.as_str(),
        site,
        guard
    )
}
