use serde_json::json;

use crate::cli::utils::require_enabled;
use crate::cli::{CliContext, OutputFormat};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load().await?;
    let account = ctx.account_id();

    let metrics = require_enabled(ctx.service.dashboard_metrics(account.as_deref()).await?)?;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!(metrics))?);
        }
        OutputFormat::Text => {
            println!("Guards (active):        {}", metrics.guard_count);
            println!("Shifts (upcoming):      {}", metrics.active_shift_count);
            println!("Incidents (open):       {}", metrics.open_incident_count);
            println!("Reports (last 30 days): {}", metrics.report_count_last_30_days);
        }
    }
    Ok(())
}
