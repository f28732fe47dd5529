use clap::Subcommand;

use crate::cli::utils::{output_rows, require_enabled};
use crate::cli::{CliContext, OutputFormat};
use crate::models::OperationsReport;

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "List submitted reports, newest first")]
    List,
}

pub async fn handle(cmd: ReportCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load().await?;
    let account = ctx.account_id();

    match cmd {
        ReportCommands::List => {
            let reports = require_enabled(ctx.service.reports(account.as_deref()).await?)?;
            output_rows(&output_format, "reports", &reports, render_report)
        }
    }
}

fn render_report(report: &OperationsReport) -> String {
    format!(
        "{}  {}  [{}]  {}",
        report.id,
        report.submitted_at.format("%Y-%m-%d %H:%M"),
        report.report_type,
        report.title
    )
}
