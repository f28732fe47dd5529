use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_rows, output_success, require_enabled};
use crate::cli::{CliContext, OutputFormat};
use crate::models::{CreateIncidentInput, IncidentReport, IncidentSeverity, IncidentStatus};

#[derive(Subcommand)]
pub enum IncidentCommands {
    #[command(about = "List incidents, newest first")]
    List {
        #[arg(long, help = "Filter by status: open, in_review, resolved or archived")]
        status: Option<String>,
    },

    #[command(about = "Report a new incident (always opens as 'open')")]
    Report {
        #[arg(long, help = "Site id where the incident occurred")]
        site: String,
        #[arg(long, help = "One-line summary")]
        summary: String,
        #[arg(long = "type", help = "Incident type, e.g. break_in, medical, vandalism")]
        incident_type: String,
        #[arg(long, help = "Severity: low, medium, high or critical")]
        severity: String,
        #[arg(long, help = "Guard involved, if any")]
        guard: Option<String>,
        #[arg(long, help = "Shift during which it occurred, if any")]
        shift: Option<String>,
        #[arg(long, help = "Occurrence time (RFC 3339), defaults to now")]
        occurred_at: Option<DateTime<Utc>>,
    },
}

pub async fn handle(cmd: IncidentCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load().await?;
    let account = ctx.account_id();

    match cmd {
        IncidentCommands::List { status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let incidents = require_enabled(
                ctx.service.incidents(account.as_deref(), status).await?,
            )?;
            output_rows(&output_format, "incidents", &incidents, render_incident)
        }
        IncidentCommands::Report {
            site,
            summary,
            incident_type,
            severity,
            guard,
            shift,
            occurred_at,
        } => {
            let incident = ctx
                .service
                .create_incident(
                    account.as_deref(),
                    CreateIncidentInput {
                        site_id: site,
                        summary,
                        incident_type,
                        occurred_at: occurred_at.unwrap_or_else(Utc::now),
                        severity: parse_severity(&severity)?,
                        guard_id: guard,
                        shift_id: shift,
                    },
                )
                .await?;

            output_success(
                &output_format,
                &format!("Incident reported as {}", incident.status.as_str()),
                Some(json!({ "id": incident.id })),
            )
        }
    }
}

fn render_incident(incident: &IncidentReport) -> String {
    let site = incident
        .site
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or(incident.site_id.as_str());
    format!(
        "{}  {}  [{}]  {}  {}",
        incident.id,
        incident.occurred_at.format("%Y-%m-%d %H:%M"),
        incident.status.as_str(),
        site,
        incident.summary
    )
}

fn parse_status(value: &str) -> anyhow::Result<IncidentStatus> {
    match value {
        "open" => Ok(IncidentStatus::Open),
        "in_review" => Ok(IncidentStatus::InReview),
        "resolved" => Ok(IncidentStatus::Resolved),
        "archived" => Ok(IncidentStatus::Archived),
        other => Err(anyhow::anyhow!(
            "Unknown status '{}', expected open, in_review, resolved or archived",
            other
        )),
    }
}

fn parse_severity(value: &str) -> anyhow::Result<IncidentSeverity> {
    match value {
        "low" => Ok(IncidentSeverity::Low),
        "medium" => Ok(IncidentSeverity::Medium),
        "high" => Ok(IncidentSeverity::High),
        "critical" => Ok(IncidentSeverity::Critical),
        other => Err(anyhow::anyhow!(
            "Unknown severity '{}', expected low, medium, high or critical",
            other
        )),
    }
}
