use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_record, output_rows, output_success, require_enabled};
use crate::cli::{CliContext, OutputFormat};
use crate::models::{CreateGuardInput, Guard, ShiftPreference};

#[derive(Subcommand)]
pub enum GuardCommands {
    #[command(about = "List guards on the roster")]
    List {
        #[arg(long, help = "Include inactive and suspended guards")]
        include_inactive: bool,
    },

    #[command(about = "Show one guard by id")]
    Show {
        #[arg(help = "Guard id")]
        id: String,
    },

    #[command(about = "Add a guard to the roster")]
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        badge_number: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, help = "Preferred shift: day, swing or night")]
        shift_preference: Option<String>,
        #[arg(long, help = "Primary site id")]
        site: Option<String>,
        #[arg(long, help = "Hire date (YYYY-MM-DD)")]
        hire_date: Option<NaiveDate>,
    },

    #[command(about = "Deactivate a guard (status transition, never a delete)")]
    Deactivate {
        #[arg(help = "Guard id")]
        id: String,
    },
}

pub async fn handle(cmd: GuardCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load().await?;
    let account = ctx.account_id();

    match cmd {
        GuardCommands::List { include_inactive } => {
            let guards = require_enabled(
                ctx.service
                    .guards(account.as_deref(), include_inactive)
                    .await?,
            )?;
            output_rows(&output_format, "guards", &guards, render_guard)
        }
        GuardCommands::Show { id } => {
            let guard = require_enabled(ctx.service.guard(account.as_deref(), &id).await?)?;
            match guard {
                Some(guard) => output_record(&output_format, &guard),
                None => Err(anyhow::anyhow!("Guard '{}' not found", id)),
            }
        }
        GuardCommands::Create {
            first_name,
            last_name,
            badge_number,
            email,
            phone,
            shift_preference,
            site,
            hire_date,
        } => {
            let shift_preference = shift_preference
                .as_deref()
                .map(parse_shift_preference)
                .transpose()?;

            let guard = ctx
                .service
                .create_guard(
                    account.as_deref(),
                    CreateGuardInput {
                        first_name,
                        last_name,
                        badge_number,
                        email,
                        phone,
                        status: None,
                        shift_preference,
                        primary_site_id: site,
                        hire_date,
                    },
                )
                .await?;

            output_success(
                &output_format,
                &format!("Guard {} {} created", guard.first_name, guard.last_name),
                Some(json!({ "id": guard.id })),
            )
        }
        GuardCommands::Deactivate { id } => {
            let guard = ctx.service.deactivate_guard(account.as_deref(), &id).await?;
            output_success(
                &output_format,
                &format!("Guard {} {} deactivated", guard.first_name, guard.last_name),
                Some(json!({ "id": guard.id })),
            )
        }
    }
}

fn render_guard(guard: &Guard) -> String {
    let badge = guard.badge_number.as_deref().unwrap_or("-");
    format!(
        "{}  {} {}  [{}]  badge {}",
        guard.id,
        guard.first_name,
        guard.last_name,
        guard.status.as_str(),
        badge
    )
}

fn parse_shift_preference(value: &str) -> anyhow::Result<ShiftPreference> {
    match value {
        "day" => Ok(ShiftPreference::Day),
        "swing" => Ok(ShiftPreference::Swing),
        "night" => Ok(ShiftPreference::Night),
        other => Err(anyhow::anyhow!(
            "Unknown shift preference '{}', expected day, swing or night",
            other
        )),
    }
}
