use clap::Subcommand;

use crate::cli::utils::{output_rows, require_enabled};
use crate::cli::{CliContext, OutputFormat};
use crate::models::Site;

#[derive(Subcommand)]
pub enum SiteCommands {
    #[command(about = "List covered sites")]
    List {
        #[arg(long, help = "Include sites no longer under contract")]
        include_inactive: bool,
    },
}

pub async fn handle(cmd: SiteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load().await?;
    let account = ctx.account_id();

    match cmd {
        SiteCommands::List { include_inactive } => {
            let sites = require_enabled(
                ctx.service
                    .sites(account.as_deref(), include_inactive)
                    .await?,
            )?;
            output_rows(&output_format, "sites", &sites, render_site)
        }
    }
}

fn render_site(site: &Site) -> String {
    let active = if site.is_active { "active" } else { "inactive" };
    format!("{}  {}  [{}]  {}", site.id, site.name, active, site.timezone)
}
