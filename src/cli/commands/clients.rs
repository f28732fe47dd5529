use clap::Subcommand;

use crate::cli::utils::{output_rows, require_enabled};
use crate::cli::{CliContext, OutputFormat};
use crate::models::{ClientAccount, ClientStatus};

#[derive(Subcommand)]
pub enum ClientCommands {
    #[command(about = "List client accounts")]
    List,
}

pub async fn handle(cmd: ClientCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load().await?;
    let account = ctx.account_id();

    match cmd {
        ClientCommands::List => {
            let clients = require_enabled(ctx.service.clients(account.as_deref()).await?)?;
            output_rows(&output_format, "clients", &clients, render_client)
        }
    }
}

fn render_client(client: &ClientAccount) -> String {
    let status = match client.status {
        ClientStatus::Active => "active",
        ClientStatus::Pending => "pending",
        ClientStatus::Inactive => "inactive",
    };
    let contact = client.contact_name.as_deref().unwrap_or("-");
    format!("{}  {}  [{}]  contact: {}", client.id, client.name, status, contact)
}
