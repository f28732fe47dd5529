pub mod commands;
pub mod session;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::account::AccountResolver;
use crate::client::RemoteClient;
use crate::services::OpsService;

#[derive(Parser)]
#[command(name = "watchdesk")]
#[command(about = "WatchDesk CLI - operations console for contract guard accounts")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Guard roster operations")]
    Guards {
        #[command(subcommand)]
        cmd: commands::guards::GuardCommands,
    },

    #[command(about = "Incident reporting and review")]
    Incidents {
        #[command(subcommand)]
        cmd: commands::incidents::IncidentCommands,
    },

    #[command(about = "Covered site listings")]
    Sites {
        #[command(subcommand)]
        cmd: commands::sites::SiteCommands,
    },

    #[command(about = "Client account listings")]
    Clients {
        #[command(subcommand)]
        cmd: commands::clients::ClientCommands,
    },

    #[command(about = "Shift schedule queries")]
    Shifts {
        #[command(subcommand)]
        cmd: commands::shifts::ShiftCommands,
    },

    #[command(about = "Submitted operations reports")]
    Reports {
        #[command(subcommand)]
        cmd: commands::reports::ReportCommands,
    },

    #[command(about = "Aggregate dashboard counters")]
    Dashboard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command handler needs: the service layer plus the resolved
/// account context. Built once per invocation; a saved session (if any) is
/// restored before the account is resolved.
pub struct CliContext {
    pub client: RemoteClient,
    pub service: OpsService,
    pub resolver: AccountResolver,
}

impl CliContext {
    pub async fn load() -> anyhow::Result<Self> {
        let client = RemoteClient::from_env();

        if let Some(stored) = session::load_session()? {
            if client.auth().set_session(&stored.access_token).is_err() {
                // Unreadable or expired token on disk: drop it and continue
                // anonymously rather than failing every command.
                session::clear_session()?;
            }
        }

        let service = OpsService::new(client.clone(), crate::config::query_config());
        let resolver = AccountResolver::start(client.clone()).await;

        Ok(Self {
            client,
            service,
            resolver,
        })
    }

    pub fn account_id(&self) -> Option<String> {
        self.resolver.account_id()
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Guards { cmd } => commands::guards::handle(cmd, output_format).await,
        Commands::Incidents { cmd } => commands::incidents::handle(cmd, output_format).await,
        Commands::Sites { cmd } => commands::sites::handle(cmd, output_format).await,
        Commands::Clients { cmd } => commands::clients::handle(cmd, output_format).await,
        Commands::Shifts { cmd } => commands::shifts::handle(cmd, output_format).await,
        Commands::Reports { cmd } => commands::reports::handle(cmd, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
    }
}
