use std::io::Write;

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::cli::session::{self, StoredSession};
use crate::cli::utils::output_success;
use crate::cli::{CliContext, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and discard the saved session")]
    Logout,

    #[command(about = "Show the signed-in user and resolved account")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password: ")?,
            };

            let client = crate::client::RemoteClient::from_env();
            let new_session = client.auth().sign_in_with_password(&email, &password).await?;

            session::save_session(&StoredSession {
                access_token: new_session.access_token.clone(),
                refresh_token: new_session.refresh_token.clone(),
                saved_at: Utc::now(),
            })?;

            output_success(
                &output_format,
                &format!("Signed in as {}", email),
                Some(json!({
                    "user_id": new_session.user_id,
                    "expires_at": new_session.expires_at,
                })),
            )
        }
        AuthCommands::Logout => {
            session::clear_session()?;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Whoami => {
            let ctx = CliContext::load().await?;
            let state = ctx.resolver.state();

            let user_id = ctx
                .client
                .auth()
                .session()
                .map(|s| s.user_id.to_string());

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "user_id": user_id,
                            "account_id": state.account_id,
                            "role": state.role,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    match user_id {
                        Some(id) => println!("User: {}", id),
                        None => println!("Not signed in"),
                    }
                    match state.account_id {
                        Some(account) => println!("Account: {}", account),
                        None => println!("No account membership"),
                    }
                    if let Some(role) = state.role {
                        println!("Role: {}", role.as_str());
                    }
                }
            }
            Ok(())
        }
    }
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end().to_string())
}
