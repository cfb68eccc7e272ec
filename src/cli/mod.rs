//! CLI module for vizchat.
//!
//! - Argument parsing
//! - Version display
//! - Session commands and live streaming of replies
//!
//! # Usage
//!
//! ```ignore
//! use vizchat::cli::{parse_args, run_cli_command};
//!
//! let args = parse_args(std::env::args());
//! run_cli_command(args.command, config).await?;
//! ```

pub mod args;
pub mod commands;
pub mod render;
pub mod version;

pub use args::{parse_args, CliArgs, CliCommand, USAGE};
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::client::ChatClient;
use crate::config::ClientConfig;

/// Run a parsed command against the backend described by `config`.
pub async fn run_cli_command(command: CliCommand, config: ClientConfig) -> Result<()> {
    match command {
        CliCommand::Version => {
            handle_version_command();
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Invalid(reason) => return Err(eyre!("{}\n\n{}", reason, USAGE)),
        _ => {}
    }

    config.validate()?;
    let client = ChatClient::new(config);

    match command {
        CliCommand::Sessions => commands::handle_sessions_command(&client).await,
        CliCommand::New { title } => commands::handle_new_command(&client, title.as_deref()).await,
        CliCommand::Rename { session_id, title } => {
            commands::handle_rename_command(&client, &session_id, &title).await
        }
        CliCommand::Delete { session_id } => {
            commands::handle_delete_command(&client, &session_id).await
        }
        CliCommand::Show { session_id } => commands::handle_show_command(&client, &session_id).await,
        CliCommand::Ask { session_id, text } => {
            commands::handle_ask_command(&client, &session_id, &text).await
        }
        CliCommand::Version | CliCommand::Help | CliCommand::Invalid(_) => Ok(()),
    }
}
