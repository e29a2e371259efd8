use crate::cmd::{open_state, validate_handle};
use anyhow::Result;
use clap::{Args, Subcommand};
use codeforces_stats_libs::storage::PreferenceStore;

#[derive(Debug, Args)]
pub struct HandleArgs {
    #[command(subcommand)]
    action: Option<HandleAction>,
}

#[derive(Debug, Subcommand)]
enum HandleAction {
    /// Print the selected handle
    Show,
    /// Select a handle for later commands
    Set { handle: String },
    /// Forget the selected handle
    Clear,
}

pub fn run(args: HandleArgs) -> Result<()> {
    let preferences = PreferenceStore::new(open_state()?)?;

    match args.action.unwrap_or(HandleAction::Show) {
        HandleAction::Show => match preferences.selected_handle() {
            Some(handle) => println!("{}", handle),
            None => println!("no handle selected"),
        },
        HandleAction::Set { handle } => {
            let handle = handle.trim().to_string();
            validate_handle(&handle)?;
            preferences.set_selected_handle(&handle)?;
            tracing::info!("Selected handle {}", handle);
        }
        HandleAction::Clear => {
            preferences.clear_selected_handle()?;
            tracing::info!("Cleared selected handle");
        }
    }
    Ok(())
}
