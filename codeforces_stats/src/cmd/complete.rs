use crate::cmd::{open_state, print_json, OutputFormat};
use anyhow::Result;
use clap::{Args, Subcommand};
use codeforces_stats_libs::codeforces::problem_url;
use codeforces_stats_libs::storage::CompletionStore;
use codeforces_stats_libs::ProblemKey;

#[derive(Debug, Args)]
pub struct CompleteArgs {
    #[command(subcommand)]
    action: CompleteAction,
}

#[derive(Debug, Subcommand)]
enum CompleteAction {
    /// Flip the completed flag of a problem, e.g. `1791-C`
    Toggle { key: ProblemKey },
    /// Mark a problem as completed
    Set { key: ProblemKey },
    /// Mark a problem as not completed
    Unset { key: ProblemKey },
    /// List completed problems
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

pub fn run(args: CompleteArgs) -> Result<()> {
    let store = CompletionStore::new(open_state()?);

    match args.action {
        CompleteAction::Toggle { key } => {
            let completed = store.toggle(&key)?;
            report(&key, completed);
        }
        CompleteAction::Set { key } => {
            store.set(&key, true)?;
            report(&key, true);
        }
        CompleteAction::Unset { key } => {
            store.set(&key, false)?;
            report(&key, false);
        }
        CompleteAction::List { format } => {
            let keys = store.completed()?;
            match format {
                OutputFormat::Text => {
                    for key in keys.iter() {
                        println!("{:<10} {}", key.to_string(), problem_url(key, false));
                    }
                }
                OutputFormat::Json => {
                    let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
                    print_json(&keys)?;
                }
            }
        }
    }
    Ok(())
}

fn report(key: &ProblemKey, completed: bool) {
    tracing::info!(
        "{} marked as {}",
        key,
        if completed { "completed" } else { "not completed" }
    );
    println!("{} {}", if completed { "[x]" } else { "[ ]" }, key);
}
