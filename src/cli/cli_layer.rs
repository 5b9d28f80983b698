// CLI layer - argument parsing and command dispatch.
//
// Same rule as any adapter: pull primitive values out of the arguments, call
// the core service or infra client, print the result. No business logic here.

use clap::{Parser, Subcommand};

#[path = "commands/chatwork.rs"]
pub mod chatwork;

#[path = "commands/drive.rs"]
pub mod drive;

#[path = "commands/sheets.rs"]
pub mod sheets;

#[path = "commands/notify.rs"]
pub mod notify;

#[path = "commands/browser.rs"]
pub mod browser;

#[derive(Debug, Parser)]
#[command(name = "office-hooks", version, about = "Run back-office API calls from the shell")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chatwork messages, files, tasks and contacts
    Chatwork(chatwork::ChatworkArgs),
    /// Google Drive files and folders
    Drive(drive::DriveArgs),
    /// Google Sheets values
    Sheets(sheets::SheetsArgs),
    /// Post to a Slack incoming webhook
    Slack(notify::SlackArgs),
    /// Read AWS Parameter Store values
    Params(notify::ParamsArgs),
    /// Open a headless Chrome session through chromedriver
    Browser(browser::BrowserArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Chatwork(args) => chatwork::run(args).await,
        Command::Drive(args) => drive::run(args).await,
        Command::Sheets(args) => sheets::run(args).await,
        Command::Slack(args) => notify::run_slack(args).await,
        Command::Params(args) => notify::run_params(args).await,
        Command::Browser(args) => browser::run(args).await,
    }
}

/// Pretty-prints any serializable result to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chatwork_post() {
        let cli = Cli::try_parse_from([
            "office-hooks",
            "chatwork",
            "--token",
            "t",
            "post",
            "--room",
            "42",
            "--message",
            "hello",
            "--to",
            "自動通知 bot",
        ])
        .unwrap();

        match cli.command {
            Command::Chatwork(args) => match args.command {
                chatwork::ChatworkCommand::Post { room, to, .. } => {
                    assert_eq!(room, 42);
                    assert_eq!(to, vec!["自動通知 bot".to_string()]);
                }
                other => panic!("unexpected command: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_sheets_post_anchor() {
        let cli = Cli::try_parse_from([
            "office-hooks",
            "sheets",
            "post",
            "--sheet-id",
            "abc",
            "--sheet-name",
            "Sheet1",
            "--row",
            "2",
            "--col",
            "3",
            "--values",
            r#"[["a","b"]]"#,
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Sheets(_)));
    }
}
