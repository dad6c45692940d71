use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rovernet",
    about = "RoverNet game backend: player, company and admin log storage",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root of the players/, companies/ and logs/ directories.
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Inspect player records
    #[command(subcommand)]
    Player(RecordCommand),
    /// Inspect company records
    #[command(subcommand)]
    Company(RecordCommand),
    /// Append to or list the admin log
    #[command(subcommand)]
    Log(LogCommand),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on, overriding the config file.
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Subcommand)]
pub enum RecordCommand {
    /// Print the stored document for an id
    Show { id: String },
}

#[derive(Subcommand)]
pub enum LogCommand {
    /// Record an admin action
    Append(AppendArgs),
    /// Show the most recent entries
    List {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Args)]
pub struct AppendArgs {
    #[arg(long)]
    pub actor: i64,
    #[arg(long)]
    pub action: String,
    #[arg(long)]
    pub target: Option<i64>,
    #[arg(long, default_value = "")]
    pub details: String,
    /// Unix seconds; defaults to now.
    #[arg(long)]
    pub timestamp: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_log_append() {
        let cli = Cli::try_parse_from([
            "rovernet", "--data-root", "/srv/data", "log", "append", "--actor", "7", "--action", "ban",
            "--target", "9",
        ])
        .unwrap();
        assert_eq!(cli.data_root, Some(PathBuf::from("/srv/data")));
        match cli.command {
            Command::Log(LogCommand::Append(args)) => {
                assert_eq!(args.actor, 7);
                assert_eq!(args.action, "ban");
                assert_eq!(args.target, Some(9));
                assert_eq!(args.details, "");
                assert_eq!(args.timestamp, None);
            }
            _ => panic!("expected log append"),
        }
    }

    #[test]
    fn parses_player_show_with_json_format() {
        let cli = Cli::try_parse_from(["rovernet", "player", "show", "42", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Player(RecordCommand::Show { ref id }) if id == "42"));
    }
}
