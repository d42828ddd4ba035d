use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Watches a document repository and reports new or superseded documents.
#[derive(Debug, Parser)]
#[command(name = "docwatch", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true, env = "DOCWATCH_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More output; repeat for even more.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Do not remember anything or send anything; log what would be sent.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single pass now.
    Run,
    /// Run a pass every few hours, within working hours.
    Watch,
    /// Forget the remembered repository state.
    Clear,
    /// Show how filenames are identified as documents.
    Identify {
        #[arg(required = true, value_name = "FILENAME")]
        filenames: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["docwatch", "run"], 0, false)]
    #[case(&["docwatch", "-vv", "watch"], 2, false)]
    #[case(&["docwatch", "run", "--dry-run", "-v"], 1, true)]
    fn test_global_flags(#[case] args: &[&str], #[case] verbose: u8, #[case] dry_run: bool) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, verbose);
        assert_eq!(cli.dry_run, dry_run);
    }

    #[test]
    fn test_identify_requires_filenames() {
        assert!(Cli::try_parse_from(["docwatch", "identify"]).is_err());
        let cli = Cli::try_parse_from(["docwatch", "identify", "a 1.1.1.1.pdf", "b.pdf"]).unwrap();
        assert!(matches!(cli.command, Command::Identify { filenames } if filenames.len() == 2));
    }
}
