use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stockfeed")]
#[command(about = "Stockfeed - trade ingestion and live pricing pipeline")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ingestion and consumption pipelines
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "stockfeed.yaml", env = "STOCKFEED_CONFIG")]
        config: PathBuf,

        /// Do not start the built-in trade simulator
        #[arg(long)]
        no_simulator: bool,
    },

    /// Validate configuration without starting the pipelines
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "stockfeed.yaml", env = "STOCKFEED_CONFIG")]
        config: PathBuf,
    },

    /// Write a configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "stockfeed.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from(["stockfeed", "run", "--config", "feed.yaml", "--no-simulator"]).unwrap();
        match cli.command {
            Commands::Run { config, no_simulator } => {
                assert_eq!(config, PathBuf::from("feed.yaml"));
                assert!(no_simulator);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_init_default_output() {
        let cli = Cli::try_parse_from(["stockfeed", "init"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { output } if output == PathBuf::from("stockfeed.yaml")));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["stockfeed", "start"]).is_err());
    }
}
