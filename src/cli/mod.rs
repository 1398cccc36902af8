// src/cli/mod.rs — CLI definition (clap derive)

pub mod progress;
pub mod run;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bookloop", about = "Iterative book improvement pipeline", version)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Quality threshold a book must reach (0.0-10.0)
    #[arg(short = 'q', long)]
    pub threshold: Option<f32>,

    /// Max iterations per upgrade run
    #[arg(short = 'i', long, allow_hyphen_values = true)]
    pub max_iterations: Option<i64>,

    /// Suppress progress output (only emit final report)
    #[arg(long)]
    pub quiet: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upgrade, measure and publish the whole catalog (default)
    Run,
    /// Upgrade and publish a single book
    Upgrade {
        /// Book title
        #[arg(long)]
        title: String,
        /// Book author
        #[arg(long)]
        author: String,
        /// Target reader age (makes this a children's book)
        #[arg(long, conflicts_with = "topic")]
        target_age: Option<u8>,
        /// Topic tag (makes this a topical book)
        #[arg(long)]
        topic: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["bookloop"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.threshold.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from(["bookloop", "-q", "8.5", "-i", "-2", "--json", "run"])
            .unwrap();
        assert_eq!(cli.threshold, Some(8.5));
        assert_eq!(cli.max_iterations, Some(-2));
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Run)));
    }

    #[test]
    fn test_parse_upgrade_children() {
        let cli = Cli::try_parse_from([
            "bookloop",
            "upgrade",
            "--title",
            "Moon",
            "--author",
            "A",
            "--target-age",
            "6",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Upgrade {
                title, target_age, ..
            }) => {
                assert_eq!(title, "Moon");
                assert_eq!(target_age, Some(6));
            }
            _ => panic!("expected upgrade"),
        }
    }

    #[test]
    fn test_upgrade_age_and_topic_conflict() {
        let res = Cli::try_parse_from([
            "bookloop",
            "upgrade",
            "--title",
            "T",
            "--author",
            "A",
            "--target-age",
            "6",
            "--topic",
            "ocean",
        ]);
        assert!(res.is_err());
    }
}
