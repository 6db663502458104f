//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Platewise - Estimate meal nutrition from a photo.
#[derive(Debug, Parser)]
#[command(name = "platewise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PLATEWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (name and calories only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a meal photo
    Analyze(AnalyzeArgs),

    /// Look up a packaged product by barcode
    Barcode(BarcodeArgs),

    /// Search the food database by name
    Search(SearchArgs),

    /// Match text against the brand catalog
    Brand(BrandArgs),

    /// Show configured vision API credentials (masked)
    Keys,

    /// Show or initialize the configuration file
    Config(ConfigArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Image file (JPEG, PNG, WebP or GIF)
    pub image: PathBuf,

    /// Use canned sample output instead of calling the vision API
    #[arg(long)]
    pub demo: bool,

    /// Skip cross-referencing against secondary sources
    #[arg(long)]
    pub no_verify: bool,

    /// Meal category hint (breakfast, lunch, dinner, snack)
    #[arg(short, long)]
    pub meal: Option<String>,

    /// Notes passed to the model ("large portion", "no dressing")
    #[arg(short, long)]
    pub notes: Option<String>,
}

/// Arguments for the barcode command.
#[derive(Debug, Parser)]
pub struct BarcodeArgs {
    /// EAN-8, UPC-A, EAN-13 or GTIN-14 code
    pub code: String,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Search query text
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value = "5")]
    pub limit: usize,
}

/// Arguments for the brand command.
#[derive(Debug, Parser)]
pub struct BrandArgs {
    /// Meal or product name, e.g. "McDonald's Big Mac"
    pub text: String,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_command() {
        let cli = Cli::parse_from(["platewise", "analyze", "lunch.jpg", "--demo", "--meal", "lunch"]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.image, PathBuf::from("lunch.jpg"));
                assert!(args.demo);
                assert!(!args.no_verify);
                assert_eq!(args.meal.as_deref(), Some("lunch"));
                assert!(args.notes.is_none());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_notes() {
        let cli = Cli::parse_from(["platewise", "analyze", "dinner.png", "-n", "extra rice, no sauce"]);
        match cli.command {
            Command::Analyze(args) => assert_eq!(args.notes.as_deref(), Some("extra rice, no sauce")),
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["platewise", "search", "greek yogurt", "--format", "json", "-vv"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Search(args) => assert_eq!(args.limit, 5),
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["platewise", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force: true }
            })
        ));
    }

    #[test]
    fn test_missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["platewise"]).is_err());
    }

    #[test]
    fn test_format_conversion() {
        let format: crate::config::OutputFormat = CliFormat::Quiet.into();
        assert!(matches!(format, crate::config::OutputFormat::Quiet));
    }
}
