use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Build per-torrent subtitle catalogs from tab-separated index exports.
#[derive(Parser, Debug)]
#[command(name = "subcat", author, version, about, long_about = None)]
pub struct Cli {
    /// Raise the log level (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (toml, yaml or json)
    #[arg(short, long, global = true, env = "SUBCAT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the catalog from the exports
    Build(BuildArgs),

    /// Print the episode classification of release filenames
    Classify {
        #[arg(required = true)]
        filenames: Vec<String>,
    },

    /// Print the resolved configuration
    Config,
}

/// Inputs may be plain, gzip (.gz) or xz (.xz) compressed.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Torrents export
    #[arg(long)]
    pub torrents: PathBuf,

    /// Files export
    #[arg(long)]
    pub files: PathBuf,

    /// Attachments export
    #[arg(long)]
    pub attachments: PathBuf,

    /// Attachment size side table
    #[arg(long)]
    pub sizes: Option<PathBuf>,

    /// Catalog output as JSON lines (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Language index output as JSON
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Worker threads, overriding the configuration
    #[arg(short, long)]
    pub workers: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from([
            "subcat",
            "-vv",
            "build",
            "--torrents",
            "t.tsv.xz",
            "--files",
            "f.tsv",
            "--attachments",
            "a.tsv.gz",
            "--output",
            "catalog.jsonl",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Build(args) = cli.command else { panic!("expected build") };
        assert_eq!(args.torrents, PathBuf::from("t.tsv.xz"));
        assert_eq!(args.sizes, None);
        assert_eq!(args.output, Some(PathBuf::from("catalog.jsonl")));
    }

    #[test]
    fn test_classify_requires_filenames() {
        assert!(Cli::try_parse_from(["subcat", "classify"]).is_err());
    }
}
