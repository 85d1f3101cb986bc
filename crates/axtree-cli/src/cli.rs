use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "axtree-dump")]
#[command(about = "Dump normalized accessibility trees as JSON")]
#[command(
    long_about = "Rebuilds window trees from a recorded accessibility snapshot, with window-relative geometry, visibility clipping and identity hashes, and optionally renders a segmentation overlay."
)]
pub struct Cli {
    /// Enable debug logging on stderr (overrides RUST_LOG)
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract one or more windows and write their trees
    Dump(DumpArgs),
}

#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Recorded snapshot to read the native element graph from
    #[clap(long, short = 's')]
    pub snapshot: PathBuf,

    /// Window handle to extract; repeatable. Defaults to the snapshot roots
    #[clap(long = "root", short = 'r')]
    pub roots: Vec<String>,

    /// Write JSON here instead of stdout
    #[clap(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Wrap the tree in a timed envelope
    #[clap(long)]
    pub event: bool,

    /// Depth budget below each window
    #[clap(long)]
    pub max_depth: Option<usize>,

    /// Merge hit-tested content into each window
    #[clap(long)]
    pub hit_test: bool,

    /// JSON configuration file
    #[clap(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print an indented listing to stderr as well
    #[clap(long)]
    pub print: bool,

    /// Save a segmentation overlay of the main window to this PNG
    #[clap(long)]
    pub segment: Option<PathBuf>,

    /// Screenshot to draw the overlay on (blank canvas when omitted)
    #[clap(long, requires = "segment")]
    pub segment_base: Option<PathBuf>,

    /// Keep only the window with the most descendants
    #[clap(long)]
    pub main_window_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_arguments() {
        let cli = Cli::try_parse_from([
            "axtree-dump",
            "dump",
            "--snapshot",
            "desktop.json",
            "--root",
            "a",
            "--root",
            "b",
            "--max-depth",
            "3",
            "--event",
        ])
        .expect("Should parse dump arguments");

        let Commands::Dump(args) = cli.command;
        assert_eq!(args.snapshot, PathBuf::from("desktop.json"));
        assert_eq!(args.roots, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(args.max_depth, Some(3));
        assert!(args.event);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_segment_base_requires_segment() {
        let result = Cli::try_parse_from([
            "axtree-dump",
            "dump",
            "--snapshot",
            "desktop.json",
            "--segment-base",
            "shot.png",
        ]);
        assert!(result.is_err());
    }
}
