use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zipwalk")]
#[command(version)]
#[command(about = "List every file inside ZIP archives, including archives nested in archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipwalk ~/downloads                 list files in every *.zip below ~/downloads\n  \
  zipwalk . -x backup -x '*/tmp/*'    skip paths containing 'backup' or under a tmp folder\n  \
  zipwalk /data -c -r | grep '\\.cs$'  detect archives by content, print paths only")]
pub struct Cli {
    /// Folder to scan recursively
    #[arg(value_name = "FOLDER", default_value = ".")]
    pub folder: String,

    /// File name pattern of candidates (default: *.zip, or * with --content)
    #[arg(short = 'p', long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Skip candidate paths containing TEXT, or matching it when it has * or ?
    #[arg(short = 'x', long, value_name = "TEXT")]
    pub exclude: Vec<String>,

    /// Detect archives by their signature bytes instead of the .zip extension
    #[arg(short = 'c', long)]
    pub content: bool,

    /// Print only discovered paths and errors
    #[arg(short = 'r', long)]
    pub raw: bool,

    /// Process one archive at a time
    #[arg(short = 's', long)]
    pub single_thread: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["zipwalk"]).unwrap();
        assert_eq!(cli.folder, ".");
        assert!(cli.pattern.is_none());
        assert!(cli.exclude.is_empty());
        assert!(!cli.content && !cli.raw && !cli.single_thread);
    }

    #[test]
    fn repeated_excludes() {
        let cli = Cli::try_parse_from([
            "zipwalk", "/data", "-x", "a", "--exclude", "*.old.zip", "-x", "b", "-c", "-s",
        ])
        .unwrap();
        assert_eq!(cli.folder, "/data");
        assert_eq!(cli.exclude, vec!["a", "*.old.zip", "b"]);
        assert!(cli.content);
        assert!(cli.single_thread);
    }

    #[test]
    fn exclude_before_folder_takes_one_value() {
        let cli = Cli::try_parse_from(["zipwalk", "-x", "backup", "/data"]).unwrap();
        assert_eq!(cli.folder, "/data");
        assert_eq!(cli.exclude, vec!["backup"]);
    }

    #[test]
    fn exclude_needs_a_value_per_flag() {
        assert!(Cli::try_parse_from(["zipwalk", "/data", "-x", "a", "b"]).is_err());
    }

    #[test]
    fn help_is_not_a_failure() {
        let err = Cli::try_parse_from(["zipwalk", "--help"]).unwrap_err();
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        let err = Cli::try_parse_from(["zipwalk", "--bogus"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
