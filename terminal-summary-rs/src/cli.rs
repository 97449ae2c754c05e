//! CLI argument parsing via `clap`.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "terminal-summary",
    version,
    about = "Summarize the last command of a terminal session",
    long_about = "Reads terminal output (oldest line first) from a file or stdin, asks a language model for a structured summary of the last command, and prints it as JSON.\n\nThe model backend is configured through TERMINAL_SUMMARY_* environment variables (a .env file is honoured).",
    after_help = "Examples:\n  cargo build 2>&1 | terminal-summary --cwd \"$PWD\"\n  terminal-summary --input session.log --shell /usr/bin/zsh --model gpt-4o-mini\n\nExit status: 0 when a summary was printed, 2 when none could be produced."
)]
/// Command line options of the terminal-summary binary.
pub struct Cli {
    #[arg(long, help = "File with the terminal contents (default: stdin)")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "Working directory of the terminal (default: current dir)")]
    pub cwd: Option<String>,

    #[arg(long, help = "Shell executable of the terminal (default: $SHELL)")]
    pub shell: Option<String>,

    #[arg(long, help = "Model name, overrides TERMINAL_SUMMARY_MODEL_NAME")]
    pub model: Option<String>,

    #[arg(long, help = "Base URL of an OpenAI-compatible API, overrides TERMINAL_SUMMARY_MODEL_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Number of most recent lines sent to the model (at most 50)")]
    pub max_lines: Option<usize>,

    #[arg(long, action = clap::ArgAction::SetTrue, help = "Print compact instead of pretty JSON")]
    pub compact: bool,
}

impl Cli {
    /// Shell from the flag, then `$SHELL`, then `/bin/sh`
    pub fn shell_or_default(&self) -> String {
        self.shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .unwrap_or_else(|| "/bin/sh".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["terminal-summary"]).unwrap();
        assert!(cli.input.is_none());
        assert!(cli.cwd.is_none());
        assert!(cli.max_lines.is_none());
        assert!(!cli.compact);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "terminal-summary",
            "--input",
            "build.log",
            "--cwd",
            "/home/user/project/bar",
            "--shell",
            "/usr/bin/zsh",
            "--model",
            "gpt-4o-mini",
            "--max-lines",
            "20",
            "--compact",
        ])
        .unwrap();

        assert_eq!(cli.input, Some(PathBuf::from("build.log")));
        assert_eq!(cli.cwd.as_deref(), Some("/home/user/project/bar"));
        assert_eq!(cli.shell_or_default(), "/usr/bin/zsh");
        assert_eq!(cli.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(cli.max_lines, Some(20));
        assert!(cli.compact);
    }

    #[test]
    fn test_rejects_non_numeric_line_count() {
        assert!(Cli::try_parse_from(["terminal-summary", "--max-lines", "many"]).is_err());
    }
}
