use std::path::PathBuf;

use clap::Parser;

/// Run a command, echo its output live and report how it finished.
#[derive(Parser, Debug)]
#[command(name = "cmdtee", version, about)]
pub struct Args {
    /// Full command line to run, tokenized with shell quoting rules
    #[arg(short = 'c', long = "command", conflicts_with = "argv")]
    pub command_line: Option<String>,

    /// Encoding of the child's stdout (e.g. shift_jis, euc-jp, utf-16le)
    #[arg(long, env = "CMDTEE_STDOUT_ENCODING")]
    pub stdout_encoding: Option<String>,

    /// Encoding of the child's stderr
    #[arg(long, env = "CMDTEE_STDERR_ENCODING")]
    pub stderr_encoding: Option<String>,

    /// Capture stdout without echoing it
    #[arg(long)]
    pub no_echo_stdout: bool,

    /// Capture stderr without echoing it
    #[arg(long)]
    pub no_echo_stderr: bool,

    /// Expand glob patterns in the command's arguments
    #[arg(long)]
    pub glob: bool,

    /// Print a JSON summary of the run to stdout when it finishes.
    /// Stdout is then captured into the summary instead of being echoed.
    #[arg(long, env = "CMDTEE_JSON")]
    pub json: bool,

    /// Working directory for the command
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Program and arguments to run
    #[arg(last = true, value_name = "COMMAND")]
    pub argv: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trailing_command() {
        let args = Args::try_parse_from(["cmdtee", "--glob", "--", "ls", "-l", "*.rs"]).unwrap();
        assert!(args.glob);
        assert_eq!(args.argv, vec!["ls", "-l", "*.rs"]);
        assert!(args.command_line.is_none());
    }

    #[test]
    fn test_parse_command_line() {
        let args = Args::try_parse_from([
            "cmdtee",
            "-c",
            "echo 'hi there'",
            "--stdout-encoding",
            "shift_jis",
            "--no-echo-stderr",
        ])
        .unwrap();
        assert_eq!(args.command_line.as_deref(), Some("echo 'hi there'"));
        assert_eq!(args.stdout_encoding.as_deref(), Some("shift_jis"));
        assert!(args.no_echo_stderr);
        assert!(!args.no_echo_stdout);
    }

    #[test]
    fn test_command_and_argv_conflict() {
        let result = Args::try_parse_from(["cmdtee", "-c", "ls", "--", "pwd"]);
        assert!(result.is_err());
    }
}
