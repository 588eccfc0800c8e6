mod args;

use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use cmdtee_sdk::util::{encoding_for_label, expand_globs};
use cmdtee_sdk::{Cmd, CmdOptions, GENERIC_FAILURE_EXIT_CODE};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they never mix with the echoed stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cmdtee=info,cmdtee_sdk=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<cmdtee_sdk::Error>()
                .and_then(cmdtee_sdk::Error::exit_code)
                .unwrap_or(GENERIC_FAILURE_EXIT_CODE);
            exit_code(code)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<i32> {
    let options = build_options(&args)?;
    let cmd = build_cmd(&args, options)?;

    info!(command = %cmd.command_line(), "Running command");
    let output = cmd.run().await?;

    if args.json {
        let summary = serde_json::to_string_pretty(&output).context("Failed to encode summary")?;
        println!("{}", summary);
    }

    Ok(output.exit_code())
}

fn build_options(args: &Args) -> anyhow::Result<CmdOptions> {
    // The JSON summary owns stdout; echoed lines would corrupt it
    let mut options = CmdOptions::new()
        .with_echo_stdout(!args.no_echo_stdout && !args.json)
        .with_echo_stderr(!args.no_echo_stderr)
        .with_kill_on_drop(true);

    if let Some(ref label) = args.stdout_encoding {
        options = options.with_stdout_encoding(encoding_for_label(label)?);
    }
    if let Some(ref label) = args.stderr_encoding {
        options = options.with_stderr_encoding(encoding_for_label(label)?);
    }
    if let Some(ref cwd) = args.cwd {
        options = options.with_cwd(cwd);
    }

    Ok(options)
}

fn build_cmd(args: &Args, options: CmdOptions) -> anyhow::Result<Cmd> {
    if let Some(ref line) = args.command_line {
        return Ok(Cmd::from_command_line(line, options)?);
    }

    let Some((program, rest)) = args.argv.split_first() else {
        bail!("No command given. Use `cmdtee -- <PROGRAM> [ARGS...]` or `cmdtee -c <COMMAND LINE>`");
    };

    let rest = if args.glob {
        expand_args(rest).context("Failed to expand glob arguments")?
    } else {
        rest.to_vec()
    };

    Ok(Cmd::new(program.as_str(), rest, options))
}

/// Expand arguments that look like globs; other arguments pass through.
/// A glob matching nothing is kept literally, as a shell would.
fn expand_args(args: &[String]) -> anyhow::Result<Vec<String>> {
    let mut expanded = Vec::with_capacity(args.len());
    for arg in args {
        if !arg.contains(['*', '?', '[']) {
            expanded.push(arg.clone());
            continue;
        }

        let paths = expand_globs(std::slice::from_ref(arg))?;
        if paths.is_empty() {
            expanded.push(arg.clone());
        } else {
            expanded.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        }
    }
    Ok(expanded)
}

fn exit_code(code: i32) -> ExitCode {
    // Codes outside 0..=255 cannot be reported by the OS; fall back to failure
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cmd_requires_a_command() {
        let args = Args::try_parse_from(["cmdtee"]).unwrap();
        let options = build_options(&args).unwrap();
        assert!(build_cmd(&args, options).is_err());
    }

    #[test]
    fn test_json_summary_suppresses_stdout_echo() {
        let args = Args::try_parse_from(["cmdtee", "--json", "--", "ls"]).unwrap();
        let options = build_options(&args).unwrap();
        assert!(!options.echo_stdout);
        assert!(options.echo_stderr);

        let args = Args::try_parse_from(["cmdtee", "--", "ls"]).unwrap();
        assert!(build_options(&args).unwrap().echo_stdout);
    }

    #[test]
    fn test_build_options_rejects_unknown_encoding() {
        let args = Args::try_parse_from(["cmdtee", "--stderr-encoding", "klingon", "--", "ls"]).unwrap();
        let err = build_options(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<cmdtee_sdk::Error>(),
            Some(cmdtee_sdk::Error::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_expand_args_keeps_plain_and_unmatched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        let pattern = format!("{}/*.txt", dir.path().display());
        let unmatched = format!("{}/*.none", dir.path().display());

        let expanded = expand_args(&["-l".to_string(), pattern, unmatched.clone()]).unwrap();
        assert_eq!(expanded[0], "-l");
        assert!(expanded[1].ends_with("a.txt"));
        assert_eq!(expanded[2], unmatched);
        assert_eq!(expanded.len(), 3);
    }
}
