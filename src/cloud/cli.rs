//! AWS CLI command execution.
//!
//! Provides utilities for running CLI commands and capturing their output.

use colored::Colorize;
use regex::Regex;
use std::error::Error;
use std::process::Command;
use std::sync::OnceLock;

/// Largest stdout accepted from one command.
const MAX_OUTPUT_BYTES: usize = 500_000;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Run a shell command and return its stdout.
///
/// The command string is split on spaces, with quoted substrings kept whole.
pub fn run(cmd: &str) -> Result<String, Box<dyn Error>> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let cmds: Vec<&str> = split_and_strip(cmd);
    log::trace!("split cmds={:?}", cmds);

    let (program, args) = cmds.split_first().ok_or("Empty command")?;
    let output = Command::new(program).args(args).output().map_err(|e| {
        log::error!("Command execution failed: {}", e);
        format!("Failed to execute {program}: {e}")
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(format!("ERROR running {program}: {stderr}").into());
    }

    log::debug!(
        "Success cmd: {cmd} stdout.len()={}",
        output.stdout.len()
    );
    if output.stdout.len() > MAX_OUTPUT_BYTES {
        return Err(format!(
            "Response too large: {} bytes for command: {:?}",
            output.stdout.len(),
            cmds
        )
        .into());
    }

    let stdout = String::from_utf8(output.stdout).map_err(|e| format!("Invalid UTF-8: {}", e))?;
    Ok(stdout)
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_aws_command() {
        let input = "aws ec2 describe-availability-zones --region us-west-2 --output json";
        assert_eq!(
            split_and_strip(input),
            vec![
                "aws",
                "ec2",
                "describe-availability-zones",
                "--region",
                "us-west-2",
                "--output",
                "json"
            ]
        );
    }

    #[test]
    fn test_split_keeps_quoted_filter() {
        let input = "aws ec2 describe-availability-zones --filters 'Name=zone-type,Values=availability-zone'";
        let cmds = split_and_strip(input);
        assert_eq!(cmds.len(), 5);
        assert_eq!(cmds[4], "Name=zone-type,Values=availability-zone");
    }

    #[test]
    fn test_split_double_quotes() {
        let input = r#"echo "two words" done"#;
        assert_eq!(split_and_strip(input), vec!["echo", "two words", "done"]);
    }

    #[test]
    fn test_run_empty_command() {
        assert!(run("   ").is_err());
    }
}
