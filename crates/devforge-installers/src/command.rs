//! External command execution helpers
//!
//! Every external action devforge takes goes through these: captured
//! runs for short commands, streamed runs with a bounded wait for the
//! long-lived ones (package installs, project scaffolding).

use anyhow::{anyhow, Context, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::process::Command;
use tracing::debug;

/// Captured output of a completed command
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Check whether a command is resolvable on PATH
pub fn command_exists(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Run a command to completion, capturing output.
/// Non-zero exit becomes an error carrying a stderr excerpt.
pub async fn run_command(program: &str, args: &[&str]) -> Result<CommandOutput> {
    debug!("Running: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to run {}", program))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(anyhow!(
            "{} {} failed (exit code: {:?}): {}",
            program,
            args.join(" "),
            output.status.code(),
            excerpt(&stderr)
        ));
    }

    Ok(CommandOutput { stdout, stderr })
}

/// Run a long-lived command, streaming stdout lines into the trace log,
/// failing if it does not finish within `timeout`.
pub async fn run_streamed(
    program: &str,
    args: &[&str],
    current_dir: Option<&camino::Utf8Path>,
    timeout: Duration,
) -> Result<()> {
    debug!("Running (streamed): {} {}", program, args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = current_dir {
        cmd.current_dir(dir);
    }
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;

    if let Some(stdout) = child.stdout.take() {
        let reader = tokio::io::BufReader::new(stdout);
        let mut lines = reader.lines();
        let name = program.to_string();

        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("{}: {}", name, line);
            }
        });
    }

    let result = tokio::time::timeout(timeout, child.wait()).await;

    match result {
        Ok(Ok(status)) => {
            if status.success() {
                Ok(())
            } else {
                Err(anyhow!("{} failed with exit code: {}", program, status))
            }
        }
        Ok(Err(e)) => Err(anyhow!("Failed to wait for {}: {}", program, e)),
        Err(_) => Err(anyhow!("{} timed out after {:?}", program, timeout)),
    }
}

/// First version-looking token of a tool's `--version` output
pub async fn probe_version(program: &str, version_flag: &str) -> Option<String> {
    use regex::Regex;
    use std::sync::LazyLock;

    static VERSION_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"v?(\d+\.\d+(?:\.\d+)?)").expect("version regex is valid"));

    let output = Command::new(program)
        .arg(version_flag)
        .output()
        .await
        .ok()?;

    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };

    VERSION_RE
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Bound error messages to something a log line can carry
fn excerpt(s: &str) -> String {
    const MAX: usize = 300;
    let trimmed = s.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }

    // Localized tool output is not ASCII; byte MAX may land inside a
    // UTF-8 sequence, so back up to the nearest char boundary
    let end = (0..=MAX)
        .rev()
        .find(|i| trimmed.is_char_boundary(*i))
        .unwrap_or(0);
    format!("{}...", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists_for_shell_builtins() {
        // `sh` is present everywhere these tests run
        #[cfg(unix)]
        assert!(command_exists("sh"));
        assert!(!command_exists("devforge-no-such-tool-12345"));
    }

    #[tokio::test]
    async fn test_run_command_captures_stdout() {
        #[cfg(unix)]
        {
            let out = run_command("sh", &["-c", "echo hello"]).await.unwrap();
            assert_eq!(out.stdout.trim(), "hello");
        }
    }

    #[tokio::test]
    async fn test_run_command_surfaces_failure() {
        #[cfg(unix)]
        {
            let err = run_command("sh", &["-c", "echo boom >&2; exit 3"])
                .await
                .unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("exit code"));
            assert!(msg.contains("boom"));
        }
    }

    #[tokio::test]
    async fn test_run_streamed_times_out() {
        #[cfg(unix)]
        {
            let err = run_streamed("sh", &["-c", "sleep 5"], None, Duration::from_millis(100))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("timed out"));
        }
    }

    #[test]
    fn test_excerpt_bounds_long_output() {
        let long = "x".repeat(1000);
        let cut = excerpt(&long);
        assert!(cut.len() <= 303);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_excerpt_cuts_on_char_boundary() {
        // One ASCII byte followed by 3-byte chars puts byte 300 inside
        // a UTF-8 sequence
        let long = format!("x{}", "語".repeat(200));
        assert!(!long.is_char_boundary(300));

        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 303);
        assert!(cut.trim_end_matches("...").chars().all(|c| c == 'x' || c == '語'));
    }
}
