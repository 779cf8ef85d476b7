//! Terminal UI — spinners, progress bars, and captured command output.
//!
//! # Design goals
//!
//! - **Clean by default.** While a stage is running the user sees only a spinner (or a determinate
//!   progress bar during downloads) and a short label.  Raw subprocess output is captured and
//!   hidden.
//! - **Informative on failure.** If a stage fails, its captured stdout *and* stderr are printed in
//!   full so the operator can diagnose the problem without re-running manually.
//! - **Secrets stay out of the command line.** Captured execution accepts extra environment
//!   variables for the child process, which is how `PGPASSWORD` reaches `pg_dump`.

use std::{
    process::{Command, Output, Stdio},
    time::Duration,
};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames — same style as indicatif's default.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Green ✓  — printed when a stage succeeds.
fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
/// Red ✗    — printed when a stage fails.
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
/// Cyan ✓   — printed next to the final success summary.
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Stage result ─────────────────────────────────────────────────────────────

/// The outcome of a single pipeline stage (one bucket, or the database dump).
///
/// Carries the stage label plus whatever the command wrote to stdout/stderr so
/// it can be replayed to the terminal when something goes wrong.
#[derive(Debug)]
pub struct StageOutcome {
    /// Human-readable stage label, e.g. `"Bucket 'photos'"`.
    pub label: String,
    /// Whether the stage completed without error.
    pub success: bool,
    /// Everything the command wrote to stdout.
    pub stdout: String,
    /// Everything the command wrote to stderr (or, for bucket stages, the
    /// per-object failure report).
    pub stderr: String,
    /// The error message, if any.
    pub error: Option<String>,
}

impl StageOutcome {
    /// A synthetic success outcome with no captured output.
    pub fn ok(label: &str) -> Self {
        Self {
            label: label.to_string(),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
        }
    }

    /// A synthetic failure outcome carrying `error` and optional detail
    /// lines for replay.
    pub fn failed_with(label: &str, error: String, detail: String) -> Self {
        Self {
            label: label.to_string(),
            success: false,
            stdout: String::new(),
            stderr: detail,
            error: Some(error),
        }
    }

    /// Print the one-line summary (✓/✗ + label) to stdout.
    ///
    /// On failure, also prints the captured stdout/stderr and the error
    /// message so the operator has everything they need without re-running.
    pub fn print(&self) {
        if self.success {
            println!("  {}  {}", icon_ok(), style(&self.label).bold());
        } else {
            println!("  {}  {}", icon_err(), style(&self.label).bold());

            // Print the error message first (most useful thing).
            if let Some(ref msg) = self.error {
                eprintln!();
                eprintln!("  {} {}", style("Error:").red().bold(), msg);
            }

            // Replay captured output so the operator can see what happened.
            if !self.stdout.is_empty() {
                eprintln!();
                eprintln!("  {} stdout:", style("►").dim());
                for line in self.stdout.lines() {
                    eprintln!("    {line}");
                }
            }
            if !self.stderr.is_empty() {
                eprintln!();
                eprintln!("  {} stderr:", style("►").dim());
                for line in self.stderr.lines() {
                    eprintln!("    {line}");
                }
            }
        }
    }

    /// Returns `true` if the stage did not succeed.
    pub const fn failed(&self) -> bool {
        !self.success
    }
}

// ─── Spinner & progress bar ───────────────────────────────────────────────────

/// Create and start an indeterminate spinner for `label`.
///
/// The spinner ticks at ~80 ms and is automatically cleared when
/// [`ProgressBar::finish_and_clear`] is called.
pub fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
            .unwrap()
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Determinate bar for the download phase: one tick per attempted object.
///
/// The total is known up front from the bucket listing, so the bar shows a
/// real fraction rather than a spinner.
pub fn download_progress(total: u64, bucket: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("  {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message(format!("Downloading from {bucket}"));
    pb
}

// ─── Captured execution ───────────────────────────────────────────────────────

/// Run a command, capturing both stdout and stderr.
///
/// `envs` is appended to the child's environment — this is how secrets like
/// `PGPASSWORD` are passed without ever appearing in the argument list.  All
/// output is buffered so the spinner can own the terminal while the command
/// runs.
///
/// Returns `(success, stdout_text, stderr_text)`.
pub fn run_captured(args: &[String], envs: &[(&str, String)]) -> Result<(bool, String, String)> {
    let (prog, rest) = args.split_first().context("cannot run an empty command")?;

    let output: Output = Command::new(prog)
        .args(rest)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to spawn: {}", args.join(" ")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    Ok((output.status.success(), stdout, stderr))
}

// ─── High-level stage runner ──────────────────────────────────────────────────

/// Run a subprocess stage behind a spinner, returning a [`StageOutcome`].
///
/// The spinner is cleared before the outcome line is printed, so the terminal
/// always shows a clean, static summary when the stage finishes.
pub fn run_stage(label: &str, args: &[String], envs: &[(&str, String)]) -> StageOutcome {
    let spinner = make_spinner(label);

    let result = run_captured(args, envs);
    spinner.finish_and_clear();

    match result {
        Ok((true, stdout, stderr)) => StageOutcome {
            label: label.to_string(),
            success: true,
            stdout,
            stderr,
            error: None,
        },
        Ok((false, stdout, stderr)) => StageOutcome {
            label: label.to_string(),
            success: false,
            stdout,
            stderr,
            error: Some(format!("command exited non-zero: {}", args.join(" "))),
        },
        Err(e) => StageOutcome {
            label: label.to_string(),
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(e.to_string()),
        },
    }
}

// ─── Summary banner ───────────────────────────────────────────────────────────

/// Print the final summary after all stages have run.
///
/// Shows a success banner when all stages passed, or a failure banner listing
/// the stages that failed.
pub fn print_summary(outcomes: &[StageOutcome]) {
    let failed: Vec<&StageOutcome> = outcomes.iter().filter(|o| o.failed()).collect();
    println!();
    if failed.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style("All stages completed successfully.").cyan().bold()
        );
    } else {
        eprintln!("  {}  {}", icon_err(), style("Backup failed.").red().bold());
        for o in &failed {
            eprintln!("    {} {}", icon_err(), style(&o.label).red());
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(label: &str, err: &str, stdout: &str, stderr: &str) -> StageOutcome {
        StageOutcome {
            label: label.into(),
            success: false,
            stdout: stdout.into(),
            stderr: stderr.into(),
            error: Some(err.into()),
        }
    }

    // ── StageOutcome ─────────────────────────────────────────────────────────

    #[test]
    fn success_outcome_is_not_failed() {
        assert!(!StageOutcome::ok("Dump database").failed());
    }

    #[test]
    fn failure_outcome_is_failed() {
        assert!(failure("Dump database", "oh no", "", "").failed());
    }

    #[test]
    fn failed_with_carries_detail_in_stderr() {
        let o = StageOutcome::failed_with("Bucket 'x'", "boom".into(), "key: reason".into());
        assert!(o.failed());
        assert_eq!(o.stderr, "key: reason");
        assert_eq!(o.error.as_deref(), Some("boom"));
    }

    // ── run_captured ─────────────────────────────────────────────────────────

    #[test]
    fn run_captured_true_succeeds() {
        let (ok, _out, _err) = run_captured(&["true".into()], &[]).unwrap();
        assert!(ok);
    }

    #[test]
    fn run_captured_false_fails() {
        let (ok, _out, _err) = run_captured(&["false".into()], &[]).unwrap();
        assert!(!ok);
    }

    #[test]
    fn run_captured_captures_stdout() {
        let (ok, out, _err) =
            run_captured(&["sh".into(), "-c".into(), "echo hello".into()], &[]).unwrap();
        assert!(ok);
        assert!(out.contains("hello"));
    }

    #[test]
    fn run_captured_passes_extra_envs_to_the_child() {
        let (ok, out, _err) = run_captured(
            &["sh".into(), "-c".into(), "echo $PGPASSWORD".into()],
            &[("PGPASSWORD", "sekrit".into())],
        )
        .unwrap();
        assert!(ok);
        assert!(out.contains("sekrit"));
    }

    #[test]
    fn run_captured_captures_non_zero_output() {
        let (ok, out, _err) = run_captured(
            &["sh".into(), "-c".into(), "echo failing; exit 1".into()],
            &[],
        )
        .unwrap();
        assert!(!ok);
        assert!(out.contains("failing"));
    }

    #[test]
    fn run_captured_empty_args_errors() {
        let result = run_captured(&[], &[]);
        assert!(result.is_err());
    }

    // ── run_stage ─────────────────────────────────────────────────────────────

    #[test]
    fn run_stage_success_sets_success_true() {
        let o = run_stage("Test", &["true".into()], &[]);
        assert!(o.success);
        assert_eq!(o.label, "Test");
        assert!(o.error.is_none());
    }

    #[test]
    fn run_stage_failure_sets_success_false() {
        let o = run_stage("Test", &["false".into()], &[]);
        assert!(!o.success);
        assert!(o.error.is_some());
    }

    #[test]
    fn run_stage_captures_stdout_on_failure() {
        let o = run_stage(
            "Test",
            &["sh".into(), "-c".into(), "echo bad output; exit 1".into()],
            &[],
        );
        assert!(!o.success);
        assert!(o.stdout.contains("bad output"));
    }

    // ── download_progress ─────────────────────────────────────────────────────

    #[test]
    fn download_progress_knows_its_total() {
        let pb = download_progress(42, "photos");
        assert_eq!(pb.length(), Some(42));
        assert_eq!(pb.position(), 0);
    }

    // ── print_summary ─────────────────────────────────────────────────────────

    #[test]
    fn summary_with_all_successes_does_not_list_failures() {
        // Smoke test: just ensure it doesn't panic with all-success inputs.
        let outcomes = vec![StageOutcome::ok("Bucket 'a'"), StageOutcome::ok("Bucket 'b'")];
        print_summary(&outcomes);
    }

    #[test]
    fn summary_with_failure_includes_failed_stages() {
        let outcomes = vec![
            StageOutcome::ok("Bucket 'a'"),
            failure("Bucket 'b'", "listing failed", "", "error detail"),
            StageOutcome::ok("Dump database"),
        ];
        print_summary(&outcomes);
    }
}
