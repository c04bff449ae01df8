//! External sync tool invocation
//!
//! dotsync never copies bytes itself: each resolved (source, destination)
//! pair becomes one run of the configured tool, by default `rsync`.

use crate::paths::expand_home;
use crate::types::{Mode, SyncError};
use std::path::{Path, MAIN_SEPARATOR};
use std::process::{Command, Output};

/// Everything needed to sync one source path to one destination
#[derive(Debug, Clone)]
pub struct SyncInvocation<'a> {
    pub source: &'a str,
    pub destination: &'a str,
    pub dir_mode: Mode,
    pub file_mode: Mode,
    pub owner: &'a str,
    pub group: &'a str,
    pub tool: &'a str,
    pub options: &'a [String],
}

impl SyncInvocation<'_> {
    /// Source joined onto `base`, with a trailing separator for directories
    /// so the tool copies the directory's contents rather than the
    /// directory itself.
    pub fn resolved_source(&self, base: &Path) -> String {
        let source = base.join(self.source);
        let mut source = source.to_string_lossy().into_owned();
        if Path::new(&source).is_dir() && !source.ends_with(MAIN_SEPARATOR) {
            source.push(MAIN_SEPARATOR);
        }
        source
    }

    /// Destination after `~` expansion
    pub fn resolved_destination(&self) -> String {
        expand_home(self.destination).into_owned()
    }

    /// Shell command line for this invocation, sources already resolved.
    ///
    /// # Example
    /// ```
    /// use dotsync::executor::SyncInvocation;
    /// use dotsync::types::Mode;
    ///
    /// let options = vec!["--delete".to_string()];
    /// let invocation = SyncInvocation {
    ///     source: "vimrc",
    ///     destination: "/home/me/.vimrc",
    ///     dir_mode: Mode::DIR,
    ///     file_mode: Mode::FILE,
    ///     owner: "me",
    ///     group: "me",
    ///     tool: "rsync",
    ///     options: &options,
    /// };
    /// assert_eq!(
    ///     invocation.command_line("/dots/vimrc", "/home/me/.vimrc"),
    ///     "rsync --update --recursive --group --owner --chown=me:me --chmod=D755,F644 \
    ///      --delete \"/dots/vimrc\" \"/home/me/.vimrc\""
    /// );
    /// ```
    pub fn command_line(&self, source: &str, destination: &str) -> String {
        let mut parts = vec![
            self.tool.to_string(),
            "--update".to_string(),
            "--recursive".to_string(),
            "--group".to_string(),
            "--owner".to_string(),
            format!("--chown={}:{}", self.owner, self.group),
            format!("--chmod=D{},F{}", self.dir_mode, self.file_mode),
        ];
        parts.extend(self.options.iter().cloned());
        parts.push(quote(source));
        parts.push(quote(destination));
        parts.join(" ")
    }
}

/// Run one sync invocation with `base` as working directory.
///
/// Returns `true` on a zero exit status. Non-zero exits and spawn failures
/// are logged as warnings (with the tool's captured output) and reported
/// as `false`.
pub fn sync_path(invocation: &SyncInvocation<'_>, base: &Path) -> bool {
    let source = invocation.resolved_source(base);
    let destination = invocation.resolved_destination();
    let command_line = invocation.command_line(&source, &destination);
    tracing::trace!(command = %command_line, "Running sync tool");

    match run_shell(&command_line, base) {
        Ok(output) if output.status.success() => {
            tracing::debug!(
                %source,
                %destination,
                "Synchronized {} -> {}",
                source,
                destination
            );
            true
        }
        Ok(output) => {
            tracing::warn!(
                %source,
                %destination,
                "Failed to sync {} -> {}. {} exited with {}: {}",
                source,
                destination,
                invocation.tool,
                output.status,
                captured_output(&output)
            );
            false
        }
        Err(err) => {
            tracing::warn!(
                %source,
                %destination,
                "Failed to sync {} -> {}. {}",
                source,
                destination,
                err
            );
            false
        }
    }
}

/// Build a shell [`Command`] that executes `command_line` via `sh -c`.
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

fn run_shell(command_line: &str, cwd: &Path) -> Result<Output, SyncError> {
    Ok(shell_command(command_line).current_dir(cwd).output()?)
}

fn captured_output(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    match (stderr.trim(), stdout.trim()) {
        ("", "") => "(no output)".to_string(),
        (err, "") => err.to_string(),
        ("", out) => out.to_string(),
        (err, out) => format!("{err}\n{out}"),
    }
}

/// Double-quote `arg` for `sh`, escaping the characters that stay special
/// inside double quotes.
fn quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn invocation<'a>(
        source: &'a str,
        destination: &'a str,
        tool: &'a str,
        options: &'a [String],
    ) -> SyncInvocation<'a> {
        SyncInvocation {
            source,
            destination,
            dir_mode: Mode::DIR,
            file_mode: Mode::FILE,
            owner: "me",
            group: "us",
            tool,
            options,
        }
    }

    // Run through `sh` so the script never has to be exec'd directly.
    fn write_tool(dir: &Path, body: &str) -> String {
        let path = dir.join("fake-tool");
        fs::write(&path, format!("{body}\n")).unwrap();
        format!("sh '{}'", path.display())
    }

    #[test]
    fn test_command_line_layout() {
        let options = vec!["--delete".to_string(), "--safe-links".to_string()];
        let inv = SyncInvocation {
            dir_mode: Mode::from_digits("700").unwrap(),
            file_mode: Mode::from_digits("600").unwrap(),
            ..invocation("a", "b", "rsync", &options)
        };

        assert_eq!(
            inv.command_line("/base/a", "/home/me/b"),
            "rsync --update --recursive --group --owner --chown=me:us --chmod=D700,F600 \
             --delete --safe-links \"/base/a\" \"/home/me/b\""
        );
    }

    #[test]
    fn test_quote_escapes_shell_specials() {
        assert_eq!(quote("plain path"), "\"plain path\"");
        assert_eq!(quote("a\"b$c`d\\e"), "\"a\\\"b\\$c\\`d\\\\e\"");
    }

    #[test]
    fn test_directory_source_gets_trailing_separator() {
        let base = TempDir::new().expect("create base tempdir");
        fs::create_dir(base.path().join("nvim")).unwrap();
        fs::write(base.path().join("vimrc"), "").unwrap();

        let dir = invocation("nvim", "~/.config/nvim", "rsync", &[]);
        assert!(dir.resolved_source(base.path()).ends_with("nvim/"));

        let file = invocation("vimrc", "~/.vimrc", "rsync", &[]);
        assert!(file.resolved_source(base.path()).ends_with("vimrc"));
    }

    #[test]
    fn test_absolute_source_ignores_base() {
        let inv = invocation("/etc/hosts", "/tmp/x", "rsync", &[]);
        assert_eq!(inv.resolved_source(Path::new("/base")), "/etc/hosts");
    }

    #[test]
    fn test_destination_home_expansion() {
        let home = dirs::home_dir().expect("home directory");
        let inv = invocation("a", "~/.vimrc", "rsync", &[]);
        assert_eq!(
            PathBuf::from(inv.resolved_destination()),
            home.join(".vimrc")
        );
    }

    #[test]
    fn test_sync_path_success_runs_in_base() {
        let base = TempDir::new().expect("create base tempdir");
        let log = base.path().join("calls.log");
        let tool = write_tool(
            base.path(),
            &format!("pwd > '{}'\necho \"$@\" >> '{}'", log.display(), log.display()),
        );
        fs::write(base.path().join("vimrc"), "set nu").unwrap();

        let options = vec!["--delete".to_string()];
        let inv = invocation("vimrc", "/tmp/dotsync-out", &tool, &options);
        assert!(sync_path(&inv, base.path()));

        let calls = fs::read_to_string(&log).unwrap();
        let mut lines = calls.lines();
        assert_eq!(
            fs::canonicalize(lines.next().unwrap()).unwrap(),
            fs::canonicalize(base.path()).unwrap()
        );
        assert_eq!(
            lines.next().unwrap(),
            format!(
                "--update --recursive --group --owner --chown=me:us --chmod=D755,F644 \
                 --delete {} /tmp/dotsync-out",
                base.path().join("vimrc").display()
            )
        );
    }

    #[test]
    fn test_sync_path_nonzero_exit_is_failure() {
        let base = TempDir::new().expect("create base tempdir");
        let tool = write_tool(base.path(), "echo 'rsync error: some files' >&2\nexit 23");

        assert!(!sync_path(&invocation("x", "/tmp/y", &tool, &[]), base.path()));
    }

    #[test]
    fn test_sync_path_missing_tool_is_failure() {
        let base = TempDir::new().expect("create base tempdir");
        let tool = base.path().join("not-installed").to_string_lossy().into_owned();

        assert!(!sync_path(&invocation("x", "/tmp/y", &tool, &[]), base.path()));
    }

    #[test]
    fn test_sync_path_missing_base_is_failure() {
        let inv = invocation("x", "/tmp/y", "true", &[]);
        assert!(!sync_path(&inv, Path::new("/nonexistent/dotsync/base")));
    }

    #[test]
    fn test_captured_output_prefers_both_streams() {
        let base = TempDir::new().expect("create base tempdir");
        let output = run_shell("echo out; echo err >&2; exit 1", base.path()).unwrap();
        assert_eq!(captured_output(&output), "err\nout");

        let silent = run_shell("exit 2", base.path()).unwrap();
        assert_eq!(captured_output(&silent), "(no output)");
    }
}
