//! Fake sync tool shared by the integration tests.
//!
//! The fake records one line of arguments per call and fails (exit 23,
//! like rsync's partial transfer) whenever an argument contains `FAIL`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub struct FakeTool {
    /// Value to put in `rsync = ...`
    pub command: String,
    log: PathBuf,
}

impl FakeTool {
    pub fn install(dir: &Path) -> Self {
        let script = dir.join("fake-rsync.sh");
        let log = dir.join("fake-rsync.log");
        fs::write(
            &script,
            format!(
                "echo \"$@\" >> '{log}'\n\
                 case \"$*\" in *FAIL*) echo \"rsync: simulated failure\" >&2; exit 23;; esac\n\
                 exit 0\n",
                log = log.display()
            ),
        )
        .expect("write fake sync tool");

        // Invoked through `sh` so the script never needs the exec bit.
        Self {
            command: format!("sh '{}'", script.display()),
            log,
        }
    }

    /// Argument lines, one per invocation, in call order
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// The fixed arguments dotsync passes before any extra options
pub fn fixed_args(owner: &str, group: &str, dir_mode: &str, file_mode: &str) -> String {
    format!(
        "--update --recursive --group --owner --chown={owner}:{group} --chmod=D{dir_mode},F{file_mode}"
    )
}
