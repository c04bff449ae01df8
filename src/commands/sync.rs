//! Reconciliation engine
//!
//! Records are processed strictly in order, one sync tool run at a time.
//! Per-path failures are logged and folded into the run statistics; only
//! configuration and identity errors abort the run.

use crate::config::EffectiveConfig;
use crate::executor::{ensure_parent, sync_path, RunStats, SyncInvocation};
use crate::identity::IdentityResolver;
use crate::paths::{absolute_parent, expand};
use crate::types::{SyncError, SyncRecord, SyncSettings};
use std::path::{Path, PathBuf};

/// Drives merge → expand → create → sync for every record
pub struct Reconciler<'a> {
    base_directory: PathBuf,
    defaults: SyncSettings,
    identities: &'a dyn IdentityResolver,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        base_directory: impl Into<PathBuf>,
        defaults: SyncSettings,
        identities: &'a dyn IdentityResolver,
    ) -> Self {
        Self {
            base_directory: base_directory.into(),
            defaults,
            identities,
            dry_run: false,
        }
    }

    /// Log what would happen instead of doing it
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconcile every record.
    ///
    /// Returns the run statistics once every record has been attempted;
    /// `RunStats::is_success` is the aggregate result. A record with a
    /// missing `path` or an unknown owner/group stops the run with an
    /// error before anything is synced for that record.
    pub fn run(&self, records: &[SyncRecord]) -> Result<RunStats, SyncError> {
        let mut stats = RunStats::default();

        for record in records {
            self.reconcile(record, &mut stats)?;
        }

        if stats.is_success() {
            tracing::info!("All synchronizations have been done");
        } else {
            tracing::error!(
                failed = stats.failed_steps,
                "Some synchronizations were not successful"
            );
        }
        Ok(stats)
    }

    fn reconcile(&self, record: &SyncRecord, stats: &mut RunStats) -> Result<(), SyncError> {
        stats.records += 1;
        let config = EffectiveConfig::resolve(&self.defaults, record, self.identities)?;

        let destinations = expand(&record.destination, false, &self.base_directory);
        let destination = destinations
            .first()
            .map(String::as_str)
            .unwrap_or(record.destination.as_str());

        if config.create {
            let ok = self.create_parent(destination, &config, stats);
            stats.record_step(ok);
        }

        let paths = expand(&config.path, true, &self.base_directory);
        if paths.len() > 1 {
            tracing::debug!(
                "Synchronizing expression {} -> {}",
                config.path,
                destination
            );
        }

        for path in &paths {
            let invocation = SyncInvocation {
                source: path,
                destination,
                dir_mode: config.dir_mode,
                file_mode: config.file_mode,
                owner: &config.owner,
                group: &config.group,
                tool: &config.tool,
                options: &config.options,
            };
            stats.invocations += 1;
            let ok = self.sync(&invocation);
            stats.record_step(ok);
        }

        Ok(())
    }

    fn create_parent(
        &self,
        destination: &str,
        config: &EffectiveConfig,
        stats: &mut RunStats,
    ) -> bool {
        let destination = Path::new(destination);
        if self.dry_run {
            let parent = absolute_parent(destination, &self.base_directory);
            if !parent.exists() {
                tracing::info!(
                    path = %parent.display(),
                    "Would create directory {}",
                    parent.display()
                );
                stats.directories_created += 1;
            }
            return true;
        }

        let existed = absolute_parent(destination, &self.base_directory).exists();
        let ok = ensure_parent(
            destination,
            &self.base_directory,
            config.dir_mode,
            config.uid,
            config.gid,
        );
        if ok && !existed {
            stats.directories_created += 1;
        }
        ok
    }

    fn sync(&self, invocation: &SyncInvocation<'_>) -> bool {
        if self.dry_run {
            let command_line = invocation.command_line(
                &invocation.resolved_source(&self.base_directory),
                &invocation.resolved_destination(),
            );
            tracing::info!("Would run: {}", command_line);
            return true;
        }
        sync_path(invocation, &self.base_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentities;
    use crate::types::{ExtendedSpec, Mode, SourceSpec};
    use std::fs;
    use tempfile::TempDir;

    fn ids() -> FixedIdentities {
        FixedIdentities::current_as("me", "us")
    }

    fn tool_logging_to(dir: &Path) -> (String, PathBuf) {
        let log = dir.join("calls.log");
        let script = dir.join("fake-rsync");
        fs::write(
            &script,
            format!(
                "echo \"$@\" >> '{}'\ncase \"$*\" in *fail*) exit 1;; esac\n",
                log.display()
            ),
        )
        .unwrap();
        (format!("sh '{}'", script.display()), log)
    }

    fn calls(log: &Path) -> Vec<String> {
        fs::read_to_string(log)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_empty_record_list_succeeds() {
        let ids = ids();
        let engine = Reconciler::new("/", SyncSettings::default(), &ids);
        let stats = engine.run(&[]).unwrap();
        assert!(stats.is_success());
        assert_eq!(stats, RunStats::default());
    }

    #[test]
    fn test_zero_glob_matches_is_silent_success() {
        let base = TempDir::new().expect("create base tempdir");
        let (tool, log) = tool_logging_to(base.path());
        let ids = ids();
        let defaults = SyncSettings {
            tool: Some(tool),
            ..SyncSettings::default()
        };

        let engine = Reconciler::new(base.path(), defaults, &ids);
        let stats = engine
            .run(&[SyncRecord::bare("/tmp/nowhere", "nothing-*")])
            .unwrap();

        assert!(stats.is_success());
        assert_eq!(stats.invocations, 0);
        assert!(calls(&log).is_empty());
    }

    #[test]
    fn test_failure_is_isolated_per_path() {
        let base = TempDir::new().expect("create base tempdir");
        for name in ["a-ok", "b-fail", "c-ok"] {
            fs::write(base.path().join(name), name).unwrap();
        }
        let (tool, log) = tool_logging_to(base.path());
        let ids = ids();
        let defaults = SyncSettings {
            tool: Some(tool),
            ..SyncSettings::default()
        };

        let engine = Reconciler::new(base.path(), defaults, &ids);
        let stats = engine
            .run(&[
                SyncRecord::bare("/tmp/dest-1", "?-*"),
                SyncRecord::bare("/tmp/dest-2", "a-ok"),
            ])
            .unwrap();

        assert!(!stats.is_success());
        assert_eq!(stats.invocations, 4);
        assert_eq!(stats.failed_steps, 1);
        assert_eq!(calls(&log).len(), 4);
    }

    #[test]
    fn test_missing_path_aborts_run() {
        let ids = ids();
        let engine = Reconciler::new("/", SyncSettings::default(), &ids);
        let records = [SyncRecord::new(
            "~/.x",
            SourceSpec::Extended(ExtendedSpec::default()),
        )];

        assert!(matches!(
            engine.run(&records),
            Err(SyncError::MissingField { field: "path", .. })
        ));
    }

    #[test]
    fn test_create_flag_creates_parent() {
        let base = TempDir::new().expect("create base tempdir");
        fs::write(base.path().join("app.conf"), "k=v").unwrap();
        let (tool, _log) = tool_logging_to(base.path());
        let ids = ids();
        let overrides = SyncSettings {
            create: Some(true),
            tool: Some(tool),
            dir_mode: Some(Mode::from_digits("750").unwrap()),
            ..SyncSettings::default()
        };
        let destination = base.path().join("etc").join("app.conf");
        let records = [SyncRecord::extended(
            destination.to_string_lossy(),
            "app.conf",
            overrides,
        )];

        let engine = Reconciler::new(base.path(), SyncSettings::default(), &ids);
        let stats = engine.run(&records).unwrap();

        assert!(stats.is_success());
        assert_eq!(stats.directories_created, 1);
        assert!(base.path().join("etc").is_dir());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let base = TempDir::new().expect("create base tempdir");
        fs::write(base.path().join("vimrc"), "").unwrap();
        let (tool, log) = tool_logging_to(base.path());
        let ids = ids();
        let defaults = SyncSettings {
            create: Some(true),
            tool: Some(tool),
            ..SyncSettings::default()
        };
        let destination = base.path().join("out").join("vimrc");

        let engine = Reconciler::new(base.path(), defaults, &ids).dry_run(true);
        let stats = engine
            .run(&[SyncRecord::bare(destination.to_string_lossy(), "vimrc")])
            .unwrap();

        assert!(stats.is_success());
        assert_eq!(stats.invocations, 1);
        assert_eq!(stats.directories_created, 1);
        assert!(!base.path().join("out").exists());
        assert!(calls(&log).is_empty());
    }
}
