//! Directive dispatch
//!
//! A config file is a list of directives; each one is handed to the first
//! plugin that claims it.

use crate::commands::sync::Reconciler;
use crate::config::Context;
use crate::identity::IdentityResolver;
use crate::types::{SourceSpec, SyncError, SyncRecord, SyncSettings};

/// Directive handled by [`SyncPlugin`]
pub const SYNC_DIRECTIVE: &str = "sync";

/// Something that can execute one kind of directive
pub trait Plugin {
    fn can_handle(&self, directive: &str) -> bool;

    /// Execute `directive` with its config `data`; `Ok(false)` means the
    /// directive ran but not everything succeeded.
    fn handle(&self, directive: &str, data: &toml::Value) -> Result<bool, SyncError>;
}

/// Runs `sync` directives through the [`Reconciler`]
pub struct SyncPlugin<'a> {
    context: Context,
    identities: &'a dyn IdentityResolver,
}

impl<'a> SyncPlugin<'a> {
    pub fn new(context: Context, identities: &'a dyn IdentityResolver) -> Self {
        Self {
            context,
            identities,
        }
    }

    fn defaults(&self) -> Result<SyncSettings, SyncError> {
        match self.context.defaults_for(SYNC_DIRECTIVE) {
            Some(value) => value.clone().try_into().map_err(|err: toml::de::Error| {
                SyncError::Config(format!("defaults.{SYNC_DIRECTIVE}: {}", err.message()))
            }),
            None => Ok(SyncSettings::default()),
        }
    }
}

impl Plugin for SyncPlugin<'_> {
    fn can_handle(&self, directive: &str) -> bool {
        directive == SYNC_DIRECTIVE
    }

    fn handle(&self, directive: &str, data: &toml::Value) -> Result<bool, SyncError> {
        if !self.can_handle(directive) {
            return Err(SyncError::UnsupportedDirective(directive.to_string()));
        }

        let records = parse_records(data)?;
        let stats = Reconciler::new(
            self.context.base_directory(),
            self.defaults()?,
            self.identities,
        )
        .dry_run(self.context.dry_run())
        .run(&records)?;

        Ok(stats.is_success())
    }
}

/// Turn a `destination = source` table into records, keeping table order
pub fn parse_records(data: &toml::Value) -> Result<Vec<SyncRecord>, SyncError> {
    let table = data.as_table().ok_or_else(|| {
        SyncError::Config(format!(
            "`{SYNC_DIRECTIVE}` must be a table of destination = source, found {}",
            data.type_str()
        ))
    })?;

    table
        .iter()
        .map(|(destination, source)| {
            let source: SourceSpec = source.clone().try_into().map_err(|err: toml::de::Error| {
                SyncError::Config(format!("{destination}: {}", err.message()))
            })?;
            Ok(SyncRecord::new(destination.clone(), source))
        })
        .collect()
}

/// Routes directives to plugins
#[derive(Default)]
pub struct Dispatcher<'a> {
    plugins: Vec<Box<dyn Plugin + 'a>>,
}

impl<'a> Dispatcher<'a> {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'a) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Run `tasks` in order.
    ///
    /// Directives nobody handles, or that a plugin turns down, are logged
    /// and make the result `false`; later directives still run. Any other
    /// plugin error aborts the run.
    pub fn dispatch<'t>(
        &self,
        tasks: impl IntoIterator<Item = (&'t str, &'t toml::Value)>,
    ) -> Result<bool, SyncError> {
        let mut success = true;

        for (directive, data) in tasks {
            match self.plugins.iter().find(|p| p.can_handle(directive)) {
                Some(plugin) => match plugin.handle(directive, data) {
                    Ok(ok) => success &= ok,
                    Err(err) if !err.is_fatal() => {
                        tracing::error!(directive, "{}", err);
                        success = false;
                    }
                    Err(err) => return Err(err),
                },
                None => {
                    tracing::error!(directive, "Action {} not handled", directive);
                    success = false;
                }
            }
        }

        Ok(success)
    }
}
