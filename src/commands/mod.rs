//! Commands run by the binary

pub mod dispatch;
pub mod sync;

pub use dispatch::{parse_records, Dispatcher, Plugin, SyncPlugin, SYNC_DIRECTIVE};
pub use sync::Reconciler;

use crate::config::{Config, ConfigFile, Context};
use crate::identity::SystemIdentities;
use crate::types::SyncError;

/// Load the config file and run every selected directive.
///
/// Returns whether everything succeeded.
pub fn run(config: &Config) -> Result<bool, SyncError> {
    let file = ConfigFile::load(&config.config_file)?;
    let context = Context::new(&config.base_directory, file.defaults).with_dry_run(config.dry_run);

    let identities = SystemIdentities;
    let dispatcher = Dispatcher::new().with_plugin(SyncPlugin::new(context, &identities));

    let tasks = file
        .tasks
        .iter()
        .filter(|(directive, _)| {
            let wanted = config.wants(directive);
            if !wanted {
                tracing::debug!(directive = %directive, "Skipping directive");
            }
            wanted
        })
        .map(|(directive, data)| (directive.as_str(), data));

    dispatcher.dispatch(tasks)
}
