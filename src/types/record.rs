//! Sync records as they come out of the config file

use super::Mode;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Overridable per-record settings.
///
/// The same shape is used for the global `defaults.sync` table and for the
/// override part of an extended record. Every field is optional; the
/// merger fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncSettings {
    /// Create the destination's parent directory when missing
    pub create: Option<bool>,

    /// Sync tool executable
    #[serde(rename = "rsync", alias = "sync_tool")]
    pub tool: Option<String>,

    /// Extra options appended after the fixed ones
    pub options: Option<Vec<String>>,

    /// Mode for synchronized files
    #[serde(rename = "fmode", alias = "file_mode")]
    pub file_mode: Option<Mode>,

    /// Mode for synchronized and created directories
    #[serde(rename = "dmode", alias = "dir_mode")]
    pub dir_mode: Option<Mode>,

    /// Owner name
    pub owner: Option<String>,

    /// Group name
    pub group: Option<String>,
}

impl SyncSettings {
    /// Overlay `overrides` on top of `self`; set fields in `overrides` win.
    pub fn overlay(&self, overrides: &SyncSettings) -> SyncSettings {
        SyncSettings {
            create: overrides.create.or(self.create),
            tool: overrides.tool.clone().or_else(|| self.tool.clone()),
            options: overrides.options.clone().or_else(|| self.options.clone()),
            file_mode: overrides.file_mode.or(self.file_mode),
            dir_mode: overrides.dir_mode.or(self.dir_mode),
            owner: overrides.owner.clone().or_else(|| self.owner.clone()),
            group: overrides.group.clone().or_else(|| self.group.clone()),
        }
    }
}

/// Extended source specification: a path plus overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtendedSpec {
    /// Source path expression (required, checked when merging)
    pub path: Option<String>,

    #[serde(flatten)]
    pub settings: SyncSettings,
}

/// Right-hand side of a sync record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// `"~/.vimrc" = "vimrc"`
    Bare(String),

    /// `"~/.vimrc" = { path = "vimrc", fmode = 600 }`
    Extended(ExtendedSpec),
}

// Dispatches on the value's shape so errors inside a table (a bad mode, a
// mistyped field) reach the user as-is.
impl<'de> Deserialize<'de> for SourceSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SourceVisitor;

        impl<'de> Visitor<'de> for SourceVisitor {
            type Value = SourceSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a source path or a table with `path`")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<SourceSpec, E> {
                Ok(SourceSpec::Bare(value.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<SourceSpec, A::Error> {
                ExtendedSpec::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(SourceSpec::Extended)
            }
        }

        deserializer.deserialize_any(SourceVisitor)
    }
}

/// One destination → source entry to reconcile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    /// Destination path expression
    pub destination: String,

    pub source: SourceSpec,
}

impl SyncRecord {
    pub fn new(destination: impl Into<String>, source: SourceSpec) -> Self {
        Self {
            destination: destination.into(),
            source,
        }
    }

    /// Record with a bare source path and no overrides
    pub fn bare(destination: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(destination, SourceSpec::Bare(source.into()))
    }

    /// Record with an extended source specification
    pub fn extended(
        destination: impl Into<String>,
        path: impl Into<String>,
        settings: SyncSettings,
    ) -> Self {
        Self::new(
            destination,
            SourceSpec::Extended(ExtendedSpec {
                path: Some(path.into()),
                settings,
            }),
        )
    }
}
