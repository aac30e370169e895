//! Members an entity publishes by name.

use std::fmt;

use engine_bind::{AnyCommand, AnyProperty};
use serde::{Deserialize, Serialize};

/// Restricts a string property to files under a directory with an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    /// Root directory, using `/` separators.
    pub directory: String,
    /// Extension without the dot, e.g. `"bnk"`.
    pub extension: String,
}

impl FileFilter {
    #[must_use]
    pub fn new(directory: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    /// Returns `true` if `path` is under the directory and has the extension.
    ///
    /// Relative paths are taken as relative to the directory. Extension
    /// comparison ignores ASCII case.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path = path.replace('\\', "/");
        let has_extension = path
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(&self.extension));
        if !has_extension {
            return false;
        }
        let root = self.directory.trim_end_matches('/');
        let absolute = path.starts_with('/') || path.contains(':');
        !absolute || root.is_empty() || path.starts_with(&format!("{root}/"))
    }
}

/// Editor and save-game metadata attached to an exposed property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMeta {
    pub description: String,
    /// Shown as editable in the editor.
    pub editable: bool,
    /// Rejects writes by name.
    pub readonly: bool,
    /// Included in snapshots.
    pub serialize: bool,
    pub file_filter: Option<FileFilter>,
}

impl Default for PropertyMeta {
    fn default() -> Self {
        Self {
            description: String::new(),
            editable: true,
            readonly: false,
            serialize: true,
            file_filter: None,
        }
    }
}

impl PropertyMeta {
    /// Runtime state: visible, not writable by name, not saved.
    #[must_use]
    pub fn readonly() -> Self {
        Self {
            editable: false,
            readonly: true,
            serialize: false,
            ..Self::default()
        }
    }

    /// Writable but never saved.
    #[must_use]
    pub fn transient() -> Self {
        Self {
            serialize: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_file_filter(mut self, filter: FileFilter) -> Self {
        self.file_filter = Some(filter);
        self
    }
}

/// A property or command published under a name.
pub enum Exposed {
    Property {
        handle: Box<dyn AnyProperty>,
        meta: PropertyMeta,
    },
    Command(Box<dyn AnyCommand>),
}

impl Exposed {
    /// Identity of the underlying cell, used to detect re-exposure.
    #[must_use]
    pub fn cell_id(&self) -> usize {
        match self {
            Self::Property { handle, .. } => handle.cell_id(),
            Self::Command(handle) => handle.cell_id(),
        }
    }

    #[must_use]
    pub fn is_property(&self) -> bool {
        matches!(self, Self::Property { .. })
    }

    #[must_use]
    pub fn meta(&self) -> Option<&PropertyMeta> {
        match self {
            Self::Property { meta, .. } => Some(meta),
            Self::Command(_) => None,
        }
    }
}

impl Clone for Exposed {
    fn clone(&self) -> Self {
        match self {
            Self::Property { handle, meta } => Self::Property {
                handle: handle.boxed_clone(),
                meta: meta.clone(),
            },
            Self::Command(handle) => Self::Command(handle.boxed_clone()),
        }
    }
}

impl fmt::Debug for Exposed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property { handle, meta } => f
                .debug_struct("Property")
                .field("type", &handle.type_name())
                .field("meta", meta)
                .finish(),
            Self::Command(handle) => f.debug_tuple("Command").field(&handle.arg_type()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_filter_matches_extension_and_directory() {
        let filter = FileFilter::new("Content/Wwise", "bnk");
        assert!(filter.matches("Init.bnk"));
        assert!(filter.matches("Music/Ambience.BNK"));
        assert!(!filter.matches("Init.wem"));
        assert!(!filter.matches("noextension"));
        assert!(!filter.matches("/Content/Wwise/Init.bnk"));
        assert!(!FileFilter::new("/data", "bnk").matches("/elsewhere/Init.bnk"));
        assert!(FileFilter::new("/data", "bnk").matches("/data/Init.bnk"));
    }

    #[test]
    fn test_readonly_meta_is_not_serialized() {
        let meta = PropertyMeta::readonly();
        assert!(meta.readonly);
        assert!(!meta.serialize);
        assert!(PropertyMeta::default().serialize);
    }
}
