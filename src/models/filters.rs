use serde::{Deserialize, Serialize};

use super::enums::FilterMode;

/// Immutable list query: which slice of the record set a view wants.
/// Passed explicitly into the pure filter; no component holds the current
/// mode as ambient state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub mode: FilterMode,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: FilterMode) -> Self {
        Self { mode, search: None }
    }

    pub fn with_search(mode: FilterMode, search: impl Into<String>) -> Self {
        Self {
            mode,
            search: Some(search.into()),
        }
    }
}
