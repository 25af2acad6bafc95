//! Test devices with their own paginated datasets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A VALD device whose tests are extracted through the paginated endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    NordBord,
    ForceFrame,
    ForceDecks,
}

impl Device {
    /// Extraction order used by the orchestrator.
    pub const ALL: [Self; 3] = [Self::NordBord, Self::ForceFrame, Self::ForceDecks];

    /// Human-readable product name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NordBord => "NordBord",
            Self::ForceFrame => "ForceFrame",
            Self::ForceDecks => "ForceDecks",
        }
    }

    /// Lowercase identifier used in file names.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::NordBord => "nordbord",
            Self::ForceFrame => "forceframe",
            Self::ForceDecks => "forcedecks",
        }
    }

    /// Destination sheet in the shared spreadsheet.
    #[must_use]
    pub const fn sheet_name(self) -> &'static str {
        match self {
            Self::NordBord => "NordBord_VALD",
            Self::ForceFrame => "ForceFrame_VALD",
            Self::ForceDecks => "ForceDecks_VALD",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_distinct() {
        let slugs: std::collections::HashSet<_> = Device::ALL.iter().map(|d| d.slug()).collect();
        let sheets: std::collections::HashSet<_> =
            Device::ALL.iter().map(|d| d.sheet_name()).collect();
        assert_eq!(slugs.len(), 3);
        assert_eq!(sheets.len(), 3);
        assert_eq!(Device::ForceDecks.to_string(), "ForceDecks");
    }
}
