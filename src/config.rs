//! TOML input files: event fixtures and per-tenant policy overrides.
//!
//! Events:
//! ```toml
//! [[events]]
//! id = "algebra"
//! title = "Algebra I"
//! start = "2025-03-03T09:00:00"
//! end = "2025-03-03T10:00:00"
//!
//! [events.recurrence.rule]
//! frequency = "weekly"
//! by_weekday = ["MO", "WE"]
//!
//! [[events.recurrence.exceptions]]
//! date = "2025-03-05"
//! ```
//!
//! Policies:
//! ```toml
//! [[policies]]
//! region = "acme_academy"
//! year_start = { month = 8, day = 20 }
//! year_end = { month = 6, day = 10 }
//! rollover = { propose_before_end_days = 45, allow_after_start_days = 14 }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::academic::{AcademicYearPolicy, PolicyTable};
use crate::error::RecurResult;
use crate::types::Event;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsFile {
    #[serde(default)]
    pub events: Vec<Event>,
}

impl EventsFile {
    pub fn parse(text: &str) -> RecurResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> RecurResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let file = Self::parse(&text)?;
        debug!(path = %path.display(), events = file.events.len(), "loaded events");
        Ok(file)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyFile {
    #[serde(default)]
    pub policies: Vec<AcademicYearPolicy>,
}

impl PolicyFile {
    pub fn parse(text: &str) -> RecurResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> RecurResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let file = Self::parse(&text)?;
        debug!(path = %path.display(), policies = file.policies.len(), "loaded policy overrides");
        Ok(file)
    }

    pub fn into_table(self) -> PolicyTable {
        PolicyTable::with_overrides(self.policies)
    }
}
