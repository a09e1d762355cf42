//! Read-only catalog of seismic events.
//!
//! Loads a JSON array or NDJSON export of the event table and keeps it
//! sorted newest first. Selection and filtering are explicit calls.

use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::errors::SeismapError;
use crate::filters::EventFilter;
use crate::models::SeismicEvent;

/// Events ordered by origin time, most recent first.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: Vec<SeismicEvent>,
    skipped: usize,
}

impl EventCatalog {
    /// Build a catalog, dropping records that fail validation.
    #[must_use]
    pub fn new(events: Vec<SeismicEvent>) -> Self {
        let total = events.len();
        let mut events: Vec<SeismicEvent> = events
            .into_iter()
            .filter(|event| match event.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("skipping record: {}", e);
                    false
                }
            })
            .collect();
        events.sort_by(|a, b| b.origin_time.cmp(&a.origin_time));

        let skipped = total - events.len();
        Self { events, skipped }
    }

    /// Load an export file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, SeismapError> {
        let text = fs::read_to_string(path).map_err(|source| SeismapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&text)?;
        info!(
            "loaded {} events ({} skipped)",
            catalog.len(),
            catalog.skipped()
        );
        Ok(catalog)
    }

    /// Parse a JSON array or newline-delimited JSON.
    ///
    /// # Errors
    ///
    /// Returns a `Parse` error on malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, SeismapError> {
        let trimmed = text.trim_start();
        let events: Vec<SeismicEvent> = if trimmed.starts_with('[') {
            debug!("parsing JSON array");
            serde_json::from_str(trimmed)?
        } else {
            debug!("parsing NDJSON");
            trimmed
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| serde_json::from_str::<SeismicEvent>(line))
                .collect::<Result<_, _>>()?
        };
        Ok(Self::new(events))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Records dropped by validation.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeismicEvent> {
        self.events.iter()
    }

    /// Events passing the filter, newest first.
    #[must_use]
    pub fn filter(&self, filter: &EventFilter) -> Vec<&SeismicEvent> {
        self.events.iter().filter(|e| filter.matches(e)).collect()
    }

    /// Select one event by ID.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` if no record has that ID.
    pub fn get(&self, event_id: &str) -> Result<&SeismicEvent, SeismapError> {
        self.events
            .iter()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| SeismapError::EventNotFound(event_id.to_string()))
    }
}
