//! JSON analysis document.
//!
//! One document carries everything a run needs:
//!
//! ```json
//! {
//!   "config": { "total_ways": 16, "num_threads": 2 },
//!   "catalogue": [ { "label": "skew", "ways": [12, 4] } ],
//!   "histograms": [
//!     { "thread": 0, "interval": 1, "stack": "private", "distances": { "16.00": 100 } }
//!   ]
//! }
//! ```
//!
//! `catalogue` is optional; the standard catalogue is used when it is absent.

use std::io::Read;

use serde::Deserialize;

use crate::common::Error;
use crate::config::PartitionConfig;
use crate::partition::{PartitionAnalyzer, PartitionShape};
use crate::profile::{HistogramRecord, HistogramStore};

/// Parsed analysis input.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisDocument {
    /// Cache geometry and modes.
    pub config: PartitionConfig,
    /// Shapes for the catalogue scan; `None` selects the standard catalogue.
    #[serde(default)]
    pub catalogue: Option<Vec<PartitionShape>>,
    /// Every histogram of the run.
    #[serde(default)]
    pub histograms: Vec<HistogramRecord>,
}

impl AnalysisDocument {
    /// Parses a document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed JSON or missing required fields.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Parses a document from a reader.
    ///
    /// # Errors
    ///
    /// Returns the parser error, including I/O failures of `reader`.
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    /// Builds the analyzer described by the document's config and catalogue.
    ///
    /// # Errors
    ///
    /// Returns the configuration or catalogue validation error.
    pub fn analyzer(&self) -> Result<PartitionAnalyzer, Error> {
        let analyzer = PartitionAnalyzer::new(self.config.clone())?;
        Ok(match &self.catalogue {
            Some(shapes) => analyzer.with_catalogue(shapes.clone())?,
            None => analyzer,
        })
    }

    /// Ingests every histogram into a fresh store and builds its profiles.
    ///
    /// # Errors
    ///
    /// Returns the configuration error, or the first histogram that fails to
    /// parse or names an unknown thread or interval 0.
    pub fn store(&self) -> Result<HistogramStore, Error> {
        let mut store = HistogramStore::new(&self.config)?;
        let _ingested = store.ingest(&self.histograms)?;
        let _built = store.build_profiles();
        Ok(store)
    }
}
