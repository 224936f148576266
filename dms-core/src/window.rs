use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DmsError, Result};

/// Date format used for API query parameters: "YYYY-MM-DD"
pub const YEAR_FORMAT: &str = "%Y-%m-%d";

/// Bounds for a single observation read: an optional time range plus
/// optional paging. All fields absent means "whatever the server
/// defaults to".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ObservationWindow {
    /// Window covering a closed date range.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    /// Window selecting one page of records.
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..Self::default()
        }
    }

    /// Check the window is well-formed before any request is issued.
    pub fn validate(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(DmsError::ZeroLimit);
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(DmsError::InvalidWindow(format!(
                    "start {start} is after end {end}"
                )));
            }
        }
        Ok(())
    }

    /// Render the window as URL query pairs, skipping absent fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(start) = self.start {
            pairs.push(("start", start.format(YEAR_FORMAT).to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("end", end.format(YEAR_FORMAT).to_string()));
        }
        pairs
    }
}

/// A windowed read request against one monitoring point.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationQuery {
    pub point_code: String,
    pub window: ObservationWindow,
}

impl ObservationQuery {
    pub fn new(point_code: impl Into<String>, window: ObservationWindow) -> Self {
        Self {
            point_code: point_code.into(),
            window,
        }
    }

    /// Fail fast on an empty point code or a malformed window, before
    /// anything goes over the wire.
    pub fn validate(&self) -> Result<()> {
        if self.point_code.trim().is_empty() {
            return Err(DmsError::EmptyPointCode);
        }
        self.window.validate()
    }
}
