//! Per-base views derived from active listings.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Representative symbols of one base on a source exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub spot: String,
    pub futures: Option<String>,
}

/// Source index keyed by uppercase base. Ordered for deterministic output.
pub type SourceIndex = BTreeMap<String, SourceInfo>;

/// Bases with at least one qualifying spot listing on a target.
pub type PresenceSet = BTreeSet<String>;
