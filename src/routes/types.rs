//! Route request and response types
//!
//! This request/response shape is the one externally observable contract of
//! the engine; field names are fixed in camelCase for existing consumers.

use serde::{Deserialize, Serialize};

use crate::models::DegreeCategory;

use super::graph::NodeKey;

fn default_limit() -> usize {
    10
}

/// Reference to a graph node: a catalog entry with an optional explicit
/// tonic (the entry's identity tonic when omitted)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteNodeRef {
    pub entry_id: String,
    #[serde(default)]
    pub tonic: Option<String>,
}

/// A route query between two maqam realizations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub tuning_system_id: String,
    pub starting_note: String,
    pub source_id: String,
    #[serde(default)]
    pub source_tonic: Option<String>,
    pub target_id: String,
    #[serde(default)]
    pub target_tonic: Option<String>,
    /// Waypoints the route must pass through, in this order
    #[serde(default)]
    pub waypoints: Vec<RouteNodeRef>,
    /// Mandatory hop ceiling; the bound that keeps enumeration finite
    pub max_hops: usize,
    #[serde(default)]
    pub return_to_start: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Resolved description of one graph node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteNodeDescription {
    pub entry_id: String,
    pub name: String,
    pub tonic: String,
}

/// The search constraints a query was answered under
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteConstraints {
    pub max_hops: usize,
    pub return_to_start: bool,
    pub limit: usize,
}

/// One hop of a journey
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub from: NodeKey,
    pub to: NodeKey,
    pub category: DegreeCategory,
}

/// A ranked journey: the forward leg, and the return leg when requested
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub segments: Vec<RouteSegment>,
    pub hop_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_segments: Option<Vec<RouteSegment>>,
    pub total_hops: usize,
}

/// Response: ranked journeys plus the echoed request context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub tuning_system_id: String,
    pub tuning_system_name: String,
    pub starting_note: String,
    pub source: RouteNodeDescription,
    pub target: RouteNodeDescription,
    pub waypoints: Vec<RouteNodeDescription>,
    pub constraints: RouteConstraints,
    pub journeys: Vec<Journey>,
}
