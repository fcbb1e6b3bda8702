//! Route finder
//!
//! Builds the modulation graph for a query, then enumerates simple paths
//! from source to target through the requested waypoints in order, bounded
//! by the mandatory hop ceiling, ranked by ascending hop count and truncated
//! to the result limit. An empty journey list is an answer; only caller
//! contract violations (zero bounds, unknown ids) are errors, and they are
//! rejected before any search begins.

pub mod graph;
pub mod types;

pub use graph::{ModulationGraph, NodeKey};
pub use types::{
    Journey, RouteConstraints, RouteNodeDescription, RouteNodeRef, RouteRequest, RouteResponse,
    RouteSegment,
};

use log::debug;

use crate::catalog::Catalog;
use crate::error::EngineError;
use crate::lattice::build_lattice;
use crate::models::DegreeCategory;
use crate::transposition::DEFAULT_CENTS_TOLERANCE;

/// Answer a route query against the catalog.
///
/// The graph is built fresh for the query's lattice and discarded with it.
pub fn find_routes(catalog: &Catalog, request: &RouteRequest) -> Result<RouteResponse, EngineError> {
    // contract checks come before any search
    if request.max_hops == 0 {
        return Err(EngineError::InvalidHopCeiling);
    }
    if request.limit == 0 {
        return Err(EngineError::InvalidResultLimit);
    }
    let tuning_system = catalog
        .tuning_system(&request.tuning_system_id)
        .ok_or_else(|| EngineError::UnknownTuningSystem(request.tuning_system_id.clone()))?;
    for id in [&request.source_id, &request.target_id]
        .into_iter()
        .chain(request.waypoints.iter().map(|w| &w.entry_id))
    {
        if catalog.maqam(id).is_none() {
            return Err(EngineError::UnknownEntry(id.clone()));
        }
    }

    let constraints = RouteConstraints {
        max_hops: request.max_hops,
        return_to_start: request.return_to_start,
        limit: request.limit,
    };

    let lattice = build_lattice(tuning_system, &request.starting_note);
    let graph = ModulationGraph::build(&lattice, catalog, DEFAULT_CENTS_TOLERANCE);

    let source = resolve(&graph, catalog, &request.source_id, request.source_tonic.as_deref());
    let target = resolve(&graph, catalog, &request.target_id, request.target_tonic.as_deref());
    let waypoints: Vec<(RouteNodeDescription, Option<usize>)> = request
        .waypoints
        .iter()
        .map(|w| resolve(&graph, catalog, &w.entry_id, w.tonic.as_deref()))
        .collect();

    let mut response = RouteResponse {
        tuning_system_id: tuning_system.id.clone(),
        tuning_system_name: tuning_system.name.clone(),
        starting_note: request.starting_note.clone(),
        source: source.0.clone(),
        target: target.0.clone(),
        waypoints: waypoints.iter().map(|(d, _)| d.clone()).collect(),
        constraints,
        journeys: Vec::new(),
    };

    // unrealizable nodes on this lattice exhaust the search, they do not fail it
    let (Some(source_index), Some(target_index)) = (source.1, target.1) else {
        return Ok(response);
    };
    let waypoint_indices: Option<Vec<usize>> = waypoints.iter().map(|(_, i)| *i).collect();
    let Some(waypoint_indices) = waypoint_indices else {
        return Ok(response);
    };

    let mut forward = enumerate_paths(
        &graph,
        source_index,
        target_index,
        &waypoint_indices,
        request.max_hops,
    );
    forward.sort_by_key(|p| p.len());

    let best_return = if request.return_to_start {
        let mut back = enumerate_paths(&graph, target_index, source_index, &[], request.max_hops);
        back.sort_by_key(|p| p.len());
        match back.into_iter().next() {
            Some(p) => Some(p),
            // a round trip was requested and none exists
            None => return Ok(response),
        }
    } else {
        None
    };

    response.journeys = forward
        .into_iter()
        .take(request.limit)
        .map(|path| {
            let hop_count = path.len();
            let segments = describe(&graph, &path);
            let return_segments = best_return.as_ref().map(|p| describe(&graph, p));
            let total_hops = hop_count + best_return.as_ref().map_or(0, |p| p.len());
            Journey {
                segments,
                hop_count,
                return_segments,
                total_hops,
            }
        })
        .collect();

    debug!(
        "route query {} -> {}: {} journey(s)",
        request.source_id,
        request.target_id,
        response.journeys.len()
    );
    Ok(response)
}

/// Resolve an entry reference to its description and graph index. The tonic
/// defaults to the entry's identity realization on this lattice.
fn resolve(
    graph: &ModulationGraph,
    catalog: &Catalog,
    entry_id: &str,
    tonic: Option<&str>,
) -> (RouteNodeDescription, Option<usize>) {
    let name = catalog
        .maqam(entry_id)
        .map(|t| t.name.clone())
        .unwrap_or_default();
    let tonic = tonic
        .map(str::to_string)
        .or_else(|| graph.identity_tonic(entry_id).map(str::to_string))
        .unwrap_or_default();
    let key = NodeKey {
        entry_id: entry_id.to_string(),
        tonic: tonic.clone(),
    };
    let index = graph.node_index(&key);
    (
        RouteNodeDescription {
            entry_id: entry_id.to_string(),
            name,
            tonic,
        },
        index,
    )
}

type Step = (usize, usize, DegreeCategory);

/// Enumerate simple paths from `source` to `target` passing through
/// `waypoints` in order, with at most `max_hops` hops, in deterministic
/// depth-first discovery order
fn enumerate_paths(
    graph: &ModulationGraph,
    source: usize,
    target: usize,
    waypoints: &[usize],
    max_hops: usize,
) -> Vec<Vec<Step>> {
    let mut results = Vec::new();
    let mut visited = vec![false; graph.len()];
    let mut path = Vec::new();
    visited[source] = true;
    let consumed = consume_waypoints(waypoints, 0, source);
    dfs(
        graph, source, target, waypoints, consumed, max_hops, &mut visited, &mut path,
        &mut results,
    );
    results
}

fn consume_waypoints(waypoints: &[usize], mut next: usize, node: usize) -> usize {
    while next < waypoints.len() && waypoints[next] == node {
        next += 1;
    }
    next
}

#[allow(clippy::too_many_arguments)]
fn dfs(
    graph: &ModulationGraph,
    current: usize,
    target: usize,
    waypoints: &[usize],
    next_waypoint: usize,
    max_hops: usize,
    visited: &mut Vec<bool>,
    path: &mut Vec<Step>,
    results: &mut Vec<Vec<Step>>,
) {
    if current == target && !path.is_empty() {
        if next_waypoint == waypoints.len() {
            results.push(path.clone());
        }
        // a simple path cannot leave and re-enter the target
        return;
    }
    if path.len() == max_hops {
        return;
    }

    for edge in &graph.node(current).edges {
        if visited[edge.to] {
            continue;
        }
        // an out-of-order waypoint visit can never be repaired later
        if waypoints[next_waypoint..].contains(&edge.to) && waypoints[next_waypoint] != edge.to {
            continue;
        }
        let consumed = consume_waypoints(waypoints, next_waypoint, edge.to);

        visited[edge.to] = true;
        path.push((current, edge.to, edge.category));
        dfs(
            graph, edge.to, target, waypoints, consumed, max_hops, visited, path, results,
        );
        path.pop();
        visited[edge.to] = false;
    }
}

fn describe(graph: &ModulationGraph, path: &[Step]) -> Vec<RouteSegment> {
    path.iter()
        .map(|(from, to, category)| RouteSegment {
            from: graph.node(*from).key.clone(),
            to: graph.node(*to).key.clone(),
            category: *category,
        })
        .collect()
}
