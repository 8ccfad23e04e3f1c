//! Closed outlines from unordered line and arc fragments.
//!
//! Endpoints are snapped onto a grid of [`DEFAULT_SNAP_TOLERANCE`] so fragments that nearly touch
//! share a node. Every fragment becomes one edge between its two end nodes; cycles are then walked
//! greedily, preferring the straightest continuation at junctions.

use std::collections::HashMap;

use kleplate_core::{Polygon, Vec2};
use kleplate_geometry::arc_points;
use tracing::debug;

/// Grid step used to decide that two endpoints coincide.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 0.01;

/// One raw fragment of a board outline.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineItem {
    Line { a: Vec2, b: Vec2 },
    /// `sweep_deg` is positive for counter-clockwise arcs in the Y-up convention.
    Arc { a: Vec2, b: Vec2, sweep_deg: f64 },
}

impl OutlineItem {
    #[must_use]
    pub fn endpoints(&self) -> (Vec2, Vec2) {
        match self {
            OutlineItem::Line { a, b } | OutlineItem::Arc { a, b, .. } => (*a, *b),
        }
    }

    /// Polyline from `a` to `b`; arcs are flattened.
    #[must_use]
    pub fn points(&self) -> Vec<Vec2> {
        match self {
            OutlineItem::Line { a, b } => vec![*a, *b],
            OutlineItem::Arc { a, b, sweep_deg } => arc_points(*a, *b, *sweep_deg),
        }
    }
}

/// How fragments are turned into polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructMode {
    /// Prune dangling fragments and emit every closed cycle.
    Cycles,
    /// Follow one best-effort path from the first fragment, for when a single outline is expected.
    OpenPath,
}

#[derive(Debug, Clone)]
struct Edge {
    from: usize,
    to: usize,
    points: Vec<Vec2>,
}

impl Edge {
    /// Points of this edge walked away from `node`, plus the node on the far side.
    fn oriented_from(&self, node: usize) -> (Vec<Vec2>, usize) {
        if self.from == node {
            (self.points.clone(), self.to)
        } else {
            let mut pts = self.points.clone();
            pts.reverse();
            (pts, self.from)
        }
    }

    /// Unit direction of the first segment when leaving `node`.
    fn leaving_direction(&self, node: usize) -> Vec2 {
        let (a, b) = if self.from == node {
            (self.points[0], self.points[1])
        } else {
            let n = self.points.len();
            (self.points[n - 1], self.points[n - 2])
        };
        (b - a).normalized()
    }
}

/// Endpoint adjacency over a set of outline fragments.
#[derive(Debug, Clone)]
pub struct OutlineGraph {
    edges: Vec<Edge>,
    adjacency: Vec<Vec<usize>>,
    alive: Vec<bool>,
}

impl OutlineGraph {
    /// Build the graph, snapping endpoints to a grid of `tolerance`.
    #[must_use]
    pub fn new(items: &[OutlineItem], tolerance: f64) -> Self {
        let tol = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            DEFAULT_SNAP_TOLERANCE
        };

        let mut node_ids: HashMap<(i64, i64), usize> = HashMap::new();
        let mut adjacency: Vec<Vec<usize>> = Vec::new();
        let mut edges: Vec<Edge> = Vec::with_capacity(items.len());

        let mut node_for = |p: Vec2, adjacency: &mut Vec<Vec<usize>>| -> usize {
            let key = ((p.x / tol).round() as i64, (p.y / tol).round() as i64);
            *node_ids.entry(key).or_insert_with(|| {
                adjacency.push(Vec::new());
                adjacency.len() - 1
            })
        };

        for item in items {
            let points = item.points();
            if points.len() < 2 {
                continue;
            }
            let (a, b) = item.endpoints();
            let from = node_for(a, &mut adjacency);
            let to = node_for(b, &mut adjacency);
            // A straight fragment shorter than the grid step carries no shape.
            if from == to && matches!(item, OutlineItem::Line { .. }) {
                continue;
            }
            let id = edges.len();
            adjacency[from].push(id);
            if to != from {
                adjacency[to].push(id);
            }
            edges.push(Edge { from, to, points });
        }

        let alive = vec![true; edges.len()];
        Self {
            edges,
            adjacency,
            alive,
        }
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of live edges that are not pruned.
    #[must_use]
    pub fn live_edge_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    fn degree(&self, node: usize) -> usize {
        self.adjacency[node]
            .iter()
            .filter(|&&e| self.alive[e])
            .map(|&e| if self.edges[e].from == self.edges[e].to { 2 } else { 1 })
            .sum()
    }

    /// Drop edges with an endpoint of degree below 2, repeating until nothing changes.
    pub fn prune_dangling(&mut self) {
        loop {
            let doomed: Vec<usize> = (0..self.edges.len())
                .filter(|&e| self.alive[e])
                .filter(|&e| {
                    let edge = &self.edges[e];
                    self.degree(edge.from) < 2 || self.degree(edge.to) < 2
                })
                .collect();
            if doomed.is_empty() {
                break;
            }
            for e in doomed {
                self.alive[e] = false;
            }
        }
    }

    /// Best continuation at `node` after arriving along `incoming`.
    fn next_edge(
        &self,
        node: usize,
        incoming: usize,
        heading: Vec2,
        usable: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        let candidates: Vec<usize> = self.adjacency[node]
            .iter()
            .copied()
            .filter(|&e| e != incoming && self.alive[e] && usable(e))
            .collect();
        match candidates.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => {
                let mut best = candidates[0];
                let mut best_dot = f64::NEG_INFINITY;
                for &e in &candidates {
                    let dot = self.edges[e].leaving_direction(node).dot(heading);
                    if dot > best_dot {
                        best_dot = dot;
                        best = e;
                    }
                }
                Some(best)
            }
        }
    }

    /// Walk from `seed`, returning the closed ring and the edges it used.
    fn walk_cycle(&self, seed: usize, consumed: &[bool]) -> Option<(Vec<Vec2>, Vec<usize>)> {
        let start = self.edges[seed].from;
        let mut points = self.edges[seed].points.clone();
        let mut current = self.edges[seed].to;
        let mut incoming = seed;
        let mut in_walk = vec![false; self.edges.len()];
        in_walk[seed] = true;
        let mut used = vec![seed];

        while current != start {
            let heading = heading_of(&points);
            let next = self.next_edge(current, incoming, heading, |e| !consumed[e] && !in_walk[e])?;
            let (pts, far) = self.edges[next].oriented_from(current);
            points.extend_from_slice(&pts[1..]);
            in_walk[next] = true;
            used.push(next);
            incoming = next;
            current = far;
        }

        // The walk ended on the seed node; its last point duplicates the first.
        points.pop();
        (points.len() >= 3).then_some((points, used))
    }

    /// Every closed cycle among the live edges, seeded in input order.
    ///
    /// Each edge belongs to at most one cycle. A seed that cannot close is discarded alone.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Polygon> {
        let mut consumed: Vec<bool> = self.alive.iter().map(|a| !a).collect();
        let mut cycles: Vec<Polygon> = Vec::new();

        for seed in 0..self.edges.len() {
            if consumed[seed] {
                continue;
            }
            match self.walk_cycle(seed, &consumed) {
                Some((points, used)) => {
                    for e in used {
                        consumed[e] = true;
                    }
                    if let Ok(p) = Polygon::new(points) {
                        cycles.push(p);
                    }
                }
                None => consumed[seed] = true,
            }
        }
        cycles
    }

    /// Best-effort single path starting at the first edge, ignoring pruning.
    #[must_use]
    pub fn trace_open_path(&self) -> Option<Polygon> {
        let first = self.edges.first()?;
        let start = first.from;
        let mut points = first.points.clone();
        let mut current = first.to;
        let mut incoming = 0usize;
        let mut used = vec![false; self.edges.len()];
        used[0] = true;

        while current != start {
            let heading = heading_of(&points);
            let next = self.adjacency[current]
                .iter()
                .copied()
                .filter(|&e| e != incoming && !used[e])
                .max_by(|&x, &y| {
                    let dx = self.edges[x].leaving_direction(current).dot(heading);
                    let dy = self.edges[y].leaving_direction(current).dot(heading);
                    // Earlier edges win ties.
                    dx.total_cmp(&dy).then(y.cmp(&x))
                });
            let Some(next) = next else {
                break;
            };
            let (pts, far) = self.edges[next].oriented_from(current);
            points.extend_from_slice(&pts[1..]);
            used[next] = true;
            incoming = next;
            current = far;
        }
        if current == start {
            points.pop();
        }
        Polygon::new(points).ok()
    }
}

fn heading_of(points: &[Vec2]) -> Vec2 {
    let n = points.len();
    (points[n - 1] - points[n - 2]).normalized()
}

/// Reconstruct outline polygons from fragments. Returns an empty list when nothing closes.
#[must_use]
pub fn reconstruct(items: &[OutlineItem], mode: ReconstructMode, tolerance: f64) -> Vec<Polygon> {
    let mut graph = OutlineGraph::new(items, tolerance);
    let out: Vec<Polygon> = match mode {
        ReconstructMode::Cycles => {
            graph.prune_dangling();
            graph.find_cycles()
        }
        ReconstructMode::OpenPath => graph.trace_open_path().into_iter().collect(),
    };
    debug!(
        items = items.len(),
        nodes = graph.node_count(),
        live_edges = graph.live_edge_count(),
        polygons = out.len(),
        ?mode,
        "outline reconstruction"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(a: (f64, f64), b: (f64, f64)) -> OutlineItem {
        OutlineItem::Line {
            a: Vec2::new(a.0, a.1),
            b: Vec2::new(b.0, b.1),
        }
    }

    #[test]
    fn endpoints_within_tolerance_share_a_node() {
        let items = [
            line((0.0, 0.0), (10.0, 0.0)),
            line((10.001, 0.002), (10.0, 10.0)),
            line((10.0, 10.0), (0.0, 0.0)),
        ];
        let graph = OutlineGraph::new(&items, DEFAULT_SNAP_TOLERANCE);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn pruning_removes_chains_of_danglers() {
        let items = [
            line((0.0, 0.0), (10.0, 0.0)),
            line((10.0, 0.0), (10.0, 10.0)),
            line((10.0, 10.0), (0.0, 0.0)),
            // Two-edge spur hanging off a corner.
            line((10.0, 10.0), (20.0, 20.0)),
            line((20.0, 20.0), (30.0, 20.0)),
        ];
        let mut graph = OutlineGraph::new(&items, DEFAULT_SNAP_TOLERANCE);
        graph.prune_dangling();
        assert_eq!(graph.live_edge_count(), 3);
    }

    #[test]
    fn zero_length_lines_are_ignored() {
        let items = [line((1.0, 1.0), (1.0, 1.0))];
        let graph = OutlineGraph::new(&items, DEFAULT_SNAP_TOLERANCE);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.trace_open_path().is_none());
    }
}
