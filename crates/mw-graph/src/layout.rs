//! Force-directed layout: inverse-square repulsion, spring attraction along
//! edges, gravity toward the canvas center, damping and a cooling schedule.
//!
//! Repulsion is exact for small graphs and Barnes-Hut approximated above
//! `barnes_hut_min_nodes`. Identical input without prior positions always
//! produces identical output.

use crate::model::{Graph, Point};
use crate::quadtree::{exact_repulsion_on, Quadtree, MIN_DISTANCE};
use mw_core::LayoutConfig;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
/// Share of the smaller canvas side used for the initial spiral.
const SEED_RADIUS: f64 = 0.4;
/// Starting step limit as a share of the larger canvas side.
const START_TEMPERATURE: f64 = 0.1;
const MIN_TEMPERATURE: f64 = 0.01;
/// Displacement must drop by more than this share to count as still improving.
const IMPROVEMENT_RATIO: f64 = 0.01;

/// Values derived from [`LayoutConfig`] and the graph size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub ideal_distance: f64,
    pub repulsion: f64,
    pub attraction: f64,
    pub gravity: f64,
    pub theta: f64,
    pub damping: f64,
    pub barnes_hut: bool,
}

impl LayoutParams {
    pub fn derive(config: &LayoutConfig, nodes: usize, width: f64, height: f64) -> Self {
        let n = nodes.max(1) as f64;
        let large = nodes > config.large_graph_nodes;
        let ideal_distance = ((width * height).max(1.0) / n).sqrt() * config.ideal_distance_scale;
        Self {
            ideal_distance,
            repulsion: config.repulsion * ideal_distance.powi(3),
            attraction: if large { config.attraction_large } else { config.attraction },
            gravity: if large { config.gravity_large } else { config.gravity },
            theta: if large { config.theta_large } else { config.theta },
            damping: config.damping,
            barnes_hut: nodes > config.barnes_hut_min_nodes,
        }
    }
}

/// Result of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub iteration: usize,
    /// Sum of per-node movement in this step.
    pub displacement: f64,
    pub settled: bool,
}

/// A layout in progress. Callers that must not block for long can drive it
/// with [`ForceLayout::run`] in small batches and yield in between.
#[derive(Debug, Clone)]
pub struct ForceLayout {
    graph: Graph,
    width: f64,
    height: f64,
    margin: f64,
    params: LayoutParams,
    settle_threshold: f64,
    max_iterations: usize,
    positions: Vec<Point>,
    velocities: Vec<Point>,
    springs: Vec<(usize, usize, f64)>,
    iteration: usize,
    last_displacement: Option<f64>,
    settled: bool,
}

impl ForceLayout {
    pub fn new(graph: Graph, width: f64, height: f64, config: &LayoutConfig) -> Self {
        let n = graph.nodes.len();
        let params = LayoutParams::derive(config, n, width, height);
        let margin = config.margin;

        let positions: Vec<Point> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| match node.position {
                Some(p) if p.is_finite() => p,
                _ => seed_position(i, n, width, height),
            })
            .map(|p| clamp_point(p, width, height, margin))
            .collect();

        let springs = {
            let index = graph.index();
            graph
                .edges
                .iter()
                .filter_map(|e| {
                    let a = *index.get(e.source.as_str())?;
                    let b = *index.get(e.target.as_str())?;
                    let weight = if e.weight.is_finite() && e.weight > 0.0 { e.weight } else { 1.0 };
                    (a != b).then_some((a, b, weight))
                })
                .collect()
        };

        Self {
            width,
            height,
            margin,
            params,
            settle_threshold: config.settle_per_node * n as f64,
            max_iterations: config.iterations,
            velocities: vec![Point::new(0.0, 0.0); n],
            positions,
            springs,
            iteration: 0,
            last_displacement: None,
            settled: n == 0,
            graph,
        }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn is_done(&self) -> bool {
        self.settled || self.iteration >= self.max_iterations
    }

    fn temperature(&self) -> f64 {
        let start = START_TEMPERATURE * self.width.max(self.height).max(1.0);
        let progress = self.iteration as f64 / self.max_iterations.max(1) as f64;
        (start * (1.0 - progress)).max(start * MIN_TEMPERATURE)
    }

    /// Advance one iteration. A finished layout is left untouched.
    pub fn step(&mut self) -> StepOutcome {
        if self.is_done() {
            return StepOutcome {
                iteration: self.iteration,
                displacement: self.last_displacement.unwrap_or(0.0),
                settled: self.settled,
            };
        }

        let forces = self.compute_forces();
        let temperature = self.temperature();
        let mut displacement = 0.0;
        for (i, force) in forces.into_iter().enumerate() {
            let v = &mut self.velocities[i];
            v.x = (v.x + force.x) * self.params.damping;
            v.y = (v.y + force.y) * self.params.damping;
            if !v.is_finite() {
                *v = Point::new(0.0, 0.0);
            }
            let speed = (v.x * v.x + v.y * v.y).sqrt();
            if speed > temperature {
                v.x *= temperature / speed;
                v.y *= temperature / speed;
            }
            let before = self.positions[i];
            let after = clamp_point(Point::new(before.x + v.x, before.y + v.y), self.width, self.height, self.margin);
            let (mx, my) = (after.x - before.x, after.y - before.y);
            displacement += (mx * mx + my * my).sqrt();
            self.positions[i] = after;
        }

        self.iteration += 1;
        if has_settled(displacement, self.last_displacement, self.settle_threshold) {
            self.settled = true;
        }
        self.last_displacement = Some(displacement);

        StepOutcome {
            iteration: self.iteration,
            displacement,
            settled: self.settled,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_last_displacement(&mut self, displacement: f64) {
        self.last_displacement = Some(displacement);
    }

    /// Run up to `max_steps` iterations; returns how many ran.
    pub fn run(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && !self.is_done() {
            self.step();
            steps += 1;
        }
        steps
    }

    /// Run to completion.
    pub fn finish(mut self) -> Graph {
        self.run(usize::MAX);
        self.into_graph()
    }

    /// Write current positions back into the graph.
    pub fn into_graph(mut self) -> Graph {
        tracing::debug!(
            nodes = self.positions.len(),
            iterations = self.iteration,
            settled = self.settled,
            displacement = self.last_displacement.unwrap_or(0.0),
            "layout finished"
        );
        for (node, p) in self.graph.nodes.iter_mut().zip(&self.positions) {
            node.position = Some(*p);
        }
        self.graph
    }

    /// Net force per node from the positions at the start of the iteration.
    fn compute_forces(&self) -> Vec<Point> {
        let points = &self.positions;
        let p = &self.params;
        let mut forces: Vec<Point> = if p.barnes_hut {
            let tree = Quadtree::build(points);
            (0..points.len()).map(|i| tree.repulsion_on(i, p.theta, p.repulsion)).collect()
        } else {
            (0..points.len()).map(|i| exact_repulsion_on(points, i, p.repulsion)).collect()
        };

        for &(a, b, weight) in &self.springs {
            let dx = points[b].x - points[a].x;
            let dy = points[b].y - points[a].y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < MIN_DISTANCE {
                continue;
            }
            let pull = (dist - p.ideal_distance) * p.attraction * weight;
            let (fx, fy) = (pull * dx / dist, pull * dy / dist);
            forces[a].x += fx;
            forces[a].y += fy;
            forces[b].x -= fx;
            forces[b].y -= fy;
        }

        let center = Point::new(self.width / 2.0, self.height / 2.0);
        for (f, pos) in forces.iter_mut().zip(points) {
            f.x += (center.x - pos.x) * p.gravity;
            f.y += (center.y - pos.y) * p.gravity;
        }
        forces
    }
}

/// Movement is below `threshold` and no longer dropping by more than
/// [`IMPROVEMENT_RATIO`] of the previous step.
pub(crate) fn has_settled(displacement: f64, previous: Option<f64>, threshold: f64) -> bool {
    let improving = previous.is_some_and(|prev| prev - displacement > prev * IMPROVEMENT_RATIO);
    displacement < threshold && !improving
}

/// Deterministic golden-angle spiral around the canvas center.
fn seed_position(i: usize, n: usize, width: f64, height: f64) -> Point {
    let radius = SEED_RADIUS * width.min(height) * ((i as f64 + 0.5) / n.max(1) as f64).sqrt();
    let angle = i as f64 * GOLDEN_ANGLE;
    Point::new(width / 2.0 + radius * angle.cos(), height / 2.0 + radius * angle.sin())
}

fn clamp_axis(v: f64, size: f64, margin: f64) -> f64 {
    let (lo, hi) = (margin, size - margin);
    if lo > hi {
        // Margins overlap: the only admissible coordinate is the middle.
        return size / 2.0;
    }
    if v.is_finite() { v.clamp(lo, hi) } else { (lo + hi) / 2.0 }
}

fn clamp_point(p: Point, width: f64, height: f64, margin: f64) -> Point {
    Point::new(clamp_axis(p.x, width, margin), clamp_axis(p.y, height, margin))
}

/// Lay out `graph` on a `width` x `height` canvas with default parameters and
/// the given iteration cap. An empty graph is returned as is.
pub fn layout(graph: Graph, width: f64, height: f64, iterations: usize) -> Graph {
    let config = LayoutConfig {
        iterations,
        ..LayoutConfig::default()
    };
    layout_with(graph, width, height, &config)
}

pub fn layout_with(graph: Graph, width: f64, height: f64, config: &LayoutConfig) -> Graph {
    if graph.nodes.is_empty() {
        return graph;
    }
    ForceLayout::new(graph, width, height, config).finish()
}
