//! Barnes-Hut quadtree over node positions.
//!
//! Rebuilt from scratch for every layout iteration. Each cell owns either no
//! children or exactly four, and keeps the total mass and center of mass of
//! everything below it.

use crate::model::Point;

/// Past this depth coincident points share a leaf instead of splitting forever.
const MAX_DEPTH: usize = 24;
/// Separation used when two bodies sit on top of each other.
pub(crate) const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug)]
struct Cell {
    center: Point,
    half: f64,
    mass: f64,
    mass_center: Point,
    bodies: Vec<usize>,
    children: Option<Box<[Cell; 4]>>,
}

impl Cell {
    fn new(center: Point, half: f64) -> Self {
        Self {
            center,
            half,
            mass: 0.0,
            mass_center: center,
            bodies: Vec::new(),
            children: None,
        }
    }

    fn quadrant(&self, p: Point) -> usize {
        usize::from(p.x >= self.center.x) + 2 * usize::from(p.y >= self.center.y)
    }

    fn subdivide(&self) -> Box<[Cell; 4]> {
        let q = self.half / 2.0;
        let (cx, cy) = (self.center.x, self.center.y);
        Box::new([
            Cell::new(Point::new(cx - q, cy - q), q),
            Cell::new(Point::new(cx + q, cy - q), q),
            Cell::new(Point::new(cx - q, cy + q), q),
            Cell::new(Point::new(cx + q, cy + q), q),
        ])
    }

    fn insert(&mut self, body: usize, points: &[Point], depth: usize) {
        let p = points[body];
        let total = self.mass + 1.0;
        self.mass_center = Point::new(
            (self.mass_center.x * self.mass + p.x) / total,
            (self.mass_center.y * self.mass + p.y) / total,
        );
        self.mass = total;

        if self.children.is_none() {
            if self.bodies.is_empty() || depth >= MAX_DEPTH {
                self.bodies.push(body);
                return;
            }
            let mut children = self.subdivide();
            for resident in std::mem::take(&mut self.bodies) {
                let q = self.quadrant(points[resident]);
                children[q].insert(resident, points, depth + 1);
            }
            self.children = Some(children);
        }
        let q = self.quadrant(p);
        if let Some(children) = self.children.as_mut() {
            children[q].insert(body, points, depth + 1);
        }
    }

    fn accumulate(&self, body: usize, points: &[Point], theta: f64, strength: f64, force: &mut Point) {
        if self.mass == 0.0 {
            return;
        }
        let p = points[body];
        match &self.children {
            None => {
                for &other in &self.bodies {
                    if other != body {
                        apply(force, repulsion(p, points[other], body, other, strength));
                    }
                }
            }
            Some(children) => {
                let dx = p.x - self.mass_center.x;
                let dy = p.y - self.mass_center.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > MIN_DISTANCE && (2.0 * self.half) / dist < theta {
                    apply(force, aggregate_repulsion(dx, dy, dist, self.mass, strength));
                } else {
                    for child in children.iter() {
                        child.accumulate(body, points, theta, strength, force);
                    }
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match &self.children {
            None => 1,
            Some(children) => 1 + children.iter().map(Cell::depth).max().unwrap_or(0),
        }
    }
}

fn apply(force: &mut Point, delta: Point) {
    force.x += delta.x;
    force.y += delta.y;
}

/// Inverse-square push of `p` away from `q`.
///
/// Coincident bodies are separated along a fixed diagonal whose sign depends
/// on index order, so the result stays deterministic and finite.
pub(crate) fn repulsion(p: Point, q: Point, body: usize, other: usize, strength: f64) -> Point {
    let mut dx = p.x - q.x;
    let mut dy = p.y - q.y;
    let mut dist_sq = dx * dx + dy * dy;
    if dist_sq < MIN_DISTANCE * MIN_DISTANCE {
        let sign = if body < other { -1.0 } else { 1.0 };
        dx = sign * MIN_DISTANCE;
        dy = sign * MIN_DISTANCE * 0.5;
        dist_sq = dx * dx + dy * dy;
    }
    aggregate_repulsion(dx, dy, dist_sq.sqrt(), 1.0, strength)
}

fn aggregate_repulsion(dx: f64, dy: f64, dist: f64, mass: f64, strength: f64) -> Point {
    let magnitude = strength * mass / (dist * dist);
    Point::new(magnitude * dx / dist, magnitude * dy / dist)
}

/// Spatial index built from a snapshot of positions.
#[derive(Debug)]
pub struct Quadtree<'a> {
    points: &'a [Point],
    root: Cell,
}

impl<'a> Quadtree<'a> {
    pub fn build(points: &'a [Point]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let root = if points.is_empty() {
            Cell::new(Point::new(0.0, 0.0), 1.0)
        } else {
            let half = ((max_x - min_x).max(max_y - min_y) / 2.0).max(1.0) * 1.01;
            Cell::new(Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0), half)
        };
        let mut tree = Self { points, root };
        for body in 0..points.len() {
            tree.root.insert(body, points, 0);
        }
        tree
    }

    pub fn total_mass(&self) -> f64 {
        self.root.mass
    }

    pub fn center_of_mass(&self) -> Point {
        self.root.mass_center
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Approximate repulsion on `body` from every other body. Cells whose
    /// `size / distance < theta` act as a single mass.
    pub fn repulsion_on(&self, body: usize, theta: f64, strength: f64) -> Point {
        let mut force = Point::new(0.0, 0.0);
        self.root.accumulate(body, self.points, theta, strength, &mut force);
        force
    }
}

/// Exact O(N^2) counterpart of [`Quadtree::repulsion_on`].
pub fn exact_repulsion_on(points: &[Point], body: usize, strength: f64) -> Point {
    let mut force = Point::new(0.0, 0.0);
    for (other, &q) in points.iter().enumerate() {
        if other != body {
            apply(&mut force, repulsion(points[body], q, body, other, strength));
        }
    }
    force
}
