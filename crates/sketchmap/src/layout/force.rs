//! Deterministic force-directed layout engine
//!
//! Each step applies three forces to every node:
//!
//! - a spring along each edge, proportional to its deviation from the rest length
//! - repulsion between every pair, inverse to the squared distance, with the
//!   distance floored at `min_distance`
//! - a weak pull toward the canvas center
//!
//! Velocities are damped and capped every step. The run stops once kinetic
//! energy drops below the threshold or the step budget is spent.
//!
//! # Scaling
//!
//! Repulsion visits every pair of nodes, so a run costs
//! O(steps x nodes²). That is fine for sketches of a few dozen nodes; graphs
//! with thousands of nodes would need a spatial approximation.
//!
//! # Determinism
//!
//! Nodes start on a circle by index, are iterated in insertion order, and
//! coincident nodes are separated along an index-derived direction. The
//! same graph and settings always give bit-identical positions.

use std::f32::consts::TAU;

use log::{debug, info, warn};

use sketchmap_core::{geometry::Point, graph::Graph};

use super::LayoutReport;
use crate::config::ForceSettings;

/// Distances below this count as coincident.
const COINCIDENT_EPSILON: f32 = 1e-4;

/// Golden angle, spreads index-derived directions evenly.
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Upper bound on overlap resolution sweeps per node.
const OVERLAP_SWEEPS_PER_NODE: usize = 50;

/// Force layout engine
pub struct Engine {
    settings: ForceSettings,
    node_size: f32,
}

impl Engine {
    /// Create an engine for nodes of radius `node_size`.
    pub fn new(settings: ForceSettings, node_size: f32) -> Self {
        Self {
            settings,
            node_size,
        }
    }

    /// Set the number of simulation steps
    pub fn set_max_steps(&mut self, max_steps: usize) -> &mut Self {
        self.settings = self.settings.clone().with_max_steps(max_steps);
        self
    }

    /// Set the node radius used for initial spacing and overlap removal
    pub fn set_node_size(&mut self, node_size: f32) -> &mut Self {
        self.node_size = node_size;
        self
    }

    /// Returns the simulation settings.
    pub fn settings(&self) -> &ForceSettings {
        &self.settings
    }

    fn center(&self) -> Point {
        Point::new(
            self.settings.canvas_width() / 2.0,
            self.settings.canvas_height() / 2.0,
        )
    }

    /// Nodes on a circle around the canvas center, by index.
    fn initial_positions(&self, count: usize) -> Vec<Point> {
        let center = self.center();
        if count == 1 {
            return vec![center];
        }

        let circumference_radius = count as f32 * 2.0 * self.node_size / TAU;
        let radius = self.settings.rest_length().max(circumference_radius);
        (0..count)
            .map(|i| {
                let angle = TAU * i as f32 / count as f32;
                center.add_point(Point::new(radius * angle.cos(), radius * angle.sin()))
            })
            .collect()
    }

    /// Unit vector for separating coincident nodes `i` and `j`.
    fn separation_direction(i: usize, j: usize) -> Point {
        let angle = GOLDEN_ANGLE * (i * 31 + j) as f32;
        Point::new(angle.cos(), angle.sin())
    }

    /// Runs the simulation and returns positions in node insertion order.
    pub fn simulate(&self, graph: &Graph) -> (Vec<Point>, LayoutReport) {
        let count = graph.node_count();
        if count == 0 {
            return (Vec::new(), LayoutReport::new(0, 0.0, true));
        }

        let settings = &self.settings;
        let edges: Vec<(usize, usize)> = graph.edge_indices().collect();
        let center = self.center();
        let dt = settings.time_step();

        let mut positions = self.initial_positions(count);
        let mut velocities = vec![Point::default(); count];
        let mut forces = vec![Point::default(); count];
        let mut steps = 0;
        let mut energy = 0.0;
        let mut converged = false;

        while steps < settings.max_steps() {
            forces.fill(Point::default());

            // Repulsion between every pair
            for i in 0..count {
                for j in (i + 1)..count {
                    let delta = positions[i].sub_point(positions[j]);
                    let distance = delta.hypot();
                    let direction = if distance < COINCIDENT_EPSILON {
                        Self::separation_direction(i, j)
                    } else {
                        delta.scale(1.0 / distance)
                    };
                    let floored = distance.max(settings.min_distance());
                    let push = direction.scale(settings.repulsion_constant() / (floored * floored));
                    forces[i] = forces[i].add_point(push);
                    forces[j] = forces[j].sub_point(push);
                }
            }

            // Springs along edges
            for &(source, target) in &edges {
                let delta = positions[target].sub_point(positions[source]);
                let distance = delta.hypot();
                if distance < COINCIDENT_EPSILON {
                    continue;
                }
                let stretch = settings.spring_constant() * (distance - settings.rest_length());
                let pull = delta.scale(stretch / distance);
                forces[source] = forces[source].add_point(pull);
                forces[target] = forces[target].sub_point(pull);
            }

            // Centering, integration and energy
            energy = 0.0;
            for i in 0..count {
                let centering = center
                    .sub_point(positions[i])
                    .scale(settings.centering_strength());
                let force = forces[i].add_point(centering);

                let mut velocity = velocities[i]
                    .add_point(force.scale(dt))
                    .scale(settings.damping());
                let speed = velocity.hypot();
                if speed > settings.max_speed() {
                    velocity = velocity.scale(settings.max_speed() / speed);
                }

                velocities[i] = velocity;
                positions[i] = positions[i].add_point(velocity.scale(dt));
                energy += 0.5 * velocity.hypot().powi(2);
            }

            steps += 1;
            if energy < settings.energy_threshold() {
                converged = true;
                break;
            }
        }

        let adjusted = self.resolve_overlaps(&mut positions);
        debug!(steps, energy, converged, overlap_adjustments = adjusted; "Force simulation finished");

        (positions, LayoutReport::new(steps, energy, converged))
    }

    /// Pushes apart every pair closer than two node radii.
    ///
    /// Returns the number of adjustments made.
    fn resolve_overlaps(&self, positions: &mut [Point]) -> usize {
        let min_gap = 2.0 * self.node_size;
        // Aim slightly past the minimum so rounding cannot leave a pair short
        let target = min_gap * 1.001 + 1e-3;
        let mut adjustments = 0;

        for _ in 0..OVERLAP_SWEEPS_PER_NODE * positions.len() {
            let mut moved = false;
            for i in 0..positions.len() {
                for j in (i + 1)..positions.len() {
                    let delta = positions[j].sub_point(positions[i]);
                    let distance = delta.hypot();
                    if distance >= min_gap {
                        continue;
                    }
                    let direction = if distance < COINCIDENT_EPSILON {
                        Self::separation_direction(i, j)
                    } else {
                        delta.scale(1.0 / distance)
                    };
                    let shift = direction.scale((target - distance) / 2.0);
                    positions[i] = positions[i].sub_point(shift);
                    positions[j] = positions[j].add_point(shift);
                    adjustments += 1;
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }

        adjustments
    }

    /// Lays out `graph` in place and reports how the run went.
    pub fn apply(&self, graph: &mut Graph) -> LayoutReport {
        info!(nodes = graph.node_count(), edges = graph.edge_count(); "Running force layout");
        let (positions, report) = self.simulate(graph);
        graph.apply_positions(&positions);

        if let Some(warning) = report.warning() {
            warn!(steps = report.steps(), energy = report.energy(); "{warning}");
        }
        report
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;
    use sketchmap_core::{graph::Node, identifier::Id};

    use super::*;

    fn graph_strategy() -> impl Strategy<Value = Graph> {
        (1usize..12)
            .prop_flat_map(|nodes| {
                (
                    Just(nodes),
                    prop::collection::vec((0..nodes, 0..nodes), 0..nodes * 2),
                )
            })
            .prop_map(|(nodes, edges)| {
                let mut graph = Graph::new();
                for idx in 0..nodes {
                    graph.add_node(Node::new(Id::from_index(idx), "n"));
                }
                for (source, target) in edges {
                    let _ = graph.add_edge(Id::from_index(source), Id::from_index(target));
                }
                graph
            })
    }

    proptest! {
        #[test]
        fn layout_is_bit_for_bit_deterministic(graph in graph_strategy()) {
            let engine = Engine::new(ForceSettings::default(), 20.0);
            let (first, first_report) = engine.simulate(&graph);
            let (second, second_report) = engine.simulate(&graph);

            prop_assert_eq!(first_report, second_report);
            for (a, b) in first.iter().zip(&second) {
                prop_assert_eq!(a.x().to_bits(), b.x().to_bits());
                prop_assert_eq!(a.y().to_bits(), b.y().to_bits());
            }
        }

        #[test]
        fn layout_positions_are_finite_and_separated(graph in graph_strategy()) {
            let engine = Engine::new(ForceSettings::default(), 15.0);
            let (positions, _) = engine.simulate(&graph);

            prop_assert_eq!(positions.len(), graph.node_count());
            for (i, a) in positions.iter().enumerate() {
                prop_assert!(a.is_finite());
                for b in &positions[i + 1..] {
                    prop_assert!(a.distance(*b) >= 30.0);
                }
            }
        }
    }
}
