//! Graph inference: turns spatial primitives into a labeled mind-map graph.
//!
//! Containers become nodes, nearby text becomes their labels, and strokes
//! running between two containers become edges. Text that belongs to no
//! container becomes a node of its own. Everything else is decoration.

use std::collections::VecDeque;

use log::{debug, info, trace};

use sketchmap_core::{
    geometry::{Bounds, Point},
    graph::{Graph, Node, UNTITLED_LABEL},
    identifier::Id,
    primitive::{Primitive, PrimitiveId},
};

use crate::{config::InferConfig, error::SketchError};

/// A node under construction with the region it was made from.
struct Candidate<'a> {
    id: Id,
    bounds: Bounds,
    texts: Vec<&'a Primitive>,
}

/// The closest container by `distance`; `None` distances are out of range.
///
/// Ties go to the container listed first, which is the lower primitive id.
fn nearest<'a>(
    containers: &[&'a Primitive],
    distance: impl Fn(&Primitive) -> Option<f32>,
) -> Option<&'a Primitive> {
    let mut best: Option<(&Primitive, f32)> = None;
    for &container in containers {
        let Some(d) = distance(container) else {
            continue;
        };
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((container, d));
        }
    }
    best.map(|(container, _)| container)
}

/// Joins recognized text in reading order: lines top to bottom, each line
/// left to right. Two texts share a line when one's vertical center lies
/// within the other's vertical extent.
fn reading_order_label(texts: &[&Primitive]) -> String {
    let mut sorted: Vec<&Primitive> = texts.to_vec();
    sorted.sort_by(|a, b| {
        a.bounds()
            .min_y()
            .total_cmp(&b.bounds().min_y())
            .then(a.id().cmp(&b.id()))
    });

    let mut lines: Vec<Vec<&Primitive>> = Vec::new();
    for text in sorted {
        let center_y = text.center().y();
        let same_line = lines.last().is_some_and(|line| {
            let first = line[0].bounds();
            center_y >= first.min_y() && center_y <= first.max_y()
        });
        match lines.last_mut() {
            Some(line) if same_line => line.push(text),
            _ => lines.push(vec![text]),
        }
    }

    let words: Vec<&str> = lines
        .iter_mut()
        .flat_map(|line| {
            line.sort_by(|a, b| a.bounds().min_x().total_cmp(&b.bounds().min_x()));
            line.iter().filter_map(|text| text.text())
        })
        .collect();

    if words.is_empty() {
        UNTITLED_LABEL.to_string()
    } else {
        words.join(" ")
    }
}

/// Candidate indices from most to least prominent: largest bounding area
/// first, ties broken top-most then left-most, then by creation order.
fn by_prominence(candidates: &[Candidate]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (candidates[a].bounds, candidates[b].bounds);
        b.area()
            .total_cmp(&a.area())
            .then(a.min_y().total_cmp(&b.min_y()))
            .then(a.min_x().total_cmp(&b.min_x()))
    });
    order
}

/// Directs every link away from the start of its component.
///
/// Components are walked breadth-first, each from its first node in
/// `starts`. A link runs from the endpoint reached first to the other, so
/// the walk's start has no incoming edges and every tree edge points from
/// parent to child.
fn orient_links(links: &[(usize, usize)], starts: &[usize], count: usize) -> Vec<(usize, usize)> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); count];
    for &(a, b) in links {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut rank: Vec<Option<usize>> = vec![None; count];
    let mut next_rank = 0usize;
    for &start in starts {
        if rank[start].is_some() {
            continue;
        }
        rank[start] = Some(next_rank);
        next_rank += 1;
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &neighbor in &adjacency[current] {
                if rank[neighbor].is_none() {
                    rank[neighbor] = Some(next_rank);
                    next_rank += 1;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    links
        .iter()
        .map(|&(a, b)| if rank[a] <= rank[b] { (a, b) } else { (b, a) })
        .collect()
}

/// Infers the graph for a primitive sequence.
///
/// - every text primitive attaches to the nearest container within
///   `label_distance` of its center; a center inside the container's
///   bounds is always in range
/// - every container and every unattached text primitive becomes one node,
///   numbered `"1"`, `"2"`, ... in primitive order
/// - a stroke whose endpoints are within `stroke_tolerance` of two distinct
///   containers connects them
/// - the node with the largest bounding area is the root, ties broken
///   top-most then left-most
/// - edges point away from the root; components without the root are
///   directed away from their own most prominent node
///
/// # Errors
///
/// Returns [`SketchError::EmptySketch`] when there are no primitives or
/// none of them can become a node.
pub fn infer(primitives: &[Primitive], config: &InferConfig) -> Result<Graph, SketchError> {
    if primitives.is_empty() {
        return Err(SketchError::EmptySketch);
    }
    info!(primitives = primitives.len(); "Inferring graph");

    let containers: Vec<&Primitive> = primitives.iter().filter(|p| p.is_blob()).collect();

    // Text primitive id -> container id
    let mut attachments: Vec<(PrimitiveId, PrimitiveId)> = Vec::new();
    for text in primitives.iter().filter(|p| p.is_text()) {
        let center = text.center();
        let container = nearest(&containers, |container| {
            let d = container.center().distance(center);
            (d <= config.label_distance() || container.bounds().contains(center)).then_some(d)
        });
        if let Some(container) = container {
            trace!(text = text.id(), container = container.id(); "Attached text to container");
            attachments.push((text.id(), container.id()));
        }
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut node_of: Vec<(PrimitiveId, usize)> = Vec::new();
    for primitive in primitives {
        let is_attached_text =
            primitive.is_text() && attachments.iter().any(|&(text, _)| text == primitive.id());
        if !(primitive.is_blob() || primitive.is_text()) || is_attached_text {
            continue;
        }

        let texts: Vec<&Primitive> = if primitive.is_blob() {
            attachments
                .iter()
                .filter(|&&(_, container)| container == primitive.id())
                .filter_map(|&(text, _)| primitives.iter().find(|p| p.id() == text))
                .collect()
        } else {
            vec![primitive]
        };

        node_of.push((primitive.id(), candidates.len()));
        candidates.push(Candidate {
            id: Id::from_index(candidates.len()),
            bounds: primitive.bounds(),
            texts,
        });
    }

    if candidates.is_empty() {
        return Err(SketchError::EmptySketch);
    }

    let mut graph = Graph::new();
    for candidate in &candidates {
        graph.add_node(Node::new(candidate.id, reading_order_label(&candidate.texts)));
    }

    let candidate_of = |container: &Primitive| {
        node_of
            .iter()
            .find(|&&(primitive, _)| primitive == container.id())
            .map(|&(_, idx)| idx)
    };

    let tolerance = config.stroke_tolerance();
    let mut decorations = 0usize;
    // Connections as candidate index pairs, in stroke order
    let mut links: Vec<(usize, usize)> = Vec::new();
    for stroke in primitives.iter().filter(|p| p.is_stroke()) {
        let Some((start, end)) = stroke.endpoints() else {
            continue;
        };
        let touching = |point: Point| {
            nearest(&containers, |container| {
                let d = container.bounds().distance_to(point);
                (d <= tolerance).then_some(d)
            })
        };

        match (touching(start), touching(end)) {
            (Some(a), Some(b)) if a.id() != b.id() => {
                if let (Some(a), Some(b)) = (candidate_of(a), candidate_of(b)) {
                    trace!(stroke = stroke.id(), a:% = candidates[a].id, b:% = candidates[b].id; "Stroke connects containers");
                    if !links.iter().any(|&link| link == (a, b) || link == (b, a)) {
                        links.push((a, b));
                    }
                }
            }
            _ => decorations += 1,
        }
    }

    let priority = by_prominence(&candidates);
    for (source, target) in orient_links(&links, &priority, candidates.len()) {
        // Links are already unique per pair
        let _ = graph.add_edge(candidates[source].id, candidates[target].id);
    }

    let root = priority.first().map(|&idx| candidates[idx].id);
    graph.assign_roles(root);

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        decorations,
        components = graph.components().len();
        "Graph inferred"
    );
    Ok(graph)
}
