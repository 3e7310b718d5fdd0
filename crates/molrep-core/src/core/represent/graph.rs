use super::{BuildError, ConfigError, DatasetItem};
use crate::core::encoding;
use crate::core::models::record::StructureRecord;
use crate::core::models::resolution::Resolution;
use crate::core::spatial::{NeighborMode, SpatialIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Edge value semantics of a constructed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeWeighting {
    /// Binary edges; every edge carries the constant 1.
    #[default]
    Connectivity,
    /// Edges carry the Euclidean distance between their endpoints.
    Distance,
}

/// Configuration of the graph builder.
///
/// `resolution: None` defers to each record's default (`atom` if present,
/// else `residue`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub resolution: Option<Resolution>,
    pub mode: NeighborMode,
    pub weighting: EdgeWeighting,
}

impl GraphConfig {
    /// k-nearest-neighbor adjacency with `k` neighbors per node.
    pub fn knn(k: usize) -> Self {
        Self {
            resolution: None,
            mode: NeighborMode::Knn { k },
            weighting: EdgeWeighting::default(),
        }
    }

    /// Radius-ball adjacency connecting all pairs within `radius`.
    pub fn radius(radius: f64) -> Self {
        Self {
            resolution: None,
            mode: NeighborMode::Radius { radius },
            weighting: EdgeWeighting::default(),
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_weighting(mut self, weighting: EdgeWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            NeighborMode::Knn { k } if k == 0 => Err(ConfigError::InvalidParameter {
                name: "k",
                value: 0.0,
                reason: "a k-nearest-neighbor graph needs at least one neighbor",
            }),
            NeighborMode::Radius { radius } if !radius.is_finite() || radius <= 0.0 => {
                Err(ConfigError::InvalidParameter {
                    name: "radius",
                    value: radius,
                    reason: "the neighbor radius must be a positive finite distance",
                })
            }
            _ => Ok(()),
        }
    }

    /// Cache directory slug encoding every construction parameter, so
    /// distinct configurations never collide on disk.
    pub fn dir_slug(&self) -> String {
        let resolution = self.resolution.map_or("auto", |r| r.as_str());
        let mut slug = match self.mode {
            NeighborMode::Knn { k } => format!("{resolution}_knn_{k}"),
            NeighborMode::Radius { radius } => format!("{resolution}_eps_{radius}"),
        };
        if self.weighting == EdgeWeighting::Distance {
            slug.push_str("_weighted");
        }
        slug
    }
}

/// A labeled graph over one record resolution.
///
/// Edges are stored once in canonical (low index, high index) order, sorted
/// and deduplicated; [`symmetric_edges`](Self::symmetric_edges) reconstructs
/// the symmetric adjacency. Node count equals token count equals the
/// record's coordinate rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRepresentation {
    pub resolution: Resolution,
    pub weighting: EdgeWeighting,
    pub node_tokens: Vec<u32>,
    edges: Vec<(usize, usize)>,
    weights: Vec<f64>,
}

impl GraphRepresentation {
    pub fn node_count(&self) -> usize {
        self.node_tokens.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Canonical undirected edge list, each pair reported once as
    /// (low index, high index).
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Edge values parallel to [`edges`](Self::edges): Euclidean distances
    /// under `Distance` weighting, the constant 1 otherwise.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Both orientations of every edge, for consumers that expect a
    /// symmetric sparse adjacency.
    pub fn symmetric_edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.edges
            .iter()
            .zip(&self.weights)
            .flat_map(|(&(a, b), &w)| [(a, b, w), (b, a, w)])
    }
}

/// Builds a labeled graph from one record.
///
/// # Arguments
///
/// * `record` - The structure record to convert; ownership moves into the
///   returned item.
/// * `config` - Resolution choice, adjacency mode, and edge weighting.
///
/// # Return
///
/// The graph paired with the originating record.
///
/// # Errors
///
/// Configuration violations, a missing resolution partition, an empty
/// structure, or an unknown type symbol fail the build; too-few-points for
/// `k` and isolated radius nodes are recovered locally and never error.
pub fn build(
    record: StructureRecord,
    config: &GraphConfig,
) -> Result<DatasetItem<GraphRepresentation>, BuildError> {
    config.validate()?;
    let resolution = config
        .resolution
        .unwrap_or_else(|| record.default_resolution());
    let frame = record.frame(resolution)?;
    if frame.is_empty() {
        return Err(BuildError::EmptyStructure {
            id: record.id().to_string(),
            resolution,
        });
    }

    let node_tokens = encoding::tokenize(frame.types(), resolution)?;
    let index = SpatialIndex::build(frame.positions())?;

    // Union of per-node neighbor sets, keyed canonically so each undirected
    // edge appears once. BTreeMap keeps the edge order deterministic.
    let mut adjacency: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for node in 0..index.len() {
        for neighbor in index.neighbors_of(node, config.mode) {
            let key = if node < neighbor.index {
                (node, neighbor.index)
            } else {
                (neighbor.index, node)
            };
            adjacency.entry(key).or_insert(neighbor.distance);
        }
    }

    let mut edges = Vec::with_capacity(adjacency.len());
    let mut weights = Vec::with_capacity(adjacency.len());
    for ((a, b), distance) in adjacency {
        edges.push((a, b));
        weights.push(match config.weighting {
            EdgeWeighting::Connectivity => 1.0,
            EdgeWeighting::Distance => distance,
        });
    }

    let representation = GraphRepresentation {
        resolution,
        weighting: config.weighting,
        node_tokens,
        edges,
        weights,
    };
    Ok(DatasetItem::new(representation, record))
}
