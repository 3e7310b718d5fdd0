//! Spatial index adapter for neighbor queries over one record's coordinates.
//!
//! Wraps a k-d tree built once per record and never mutated. Both adjacency
//! strategies (k-nearest and radius) go through this adapter so builders and
//! the contact detector share identical geometry semantics: self-matches are
//! excluded from neighbor lists, radius queries are inclusive of the boundary,
//! and results are ordered by (distance, index) so identical inputs always
//! produce identical output.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SpatialError {
    #[error("cannot build a spatial index over an empty point set")]
    EmptyPointSet,
}

/// Adjacency construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NeighborMode {
    /// Connect each point to its `k` nearest neighbors (`k` is clamped to
    /// `N - 1` for structures with too few points).
    Knn { k: usize },
    /// Connect all pairs within `radius` (inclusive). Isolated points are
    /// legal.
    Radius { radius: f64 },
}

/// One query result: the matched point's index and its Euclidean distance
/// from the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// An immutable k-d tree over the positions of one record resolution.
pub struct SpatialIndex {
    tree: KdTree<f64, 3>,
    points: Vec<[f64; 3]>,
}

impl SpatialIndex {
    /// Builds the index from a position column.
    ///
    /// # Errors
    ///
    /// Returns `SpatialError::EmptyPointSet` if `positions` is empty. A single
    /// point is legal and yields empty neighbor lists.
    pub fn build(positions: &[Point3<f64>]) -> Result<Self, SpatialError> {
        if positions.is_empty() {
            return Err(SpatialError::EmptyPointSet);
        }
        let points: Vec<[f64; 3]> = positions.iter().map(|p| [p.x, p.y, p.z]).collect();
        let tree: KdTree<f64, 3> = (&points).into();
        Ok(Self { tree, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Neighbors of the indexed point under the given mode, self excluded.
    pub fn neighbors_of(&self, index: usize, mode: NeighborMode) -> Vec<Neighbor> {
        match mode {
            NeighborMode::Knn { k } => self.k_nearest_of(index, k),
            NeighborMode::Radius { radius } => {
                let mut neighbors = self.within(&self.points[index], radius);
                neighbors.retain(|n| n.index != index);
                neighbors
            }
        }
    }

    /// The `k` nearest neighbors of the indexed point, self excluded, with
    /// `k` clamped to `len() - 1`.
    pub fn k_nearest_of(&self, index: usize, k: usize) -> Vec<Neighbor> {
        let effective_k = k.min(self.len() - 1);
        if effective_k == 0 {
            return Vec::new();
        }

        // Query one extra result so the self-match can be dropped.
        let qty = (effective_k + 1).min(self.len());
        let query = &self.points[index];
        let mut neighbors: Vec<Neighbor> = self
            .tree
            .nearest_n::<SquaredEuclidean>(query, qty)
            .into_iter()
            .filter(|n| n.item as usize != index)
            .map(|n| Neighbor {
                index: n.item as usize,
                distance: n.distance.sqrt(),
            })
            .collect();
        sort_neighbors(&mut neighbors);
        neighbors.truncate(effective_k);
        neighbors
    }

    /// All indexed points within `radius` (inclusive) of an arbitrary query
    /// position. The query point itself is reported if it is part of the
    /// index; callers filter as needed.
    pub fn within(&self, query: &[f64; 3], radius: f64) -> Vec<Neighbor> {
        let bound = radius * radius;
        // Pad the tree query, then re-check against exact arithmetic: the
        // inclusive-boundary contract must not depend on k-d internals.
        let padded = bound * (1.0 + 1e-9) + f64::MIN_POSITIVE;
        let mut neighbors: Vec<Neighbor> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(query, padded)
            .into_iter()
            .filter_map(|n| {
                let index = n.item as usize;
                let exact = squared_distance(query, &self.points[index]);
                (exact <= bound).then(|| Neighbor {
                    index,
                    distance: exact.sqrt(),
                })
            })
            .collect();
        sort_neighbors(&mut neighbors);
        neighbors
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

fn sort_neighbors(neighbors: &mut [Neighbor]) {
    neighbors.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, spacing: f64) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| Point3::new(i as f64 * spacing, 0.0, 0.0))
            .collect()
    }

    #[test]
    fn empty_point_set_is_an_error() {
        assert_eq!(
            SpatialIndex::build(&[]).err(),
            Some(SpatialError::EmptyPointSet)
        );
    }

    #[test]
    fn single_point_has_no_neighbors() {
        let index = SpatialIndex::build(&line(1, 1.0)).unwrap();
        assert!(index.neighbors_of(0, NeighborMode::Knn { k: 5 }).is_empty());
        assert!(
            index
                .neighbors_of(0, NeighborMode::Radius { radius: 10.0 })
                .is_empty()
        );
    }

    #[test]
    fn k_is_clamped_to_point_count_minus_one() {
        let index = SpatialIndex::build(&line(3, 1.0)).unwrap();
        for i in 0..3 {
            let neighbors = index.k_nearest_of(i, 10);
            assert_eq!(neighbors.len(), 2, "point {i}");
            assert!(neighbors.iter().all(|n| n.index != i));
        }
    }

    #[test]
    fn k_nearest_is_sorted_by_distance() {
        let index = SpatialIndex::build(&line(4, 2.0)).unwrap();
        let neighbors = index.k_nearest_of(0, 3);
        assert_eq!(
            neighbors.iter().map(|n| n.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            neighbors.iter().map(|n| n.distance).collect::<Vec<_>>(),
            vec![2.0, 4.0, 6.0]
        );
    }

    #[test]
    fn radius_query_includes_the_boundary() {
        let index = SpatialIndex::build(&line(3, 6.0)).unwrap();
        let neighbors = index.neighbors_of(0, NeighborMode::Radius { radius: 6.0 });
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].index, 1);
        assert_eq!(neighbors[0].distance, 6.0);
    }

    #[test]
    fn radius_query_excludes_points_past_the_boundary() {
        let index = SpatialIndex::build(&line(3, 6.0)).unwrap();
        let neighbors = index.within(&[0.0, 0.0, 0.0], 5.999);
        assert_eq!(neighbors.len(), 1); // only the query point itself
        assert_eq!(neighbors[0].index, 0);
    }

    #[test]
    fn coincident_points_are_distance_zero_neighbors() {
        let positions = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0)];
        let index = SpatialIndex::build(&positions).unwrap();
        let neighbors = index.k_nearest_of(0, 1);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].index, 1);
        assert_eq!(neighbors[0].distance, 0.0);
    }

    #[test]
    fn isolated_point_yields_empty_radius_row() {
        let mut positions = line(2, 1.0);
        positions.push(Point3::new(100.0, 0.0, 0.0));
        let index = SpatialIndex::build(&positions).unwrap();
        assert!(
            index
                .neighbors_of(2, NeighborMode::Radius { radius: 5.0 })
                .is_empty()
        );
    }
}
