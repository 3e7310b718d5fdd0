use super::{BuildError, ConfigError, DatasetItem};
use crate::core::encoding;
use crate::core::models::record::{ResolutionFrame, StructureRecord};
use crate::core::models::resolution::Resolution;
use ndarray::{Array3, Array4, s};
use serde::{Deserialize, Serialize};

/// Per-cell label combination rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Aggregation {
    /// Sum the one-hot labels of all points mapped into the cell.
    Sum,
    /// Average the one-hot labels; cells containing no points stay zero.
    #[default]
    Mean,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
        }
    }
}

/// Configuration of the voxel builder.
///
/// `grid` is the dataset-wide target shape and must be resolved before
/// building — either supplied by the caller or computed from an extent scan
/// over the whole record source (see the conversion workflow). Keeping it
/// fixed across items is what makes the resulting tensors stackable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoxelConfig {
    pub resolution: Option<Resolution>,
    pub voxel_size: f64,
    pub grid: Option<[usize; 3]>,
    pub aggregation: Aggregation,
}

impl VoxelConfig {
    pub fn new(voxel_size: f64) -> Self {
        Self {
            resolution: None,
            voxel_size,
            grid: None,
            aggregation: Aggregation::default(),
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_grid(mut self, grid: [usize; 3]) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "voxel_size",
                value: self.voxel_size,
                reason: "the voxel edge length must be a positive finite distance",
            });
        }
        if let Some(grid) = self.grid {
            if grid.contains(&0) {
                return Err(ConfigError::InvalidParameter {
                    name: "grid",
                    value: 0.0,
                    reason: "every grid dimension must be at least one cell",
                });
            }
        }
        Ok(())
    }

    /// Cache directory slug; requires a resolved grid so that datasets built
    /// with different computed grids never collide.
    pub fn dir_slug(&self) -> Result<String, ConfigError> {
        let grid = self.grid.ok_or(ConfigError::MissingParameter("grid"))?;
        let resolution = self.resolution.map_or("auto", |r| r.as_str());
        Ok(format!(
            "{resolution}_size_{}_grid_{}x{}x{}_{}",
            self.voxel_size,
            grid[0],
            grid[1],
            grid[2],
            self.aggregation.as_str()
        ))
    }
}

/// A dense voxel tensor of shape `(grid_x, grid_y, grid_z, label_dim)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelRepresentation {
    pub resolution: Resolution,
    pub voxel_size: f64,
    pub aggregation: Aggregation,
    grid: Array4<f32>,
}

impl VoxelRepresentation {
    pub fn grid(&self) -> &Array4<f32> {
        &self.grid
    }

    /// Tensor shape as `(x, y, z, label_dim)`.
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        self.grid.dim()
    }
}

/// The cell footprint of one record at the configured resolution: the number
/// of cells per axis its rasterization occupies. The scan pass folds this
/// over a whole source to fix the dataset-wide grid.
///
/// # Errors
///
/// Fails on a missing resolution partition or an empty structure.
pub fn cell_extent(record: &StructureRecord, config: &VoxelConfig) -> Result<[usize; 3], BuildError> {
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
    Ok(observed_dims(&cell_indices(frame, config.voxel_size)))
}

/// Builds a voxel tensor from one record.
///
/// The record's points are translated so every axis minimum is zero,
/// floor-divided into cells of `voxel_size`, accumulated as one-hot label
/// distributions, aggregated, and finally fitted to the configured grid.
/// An item whose own extent exceeds the grid is cropped, silently losing
/// boundary cells; with a grid computed by the scan pass this only happens
/// if the source changed between the two passes.
///
/// # Errors
///
/// Fails on configuration violations (including an unresolved grid), a
/// missing resolution partition, an empty structure, or an unknown type
/// symbol.
pub fn build(
    record: StructureRecord,
    config: &VoxelConfig,
) -> Result<DatasetItem<VoxelRepresentation>, BuildError> {
    config.validate()?;
    let grid = config
        .grid
        .ok_or(ConfigError::MissingParameter("grid"))?;
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

    let tokens = encoding::tokenize(frame.types(), resolution)?;
    let label_dim = encoding::alphabet_len(resolution);
    let cells = cell_indices(frame, config.voxel_size);
    let dims = observed_dims(&cells);

    let mut accumulator = Array4::<f32>::zeros((dims[0], dims[1], dims[2], label_dim));
    let mut counts = Array3::<f32>::zeros((dims[0], dims[1], dims[2]));
    for (cell, &token) in cells.iter().zip(&tokens) {
        accumulator[[cell[0], cell[1], cell[2], token as usize]] += 1.0;
        counts[[cell[0], cell[1], cell[2]]] += 1.0;
    }

    if config.aggregation == Aggregation::Mean {
        for ((x, y, z), &count) in counts.indexed_iter() {
            if count > 0.0 {
                accumulator
                    .slice_mut(s![x, y, z, ..])
                    .mapv_inplace(|v| v / count);
            }
        }
    }

    let representation = VoxelRepresentation {
        resolution,
        voxel_size: config.voxel_size,
        aggregation: config.aggregation,
        grid: fit_to_grid(accumulator, grid),
    };
    Ok(DatasetItem::new(representation, record))
}

/// Rasterizes positions into cell indices: translate so each axis minimum is
/// zero, divide by the voxel edge, floor.
fn cell_indices(frame: &ResolutionFrame, voxel_size: f64) -> Vec<[usize; 3]> {
    let positions = frame.positions();
    let mut mins = [f64::INFINITY; 3];
    for p in positions {
        for (axis, &coord) in [p.x, p.y, p.z].iter().enumerate() {
            if coord < mins[axis] {
                mins[axis] = coord;
            }
        }
    }
    positions
        .iter()
        .map(|p| {
            [
                ((p.x - mins[0]) / voxel_size).floor() as usize,
                ((p.y - mins[1]) / voxel_size).floor() as usize,
                ((p.z - mins[2]) / voxel_size).floor() as usize,
            ]
        })
        .collect()
}

fn observed_dims(cells: &[[usize; 3]]) -> [usize; 3] {
    let mut dims = [0usize; 3];
    for cell in cells {
        for axis in 0..3 {
            dims[axis] = dims[axis].max(cell[axis] + 1);
        }
    }
    dims
}

/// Fits an accumulator to the dataset-wide grid along the spatial axes.
///
/// Larger axes are center-cropped, with the extra cell of an odd excess
/// trimmed from the low end; smaller axes are center-padded with zeros, with
/// the extra cell of an odd deficit added at the high end. The two rules
/// mirror each other, so padding then cropping restores the original block.
fn fit_to_grid(accumulator: Array4<f32>, grid: [usize; 3]) -> Array4<f32> {
    let (dx, dy, dz, label_dim) = accumulator.dim();
    let dims = [dx, dy, dz];
    if dims == grid {
        return accumulator;
    }

    let mut src = [0..0, 0..0, 0..0];
    let mut dst = [0..0, 0..0, 0..0];
    for axis in 0..3 {
        let (d, g) = (dims[axis], grid[axis]);
        if d > g {
            let excess = d - g;
            let low = excess - excess / 2;
            src[axis] = low..low + g;
            dst[axis] = 0..g;
        } else {
            let deficit = g - d;
            let low = deficit / 2;
            src[axis] = 0..d;
            dst[axis] = low..low + d;
        }
    }

    let mut fitted = Array4::zeros((grid[0], grid[1], grid[2], label_dim));
    fitted
        .slice_mut(s![dst[0].clone(), dst[1].clone(), dst[2].clone(), ..])
        .assign(&accumulator.slice(s![src[0].clone(), src[1].clone(), src[2].clone(), ..]));
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::record::{ProteinMeta, ResolutionFrame};
    use nalgebra::Point3;

    fn residue_record(id: &str, positions: Vec<Point3<f64>>, types: &[&str]) -> StructureRecord {
        let frame = ResolutionFrame::new(
            positions,
            types.iter().map(|t| t.to_string()).collect(),
            vec!["A".to_string(); types.len()],
        )
        .unwrap();
        StructureRecord::new(ProteinMeta::new(id), Some(frame), None).unwrap()
    }

    fn x_line(n: usize, spacing: f64, types: &[&str]) -> StructureRecord {
        let positions = (0..n)
            .map(|i| Point3::new(i as f64 * spacing, 0.0, 0.0))
            .collect();
        residue_record("line", positions, types)
    }

    #[test]
    fn output_shape_is_grid_plus_label_dim() {
        let config = VoxelConfig::new(1.0).with_grid([4, 4, 4]);
        let item = build(x_line(2, 1.0, &["A", "R"]), &config).unwrap();
        assert_eq!(item.representation.shape(), (4, 4, 4, 20));
    }

    #[test]
    fn sum_aggregation_accumulates_one_hot_labels() {
        // Two points in the same cell, one in the next cell over.
        let record = residue_record(
            "sum",
            vec![
                Point3::new(0.1, 0.0, 0.0),
                Point3::new(0.9, 0.0, 0.0),
                Point3::new(1.5, 0.0, 0.0),
            ],
            &["A", "A", "R"],
        );
        let config = VoxelConfig::new(1.0)
            .with_grid([2, 1, 1])
            .with_aggregation(Aggregation::Sum);
        let item = build(record, &config).unwrap();
        let grid = item.representation.grid();
        assert_eq!(grid[[0, 0, 0, 0]], 2.0);
        assert_eq!(grid[[1, 0, 0, 1]], 1.0);
    }

    #[test]
    fn mean_aggregation_divides_by_cell_count_and_leaves_empty_cells_zero() {
        let record = residue_record(
            "mean",
            vec![Point3::new(0.1, 0.0, 0.0), Point3::new(0.9, 0.0, 0.0)],
            &["A", "R"],
        );
        let config = VoxelConfig::new(1.0).with_grid([3, 1, 1]);
        let item = build(record, &config).unwrap();
        let grid = item.representation.grid();
        // Both points share cell 0: half alanine, half arginine.
        assert_eq!(grid[[0, 0, 0, 0]], 0.5);
        assert_eq!(grid[[0, 0, 0, 1]], 0.5);
        // Cells without points hold zeros, not NaN.
        assert!(grid.slice(s![1.., .., .., ..]).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn rasterization_floors_into_cells() {
        let record = residue_record(
            "floor",
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(9.99, 0.0, 0.0)],
            &["A", "R"],
        );
        let config = VoxelConfig::new(10.0)
            .with_grid([1, 1, 1])
            .with_aggregation(Aggregation::Sum);
        let item = build(record, &config).unwrap();
        // Both land in cell 0; the tensor is exactly one cell wide.
        assert_eq!(item.representation.grid()[[0, 0, 0, 0]], 1.0);
        assert_eq!(item.representation.grid()[[0, 0, 0, 1]], 1.0);
    }

    #[test]
    fn odd_crop_trims_the_extra_cell_from_the_low_end() {
        // Five occupied cells, grid of two: excess 3 removes 2 low + 1 high,
        // keeping cells 2 and 3.
        let item = build(
            x_line(5, 1.0, &["A", "R", "N", "D", "C"]),
            &VoxelConfig::new(1.0)
                .with_grid([2, 1, 1])
                .with_aggregation(Aggregation::Sum),
        )
        .unwrap();
        let grid = item.representation.grid();
        assert_eq!(grid[[0, 0, 0, 2]], 1.0); // "N"
        assert_eq!(grid[[1, 0, 0, 3]], 1.0); // "D"
        assert_eq!(grid.sum(), 2.0);
    }

    #[test]
    fn even_crop_is_symmetric() {
        // Four occupied cells, grid of two: cells 1 and 2 survive.
        let item = build(
            x_line(4, 1.0, &["A", "R", "N", "D"]),
            &VoxelConfig::new(1.0)
                .with_grid([2, 1, 1])
                .with_aggregation(Aggregation::Sum),
        )
        .unwrap();
        let grid = item.representation.grid();
        assert_eq!(grid[[0, 0, 0, 1]], 1.0); // "R"
        assert_eq!(grid[[1, 0, 0, 2]], 1.0); // "N"
    }

    #[test]
    fn odd_pad_adds_the_extra_cell_at_the_high_end() {
        // One occupied cell, grid of four: pad 1 low, 2 high.
        let item = build(
            x_line(1, 1.0, &["A"]),
            &VoxelConfig::new(1.0)
                .with_grid([4, 1, 1])
                .with_aggregation(Aggregation::Sum),
        )
        .unwrap();
        let grid = item.representation.grid();
        assert_eq!(grid[[1, 0, 0, 0]], 1.0);
        assert_eq!(grid.sum(), 1.0);
    }

    #[test]
    fn even_pad_is_symmetric() {
        // One occupied cell, grid of three: centered at index 1.
        let item = build(
            x_line(1, 1.0, &["A"]),
            &VoxelConfig::new(1.0)
                .with_grid([3, 1, 1])
                .with_aggregation(Aggregation::Sum),
        )
        .unwrap();
        assert_eq!(item.representation.grid()[[1, 0, 0, 0]], 1.0);
    }

    #[test]
    fn cell_extent_reports_occupied_cells_per_axis() {
        let record = residue_record(
            "extent",
            vec![Point3::new(-5.0, 0.0, 0.0), Point3::new(5.0, 2.0, 0.0)],
            &["A", "R"],
        );
        let config = VoxelConfig::new(2.0);
        assert_eq!(cell_extent(&record, &config).unwrap(), [6, 2, 1]);
    }

    #[test]
    fn unresolved_grid_is_a_configuration_error() {
        let err = build(x_line(2, 1.0, &["A", "R"]), &VoxelConfig::new(1.0)).unwrap_err();
        assert_eq!(
            err,
            BuildError::Config {
                source: ConfigError::MissingParameter("grid"),
            }
        );
    }

    #[test]
    fn non_positive_voxel_size_is_rejected() {
        let config = VoxelConfig::new(0.0).with_grid([1, 1, 1]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { name: "voxel_size", .. })
        ));
    }

    #[test]
    fn building_twice_is_deterministic() {
        let config = VoxelConfig::new(1.5).with_grid([3, 2, 2]);
        let first = build(x_line(3, 1.0, &["A", "R", "N"]), &config).unwrap();
        let second = build(x_line(3, 1.0, &["A", "R", "N"]), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dir_slug_requires_a_resolved_grid() {
        let config = VoxelConfig::new(10.0).with_resolution(Resolution::Residue);
        assert!(config.dir_slug().is_err());
        assert_eq!(
            config.with_grid([4, 5, 6]).dir_slug().unwrap(),
            "residue_size_10_grid_4x5x6_mean"
        );
    }
}
