use super::{BuildError, DatasetItem};
use crate::core::encoding;
use crate::core::models::record::StructureRecord;
use crate::core::models::resolution::Resolution;
use nalgebra::Point3;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Configuration of the point-set builder. `resolution: None` defers to each
/// record's default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointConfig {
    pub resolution: Option<Resolution>,
}

impl PointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn dir_slug(&self) -> String {
        self.resolution.map_or("auto", |r| r.as_str()).to_string()
    }
}

/// A raw point set: one position and one integer label per element. Items of
/// a dataset vary in length; there is no shared-size invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRepresentation {
    pub resolution: Resolution,
    positions: Vec<Point3<f64>>,
    labels: Vec<u32>,
}

impl PointRepresentation {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Dense `(N, 4)` export: three coordinate columns plus the label as the
    /// fourth column.
    pub fn rows(&self) -> Array2<f64> {
        let mut rows = Array2::zeros((self.len(), 4));
        for (i, (position, &label)) in self.positions.iter().zip(&self.labels).enumerate() {
            rows[[i, 0]] = position.x;
            rows[[i, 1]] = position.y;
            rows[[i, 2]] = position.z;
            rows[[i, 3]] = f64::from(label);
        }
        rows
    }
}

/// Builds a point set from one record.
///
/// # Errors
///
/// Fails on a missing resolution partition, an empty structure, or an unknown
/// type symbol.
pub fn build(
    record: StructureRecord,
    config: &PointConfig,
) -> Result<DatasetItem<PointRepresentation>, BuildError> {
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

    let labels = encoding::tokenize(frame.types(), resolution)?;
    let representation = PointRepresentation {
        resolution,
        positions: frame.positions().to_vec(),
        labels,
    };
    Ok(DatasetItem::new(representation, record))
}
