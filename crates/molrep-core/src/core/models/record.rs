use super::resolution::Resolution;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RecordError {
    #[error("column '{column}' has {found} entries, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("record '{id}' has no {resolution} partition")]
    MissingResolution { id: String, resolution: Resolution },

    #[error("record '{id}' defines no resolution partitions")]
    NoResolutions { id: String },
}

/// A scalar attribute of the structure-level `protein` partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    Text(String),
    Int(i64),
    Real(f64),
    Flag(bool),
}

/// The structure-level partition of a record: one value per attribute for the
/// whole structure (identifier, sequence, dataset-specific annotations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinMeta {
    pub id: String,
    pub attributes: BTreeMap<String, MetaValue>,
}

impl ProteinMeta {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: MetaValue) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }
}

/// One resolution partition of a record: same-length columns describing every
/// element (residue or atom) of the structure at that granularity.
///
/// The column-length invariant is established at construction and preserved by
/// every mutator; consumers may index any column with positions taken from
/// another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionFrame {
    positions: Vec<Point3<f64>>,         // x, y, z per element
    types: Vec<String>,                  // categorical type symbol per element
    chain_ids: Vec<String>,              // parent chain identifier per element
    scalars: BTreeMap<String, Vec<f64>>, // optional named per-element columns
}

impl ResolutionFrame {
    /// Creates a frame from its three mandatory columns.
    ///
    /// # Arguments
    ///
    /// * `positions` - 3D coordinates, one per element.
    /// * `types` - Categorical type symbol per element (single-letter residue
    ///   code at residue resolution, atom name at atom resolution).
    /// * `chain_ids` - Parent chain identifier per element.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::ColumnLengthMismatch` if `types` or `chain_ids`
    /// disagree with the position count.
    pub fn new(
        positions: Vec<Point3<f64>>,
        types: Vec<String>,
        chain_ids: Vec<String>,
    ) -> Result<Self, RecordError> {
        let expected = positions.len();
        check_column_len("types", expected, types.len())?;
        check_column_len("chain_ids", expected, chain_ids.len())?;
        Ok(Self {
            positions,
            types,
            chain_ids,
            scalars: BTreeMap::new(),
        })
    }

    /// Attaches a named per-element scalar column, replacing any previous
    /// column of the same name.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::ColumnLengthMismatch` if the column length does
    /// not match the element count.
    pub fn attach_scalar(&mut self, name: &str, values: Vec<f64>) -> Result<(), RecordError> {
        check_column_len(name, self.positions.len(), values.len())?;
        self.scalars.insert(name.to_string(), values);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn chain_ids(&self) -> &[String] {
        &self.chain_ids
    }

    pub fn scalar(&self, name: &str) -> Option<&[f64]> {
        self.scalars.get(name).map(Vec::as_slice)
    }
}

fn check_column_len(column: &str, expected: usize, found: usize) -> Result<(), RecordError> {
    if expected != found {
        return Err(RecordError::ColumnLengthMismatch {
            column: column.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// A complete structure record: the `protein` partition plus one or both
/// resolution partitions.
///
/// Records are the unit of work for representation builders and the contact
/// detector. Builders never mutate the record they consume; the only sanctioned
/// mutation is attaching annotation columns (e.g. interface flags) before a
/// record enters a builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub meta: ProteinMeta,
    residue: Option<ResolutionFrame>,
    atom: Option<ResolutionFrame>,
}

impl StructureRecord {
    /// Assembles a record from its partitions.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NoResolutions` if both resolution partitions are
    /// absent; every record must be addressable at some granularity.
    pub fn new(
        meta: ProteinMeta,
        residue: Option<ResolutionFrame>,
        atom: Option<ResolutionFrame>,
    ) -> Result<Self, RecordError> {
        if residue.is_none() && atom.is_none() {
            return Err(RecordError::NoResolutions { id: meta.id });
        }
        Ok(Self {
            meta,
            residue,
            atom,
        })
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn has_resolution(&self, resolution: Resolution) -> bool {
        match resolution {
            Resolution::Residue => self.residue.is_some(),
            Resolution::Atom => self.atom.is_some(),
        }
    }

    /// The resolution a builder falls back to when none is configured: `atom`
    /// if that partition is present, otherwise `residue`.
    pub fn default_resolution(&self) -> Resolution {
        if self.atom.is_some() {
            Resolution::Atom
        } else {
            Resolution::Residue
        }
    }

    /// Borrows the partition at the requested resolution.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::MissingResolution` (carrying the record id) if
    /// the partition is absent.
    pub fn frame(&self, resolution: Resolution) -> Result<&ResolutionFrame, RecordError> {
        let frame = match resolution {
            Resolution::Residue => self.residue.as_ref(),
            Resolution::Atom => self.atom.as_ref(),
        };
        frame.ok_or_else(|| RecordError::MissingResolution {
            id: self.meta.id.clone(),
            resolution,
        })
    }

    /// Attaches a named scalar column to the partition at `resolution`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::MissingResolution` if the partition is absent, or
    /// `RecordError::ColumnLengthMismatch` if the column length is wrong.
    pub fn attach_scalar(
        &mut self,
        resolution: Resolution,
        name: &str,
        values: Vec<f64>,
    ) -> Result<(), RecordError> {
        let frame = match resolution {
            Resolution::Residue => self.residue.as_mut(),
            Resolution::Atom => self.atom.as_mut(),
        };
        let frame = frame.ok_or_else(|| RecordError::MissingResolution {
            id: self.meta.id.clone(),
            resolution,
        })?;
        frame.attach_scalar(name, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: usize) -> ResolutionFrame {
        let positions = (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let types = vec!["A".to_string(); n];
        let chain_ids = vec!["X".to_string(); n];
        ResolutionFrame::new(positions, types, chain_ids).unwrap()
    }

    #[test]
    fn frame_rejects_mismatched_columns() {
        let positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let err = ResolutionFrame::new(positions, vec!["A".to_string()], vec!["X".to_string()])
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::ColumnLengthMismatch {
                column: "types".to_string(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn attach_scalar_validates_length() {
        let mut f = frame(3);
        assert!(f.attach_scalar("b_factor", vec![1.0, 2.0, 3.0]).is_ok());
        assert_eq!(f.scalar("b_factor"), Some([1.0, 2.0, 3.0].as_slice()));
        assert!(f.attach_scalar("b_factor", vec![1.0]).is_err());
    }

    #[test]
    fn record_requires_at_least_one_partition() {
        let err = StructureRecord::new(ProteinMeta::new("1abc"), None, None).unwrap_err();
        assert_eq!(
            err,
            RecordError::NoResolutions {
                id: "1abc".to_string()
            }
        );
    }

    #[test]
    fn default_resolution_prefers_atom() {
        let both =
            StructureRecord::new(ProteinMeta::new("1abc"), Some(frame(2)), Some(frame(5))).unwrap();
        assert_eq!(both.default_resolution(), Resolution::Atom);

        let residue_only =
            StructureRecord::new(ProteinMeta::new("1abc"), Some(frame(2)), None).unwrap();
        assert_eq!(residue_only.default_resolution(), Resolution::Residue);
    }

    #[test]
    fn missing_frame_error_carries_record_id() {
        let record = StructureRecord::new(ProteinMeta::new("1abc"), Some(frame(2)), None).unwrap();
        let err = record.frame(Resolution::Atom).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingResolution {
                id: "1abc".to_string(),
                resolution: Resolution::Atom,
            }
        );
    }

    #[test]
    fn attach_scalar_reaches_the_requested_partition() {
        let mut record =
            StructureRecord::new(ProteinMeta::new("1abc"), Some(frame(2)), None).unwrap();
        record
            .attach_scalar(Resolution::Residue, "is_interface", vec![1.0, 0.0])
            .unwrap();
        let frame = record.frame(Resolution::Residue).unwrap();
        assert_eq!(frame.scalar("is_interface"), Some([1.0, 0.0].as_slice()));
    }

    #[test]
    fn meta_attributes_round_trip() {
        let meta = ProteinMeta::new("1abc")
            .with_attribute("sequence", MetaValue::Text("ARN".to_string()))
            .with_attribute("num_chains", MetaValue::Int(2));
        assert_eq!(
            meta.attributes.get("num_chains"),
            Some(&MetaValue::Int(2))
        );
    }
}
