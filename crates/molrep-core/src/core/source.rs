use super::models::record::StructureRecord;

/// A finite, length-known stream of structure records.
///
/// Sources are the seam between this library and whatever parses or fetches
/// raw structures. Each call to [`records`](RecordSource::records) must return
/// a fresh iterator positioned at the first record: multi-pass conversions
/// (the voxel extent scan followed by the build) iterate the source more than
/// once, each pass a single forward traversal.
pub trait RecordSource {
    /// Number of records a fresh iterator will yield.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a fresh forward iterator over the records.
    fn records(&self) -> Box<dyn Iterator<Item = StructureRecord> + '_>;
}

impl RecordSource for [StructureRecord] {
    fn len(&self) -> usize {
        <[StructureRecord]>::len(self)
    }

    fn records(&self) -> Box<dyn Iterator<Item = StructureRecord> + '_> {
        Box::new(self.iter().cloned())
    }
}

impl RecordSource for Vec<StructureRecord> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn records(&self) -> Box<dyn Iterator<Item = StructureRecord> + '_> {
        self.as_slice().records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::record::{ProteinMeta, ResolutionFrame};
    use nalgebra::Point3;

    fn record(id: &str) -> StructureRecord {
        let frame = ResolutionFrame::new(
            vec![Point3::new(0.0, 0.0, 0.0)],
            vec!["A".to_string()],
            vec!["X".to_string()],
        )
        .unwrap();
        StructureRecord::new(ProteinMeta::new(id), Some(frame), None).unwrap()
    }

    #[test]
    fn vec_source_is_re_iterable() {
        let source = vec![record("a"), record("b")];
        assert_eq!(RecordSource::len(&source), 2);

        let first: Vec<String> = source.records().map(|r| r.id().to_string()).collect();
        let second: Vec<String> = source.records().map(|r| r.id().to_string()).collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_source_reports_empty() {
        let source: Vec<StructureRecord> = Vec::new();
        assert!(RecordSource::is_empty(&source));
        assert_eq!(source.records().count(), 0);
    }
}
