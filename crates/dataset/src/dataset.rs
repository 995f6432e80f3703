use std::collections::BTreeMap;
use std::fmt;

use crate::record::{FloatId, FloatRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    DuplicateId(FloatId),
    Source(String),
    Export(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::DuplicateId(id) => write!(f, "duplicate float id {id}"),
            DatasetError::Source(msg) => write!(f, "float source failed: {msg}"),
            DatasetError::Export(msg) => write!(f, "export failed: {msg}"),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Immutable collection of float records for one session.
///
/// Record order is preserved from the source; lookups by id go through a
/// sorted index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatDataset {
    records: Vec<FloatRecord>,
    by_id: BTreeMap<FloatId, usize>,
}

impl FloatDataset {
    pub fn from_records(records: Vec<FloatRecord>) -> Result<Self, DatasetError> {
        let mut by_id = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            if by_id.insert(record.id.clone(), idx).is_some() {
                return Err(DatasetError::DuplicateId(record.id.clone()));
            }
        }
        Ok(Self { records, by_id })
    }

    pub fn records(&self) -> &[FloatRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &FloatId) -> Option<&FloatRecord> {
        self.by_id.get(id).map(|idx| &self.records[*idx])
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetError, FloatDataset};
    use crate::record::tests::record;
    use crate::record::{FloatId, QcFlag};

    #[test]
    fn rejects_duplicate_ids() {
        let err = FloatDataset::from_records(vec![
            record("argo_1", QcFlag::Good, 100),
            record("argo_1", QcFlag::Bad, 200),
        ])
        .unwrap_err();
        assert_eq!(err, DatasetError::DuplicateId(FloatId::new("argo_1")));
    }

    #[test]
    fn lookup_by_id_preserves_order() {
        let ds = FloatDataset::from_records(vec![
            record("argo_2", QcFlag::Good, 100),
            record("argo_1", QcFlag::Bad, 200),
        ])
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].id, FloatId::new("argo_2"));
        assert_eq!(ds.get(&FloatId::new("argo_1")).map(|r| r.depth_m), Some(200));
        assert!(ds.get(&FloatId::new("argo_9")).is_none());
    }

    #[test]
    fn empty_dataset_is_valid() {
        let ds = FloatDataset::from_records(Vec::new()).unwrap();
        assert!(ds.is_empty());
    }
}
