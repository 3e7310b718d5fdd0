use super::error::EngineError;
use super::fingerprint::Fingerprint;
use super::hooks::PipelineHooks;
use super::progress::{Progress, ProgressReporter};
use super::store::ArtifactStore;
use crate::core::models::record::StructureRecord;
use crate::core::represent::{BuildError, DatasetItem};
use crate::core::source::RecordSource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Records built per fan-out chunk before persistence catches up.
const BUILD_CHUNK: usize = 64;

/// A transform applied to items as they are served, leaving the persisted
/// artifacts untouched.
pub type RuntimeTransform<R> = Box<dyn Fn(DatasetItem<R>) -> DatasetItem<R> + Send + Sync>;

/// A memoized representation dataset backed by an [`ArtifactStore`].
///
/// Construction either reuses a complete store or converts the record source
/// from scratch; in both cases the requested hook fingerprint must match the
/// persisted one. Items are immutable once the markers exist, so a handle may
/// be shared freely across threads for reading.
pub struct ConvertedDataset<R> {
    store: ArtifactStore,
    len: usize,
    fingerprint: Fingerprint,
    runtime_transform: Option<RuntimeTransform<R>>,
}

impl<R> std::fmt::Debug for ConvertedDataset<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertedDataset")
            .field("store", &self.store)
            .field("len", &self.len)
            .field("fingerprint", &self.fingerprint)
            .field(
                "runtime_transform",
                &self.runtime_transform.as_ref().map(|_| "<fn>"),
            )
            .finish()
    }
}

impl<R> ConvertedDataset<R>
where
    R: Serialize + DeserializeOwned + Send,
{
    /// Opens the dataset at `store`, converting the source if no complete
    /// cache exists yet.
    ///
    /// A fresh conversion iterates the source once in order, builds each
    /// record through `build` (fanned out over a thread pool under the
    /// `parallel` feature), applies the hooks, and persists surviving items
    /// under consecutive integer keys — persisted index is post-filter order.
    /// The end-of-build markers are written only after every item succeeded,
    /// so an aborted conversion is invisible to later constructions and gets
    /// rebuilt from scratch.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InconsistentCache` when a complete store was
    /// built with different hook tags, `EngineError::Build` when a record
    /// fails its builder, and I/O or codec errors from the store itself.
    #[instrument(skip_all, name = "dataset_conversion")]
    pub fn open_or_build<S, F>(
        store: ArtifactStore,
        source: &S,
        build: F,
        hooks: &PipelineHooks<R>,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError>
    where
        S: RecordSource + ?Sized,
        F: Fn(StructureRecord) -> Result<DatasetItem<R>, BuildError> + Sync,
    {
        let requested = hooks.fingerprint();
        if store.is_complete() {
            let (len, stored) = store.read_markers()?;
            if stored != requested {
                return Err(EngineError::InconsistentCache {
                    path: store.dir().to_string_lossy().to_string(),
                    stored: stored.to_string(),
                    requested: requested.to_string(),
                });
            }
            info!(items = len, "Reusing complete cache.");
            return Ok(Self {
                store,
                len,
                fingerprint: stored,
                runtime_transform: None,
            });
        }

        debug!(records = source.len(), "No complete cache found; converting.");
        reporter.report(Progress::StageStart { name: "conversion" });
        reporter.report(Progress::ItemsStart {
            total: source.len() as u64,
        });

        let mut records = source.records();
        let mut next_index = 0usize;
        loop {
            let chunk: Vec<StructureRecord> = records.by_ref().take(BUILD_CHUNK).collect();
            if chunk.is_empty() {
                break;
            }

            #[cfg(not(feature = "parallel"))]
            let built: Vec<Result<DatasetItem<R>, BuildError>> =
                chunk.into_iter().map(&build).collect();

            #[cfg(feature = "parallel")]
            let built: Vec<Result<DatasetItem<R>, BuildError>> =
                chunk.into_par_iter().map(&build).collect();

            // Persistence stays single-threaded and in source order so the
            // integer keys are deterministic.
            for result in built {
                let item = result?;
                if let Some(item) = hooks.apply(item) {
                    store.write_item(next_index, &item)?;
                    next_index += 1;
                }
                reporter.report(Progress::ItemDone);
            }
        }

        store.write_markers(next_index, &requested)?;
        reporter.report(Progress::ItemsFinish);
        reporter.report(Progress::StageFinish);
        info!(items = next_index, "Conversion complete; markers written.");

        Ok(Self {
            store,
            len: next_index,
            fingerprint: requested,
            runtime_transform: None,
        })
    }

    /// Installs a transform applied to every item as it is served. The
    /// persisted artifacts are not rewritten.
    pub fn with_runtime_transform(mut self, transform: RuntimeTransform<R>) -> Self {
        self.runtime_transform = Some(transform);
        self
    }

    /// Number of persisted items.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The hook fingerprint this dataset was built (or validated) with.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Loads the item at `index`, applying the runtime transform if one is
    /// installed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::IndexOutOfRange` past the end, or a store error
    /// when the item file is missing or corrupt.
    pub fn get(&self, index: usize) -> Result<DatasetItem<R>, EngineError> {
        if index >= self.len {
            return Err(EngineError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let item: DatasetItem<R> = self.store.read_item(index)?;
        Ok(match &self.runtime_transform {
            Some(transform) => transform(item),
            None => item,
        })
    }

    /// Element-wise broadcast of [`get`](Self::get) over a slice of indices.
    pub fn get_many(&self, indices: &[usize]) -> Result<Vec<DatasetItem<R>>, EngineError> {
        indices.iter().map(|&index| self.get(index)).collect()
    }

    /// Sequential access over all persisted items in key order.
    pub fn iter(&self) -> impl Iterator<Item = Result<DatasetItem<R>, EngineError>> + '_ {
        (0..self.len).map(|index| self.get(index))
    }
}
