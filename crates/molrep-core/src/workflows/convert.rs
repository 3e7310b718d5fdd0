use crate::core::contacts::{self, ContactConfig, ContactError, InterfaceMap};
use crate::core::represent::BuildError;
use crate::core::represent::graph::{self, GraphConfig, GraphRepresentation};
use crate::core::represent::point::{self, PointConfig, PointRepresentation};
use crate::core::represent::voxel::{self, VoxelConfig, VoxelRepresentation};
use crate::core::source::RecordSource;
use crate::engine::dataset::ConvertedDataset;
use crate::engine::error::EngineError;
use crate::engine::hooks::PipelineHooks;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::store::ArtifactStore;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Options shared by every conversion entry point: the hook pipeline applied
/// between building and persisting, and a progress sink. Construction
/// parameters live in the builder configs, not here.
pub struct ConvertOptions<'a, R> {
    pub hooks: PipelineHooks<R>,
    pub reporter: ProgressReporter<'a>,
}

impl<R> Default for ConvertOptions<'_, R> {
    fn default() -> Self {
        Self {
            hooks: PipelineHooks::new(),
            reporter: ProgressReporter::new(),
        }
    }
}

/// `<root>/processed/<kind>/<slug>`; the slug encodes every construction
/// parameter, so distinct configurations never share a directory.
fn cache_dir(root: &Path, kind: &str, slug: &str) -> PathBuf {
    root.join("processed").join(kind).join(slug)
}

/// Materializes the source as a graph dataset under `root`, reusing a
/// complete cache built with the same configuration and hooks.
///
/// # Errors
///
/// Fails on an invalid configuration, a record the builder rejects, a hook
/// fingerprint mismatch against an existing cache, or store I/O.
#[instrument(skip_all, name = "graph_conversion")]
pub fn build_graph_dataset<S>(
    source: &S,
    config: &GraphConfig,
    root: impl AsRef<Path>,
    options: &ConvertOptions<'_, GraphRepresentation>,
) -> Result<ConvertedDataset<GraphRepresentation>, EngineError>
where
    S: RecordSource + ?Sized,
{
    let dir = cache_dir(root.as_ref(), "graph", &config.dir_slug());
    info!(path = %dir.display(), records = source.len(), "Materializing graph dataset.");
    let store = ArtifactStore::open(dir)?;
    ConvertedDataset::open_or_build(
        store,
        source,
        |record| graph::build(record, config),
        &options.hooks,
        &options.reporter,
    )
}

/// Materializes the source as a point-set dataset under `root`.
///
/// # Errors
///
/// Same failure modes as [`build_graph_dataset`].
#[instrument(skip_all, name = "point_conversion")]
pub fn build_point_dataset<S>(
    source: &S,
    config: &PointConfig,
    root: impl AsRef<Path>,
    options: &ConvertOptions<'_, PointRepresentation>,
) -> Result<ConvertedDataset<PointRepresentation>, EngineError>
where
    S: RecordSource + ?Sized,
{
    let dir = cache_dir(root.as_ref(), "point", &config.dir_slug());
    info!(path = %dir.display(), records = source.len(), "Materializing point dataset.");
    let store = ArtifactStore::open(dir)?;
    ConvertedDataset::open_or_build(
        store,
        source,
        |record| point::build(record, config),
        &options.hooks,
        &options.reporter,
    )
}

/// Materializes the source as a voxel dataset under `root`.
///
/// When the config leaves the grid unset, a scan pass first folds every
/// record's cell extent into the smallest dataset-wide grid containing all
/// observed cells, so no item at or below the maximum extent loses
/// information; the conversion pass then rasterizes each record and fits it
/// to that grid. Every item of the resulting dataset shares the exact tensor
/// shape `grid + (label_dim,)`.
///
/// # Errors
///
/// Fails on an invalid configuration (including a scan over an empty
/// source), a record either pass rejects, a hook fingerprint mismatch, or
/// store I/O.
#[instrument(skip_all, name = "voxel_conversion")]
pub fn build_voxel_dataset<S>(
    source: &S,
    config: &VoxelConfig,
    root: impl AsRef<Path>,
    options: &ConvertOptions<'_, VoxelRepresentation>,
) -> Result<ConvertedDataset<VoxelRepresentation>, EngineError>
where
    S: RecordSource + ?Sized,
{
    // === Phase 1: Resolve the dataset-wide grid ===
    let resolved = match config.grid {
        Some(_) => *config,
        None => {
            options.reporter.report(Progress::StageStart {
                name: "extent_scan",
            });
            let mut grid = [0usize; 3];
            for record in source.records() {
                let extent = voxel::cell_extent(&record, config)?;
                for axis in 0..3 {
                    grid[axis] = grid[axis].max(extent[axis]);
                }
            }
            options.reporter.report(Progress::StageFinish);
            info!(
                grid_x = grid[0],
                grid_y = grid[1],
                grid_z = grid[2],
                "Computed dataset-wide grid from extent scan."
            );
            config.with_grid(grid)
        }
    };
    resolved.validate().map_err(BuildError::from)?;

    // === Phase 2: Rasterize and persist ===
    let slug = resolved.dir_slug().map_err(BuildError::from)?;
    let dir = cache_dir(root.as_ref(), "voxel", &slug);
    info!(path = %dir.display(), records = source.len(), "Materializing voxel dataset.");
    let store = ArtifactStore::open(dir)?;
    ConvertedDataset::open_or_build(
        store,
        source,
        |record| voxel::build(record, &resolved),
        &options.hooks,
        &options.reporter,
    )
}

/// Computes the interface map of a whole source: every structure's
/// inter-chain residue contacts within the cutoff, keyed by structure id.
/// Structures without inter-chain contacts contribute no entry.
///
/// # Errors
///
/// Fails on an invalid cutoff or a record lacking a residue partition.
#[instrument(skip_all, name = "interface_map")]
pub fn build_interface_map<S>(
    source: &S,
    config: &ContactConfig,
    reporter: &ProgressReporter,
) -> Result<InterfaceMap, ContactError>
where
    S: RecordSource + ?Sized,
{
    reporter.report(Progress::ItemsStart {
        total: source.len() as u64,
    });
    let mut map = InterfaceMap::new();
    for record in source.records() {
        let pairs = contacts::detect(&record, config)?;
        map.insert(record.id(), pairs);
        reporter.report(Progress::ItemDone);
    }
    reporter.report(Progress::ItemsFinish);
    info!(
        structures = map.len(),
        "Interface detection complete."
    );
    Ok(map)
}
