use super::fingerprint::Fingerprint;
use crate::core::represent::DatasetItem;

/// Decides whether a built item enters the persisted dataset.
///
/// `tag()` is the filter's stable identity for cache fingerprinting; change
/// the tag whenever the predicate's meaning changes, or stale caches will be
/// accepted as this filter's output.
pub trait ItemFilter<R>: Send + Sync {
    fn tag(&self) -> &str;
    fn keep(&self, item: &DatasetItem<R>) -> bool;
}

/// Rewrites a built item before it is persisted.
///
/// Same tagging contract as [`ItemFilter`].
pub trait ItemTransform<R>: Send + Sync {
    fn tag(&self) -> &str;
    fn apply(&self, item: DatasetItem<R>) -> DatasetItem<R>;
}

/// The optional hook pair applied between building and persisting an item.
/// The filter runs first; only kept items are transformed.
#[derive(Default)]
pub struct PipelineHooks<R> {
    pre_filter: Option<Box<dyn ItemFilter<R>>>,
    pre_transform: Option<Box<dyn ItemTransform<R>>>,
}

impl<R> PipelineHooks<R> {
    pub fn new() -> Self {
        Self {
            pre_filter: None,
            pre_transform: None,
        }
    }

    pub fn with_pre_filter(mut self, filter: Box<dyn ItemFilter<R>>) -> Self {
        self.pre_filter = Some(filter);
        self
    }

    pub fn with_pre_transform(mut self, transform: Box<dyn ItemTransform<R>>) -> Self {
        self.pre_transform = Some(transform);
        self
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_tags(
            self.pre_transform.as_deref().map(ItemTransform::tag),
            self.pre_filter.as_deref().map(ItemFilter::tag),
        )
    }

    /// Runs the pair on one item; `None` means the filter rejected it.
    pub fn apply(&self, item: DatasetItem<R>) -> Option<DatasetItem<R>> {
        if let Some(filter) = &self.pre_filter {
            if !filter.keep(&item) {
                return None;
            }
        }
        Some(match &self.pre_transform {
            Some(transform) => transform.apply(item),
            None => item,
        })
    }
}
