/// Events emitted while a conversion runs.
///
/// Stages bracket coarse phases (the voxel extent scan, the conversion
/// pass); item events drive per-record progress bars, with the total known
/// up front from the record source.
#[derive(Debug, Clone)]
pub enum Progress {
    StageStart { name: &'static str },
    StageFinish,

    ItemsStart { total: u64 },
    ItemDone,
    ItemsFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Fans progress events out to an optional caller-supplied callback, so the
/// crate can drive progress display without depending on any particular bar.
/// A reporter without a callback swallows every event.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// A silent reporter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
