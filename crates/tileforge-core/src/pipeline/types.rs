/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug)]
pub enum PipelineStage {
    LowResWarp,
    LowResMask,
    BasemapCrop,
    Registration,
    BrightnessGains,
    HighResWarp,
    HighResMask,
    Tiling,
    TileTransforms,
    TileMasks,
    TileBrightness,
    ColorTransforms,
    ColorComposite,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowResWarp => write!(f, "Warping channels (low res)"),
            Self::LowResMask => write!(f, "Building low-res mask"),
            Self::BasemapCrop => write!(f, "Cropping basemap"),
            Self::Registration => write!(f, "Registering against basemap"),
            Self::BrightnessGains => write!(f, "Solving brightness gains"),
            Self::HighResWarp => write!(f, "Warping channels (high res)"),
            Self::HighResMask => write!(f, "Building high-res mask"),
            Self::Tiling => write!(f, "Splitting into tiles"),
            Self::TileTransforms => write!(f, "Deriving tile transforms"),
            Self::TileMasks => write!(f, "Building tile masks"),
            Self::TileBrightness => write!(f, "Resampling tile brightness"),
            Self::ColorTransforms => write!(f, "Solving color transforms"),
            Self::ColorComposite => write!(f, "Compositing tile colors"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can drive progress bars or logging; all methods have
/// default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., tile count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// What happened to each tile over one pipeline run.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Tiles that survived the validity filter.
    pub tiles_total: usize,
    /// Tiles still valid after every stage.
    pub tiles_completed: usize,
    /// Keys of tiles invalidated by a failed stage, in grid order.
    pub failed_tiles: Vec<String>,
}
