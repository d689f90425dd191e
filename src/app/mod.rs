// Application layer - Pipelines and use case interactors

pub mod batch;
pub mod container;
pub mod inspect;
pub mod pipeline;

pub use batch::{BatchReport, BatchRunner, SkippedSource, SourceJob};
pub use container::AppContainer;
pub use inspect::{InspectInteractor, InspectReport};
pub use pipeline::{GpxPipeline, VideoPipeline};
