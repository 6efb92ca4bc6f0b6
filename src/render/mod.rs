//! Composition and render scheduling.

pub mod base_cache;
pub mod compose;
pub mod scheduler;
pub mod worker;

pub use base_cache::BaseImageCache;
pub use compose::compose;
pub use scheduler::{RenderRequest, RenderScheduler, RenderStats, SchedulerConfig};
pub use worker::{RenderJob, RenderResponse, RenderWorker};
