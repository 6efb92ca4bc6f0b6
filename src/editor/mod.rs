//! The editor facade and the types it exchanges with callers.

pub mod events;
pub mod facade;
pub mod source;

pub use events::{EventBus, StateChanged, SubscriptionId};
pub use facade::{EditOptions, ImageEditor, ResizeMode};
pub use source::{ImageMeta, ImageSource};
