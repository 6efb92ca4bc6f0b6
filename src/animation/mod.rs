pub mod ease;
pub mod generator;

pub use ease::Ease;
pub use generator::{AnimationSpec, AnimationTarget, generate};
