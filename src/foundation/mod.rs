pub mod color;
pub mod config;
pub mod error;
pub mod math;
pub mod raster;
