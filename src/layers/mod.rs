pub mod layer;
pub mod manager;
pub mod params;

pub use layer::{Layer, LayerId, LayerPayload};
pub use manager::LayerManager;
pub use params::{ParamDescriptor, ParamValue, ParamValues, Params};
