pub mod app;
pub mod core;
pub mod debug;
pub mod gameplay;
pub mod interaction;
pub mod rendering;
pub mod simulation;

// Curated re-exports
pub use crate::app::game::GamePlugin;
pub use crate::core::config::{BeanConfig, WindowConfig};
pub use crate::simulation::{
    Bean, BeanCategory, BeanId, BeanSimulation, BeanSurface, CancelToken, CategoryWeights,
    FillLevel, RecordingSurface, TransientFlag,
};
