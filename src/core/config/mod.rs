pub mod config;

pub use config::{
    AmbientConfig, AttractionConfig, BeanConfig, BurstConfig, EffectsConfig, PhysicsConfig,
    PopulationConfig, ScrollConfig, ShowerConfig, SpawnRange, TriviaConfig, WindowConfig,
};
