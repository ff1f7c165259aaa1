pub mod simulation;
pub mod triggers;

pub use simulation::{AmbientHandle, BeanSim, BeanSimPlugin, SurfaceOutbox};
pub use triggers::{SimulationCommand, TriggerBreak, TriggerExplosion};
