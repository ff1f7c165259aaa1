//! Central system ordering labels to make the per-frame sequence explicit.
//! Stages (high-level):
//! 1. Input (pointer, clicks, wheel, tilt, debug triggers)
//! 2. Timers (virtual clock advance, staggered and ambient spawns)
//! 3. Physics (one step over every bean)
//! 4. Present (surface commands turned into entities and readouts)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum SimulationSet {
    Input,
    Timers,
    Physics,
    Present,
}

impl SimulationSet {
    /// Chains the four stages in the `Update` schedule.
    pub fn configure(app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimulationSet::Input,
                SimulationSet::Timers,
                SimulationSet::Physics,
                SimulationSet::Present,
            )
                .chain(),
        );
    }
}
