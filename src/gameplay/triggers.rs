//! Event surface for driving the simulation from other plugins (debug keys, tests,
//! headless runs).

use bevy::prelude::*;

use super::simulation::{AmbientHandle, BeanSim};

/// Shower across the top edge.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct TriggerBreak;

/// Burst at `position` (page coordinates) or at the viewport centre.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct TriggerExplosion {
    pub position: Option<Vec2>,
    pub count: Option<u32>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationCommand {
    Start,
    Stop,
    /// Start when stopped, stop when running.
    Toggle,
    Reset,
    Dispose,
    /// Cancel the ambient loop, or start a fresh one when none is running.
    ToggleAmbient,
}

pub fn handle_triggers(
    mut commands: Commands,
    mut breaks: EventReader<TriggerBreak>,
    mut explosions: EventReader<TriggerExplosion>,
    mut sim_commands: EventReader<SimulationCommand>,
    mut sim: ResMut<BeanSim>,
    ambient: Option<Res<AmbientHandle>>,
) {
    for _ in breaks.read() {
        sim.trigger_break();
    }
    for ev in explosions.read() {
        match (ev.position, ev.count) {
            (None, None) => sim.trigger_explosion_default(),
            (position, count) => {
                let at = position.unwrap_or_else(|| sim.viewport().center());
                let count = count.unwrap_or(sim.config().burst.explosion_count);
                sim.trigger_explosion(at.x, at.y, count);
            }
        }
    }
    for cmd in sim_commands.read() {
        match cmd {
            SimulationCommand::Start => sim.start(),
            SimulationCommand::Stop => sim.stop(),
            SimulationCommand::Toggle => {
                if sim.is_running() {
                    sim.stop();
                } else {
                    sim.start();
                }
            }
            SimulationCommand::Reset => sim.reset(),
            SimulationCommand::Dispose => {
                sim.dispose();
                commands.remove_resource::<AmbientHandle>();
            }
            SimulationCommand::ToggleAmbient => {
                if sim.ambient_scheduled() {
                    match ambient.as_ref() {
                        Some(handle) => handle.0.cancel(),
                        None => sim.cancel_ambient(),
                    }
                    info!("Ambient spawns cancelled");
                } else {
                    let token = sim.schedule_ambient_spawns();
                    commands.insert_resource(AmbientHandle(token));
                    info!("Ambient spawns scheduled");
                }
            }
        }
    }
}
