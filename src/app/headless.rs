//! Windowless run: the simulation plus a tally of what it would have drawn.

use bevy::prelude::*;

use crate::core::system::system_order::SimulationSet;
use crate::gameplay::BeanSim;
use crate::simulation::SurfaceCommand;

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct HeadlessStats {
    pub frames: u32,
    pub attached: usize,
    pub detached: usize,
    pub steam_puffs: usize,
    pub peak_population: usize,
}

#[derive(Resource, Debug, Clone, Copy)]
struct FrameBudget(u32);

/// Drains the surface outbox each frame and exits after `frames` updates.
pub struct HeadlessPlugin {
    pub frames: u32,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HeadlessStats>()
            .insert_resource(FrameBudget(self.frames))
            .add_systems(
                Update,
                (
                    tally_surface_commands.in_set(SimulationSet::Present),
                    stop_after_budget.after(SimulationSet::Present),
                ),
            );
    }
}

fn tally_surface_commands(mut sim: ResMut<BeanSim>, mut stats: ResMut<HeadlessStats>) {
    for cmd in sim.surface_mut().take() {
        match cmd {
            SurfaceCommand::Attach { .. } => stats.attached += 1,
            SurfaceCommand::Detach { .. } => stats.detached += 1,
            SurfaceCommand::Steam { .. } => stats.steam_puffs += 1,
            SurfaceCommand::SetPosition { .. }
            | SurfaceCommand::SetFlag { .. }
            | SurfaceCommand::Fill(_) => {}
        }
    }
    stats.peak_population = stats.peak_population.max(sim.len());
}

fn stop_after_budget(
    budget: Res<FrameBudget>,
    sim: Res<BeanSim>,
    mut stats: ResMut<HeadlessStats>,
    mut ev_exit: EventWriter<AppExit>,
) {
    stats.frames += 1;
    if stats.frames >= budget.0 {
        info!(
            frames = stats.frames,
            attached = stats.attached,
            detached = stats.detached,
            steam = stats.steam_puffs,
            peak = stats.peak_population,
            live = sim.len(),
            "Headless run finished"
        );
        ev_exit.write(AppExit::Success);
    }
}
