use std::time::Duration;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::core::config::BeanConfig;
use crate::core::system::system_order::SimulationSet;
use crate::simulation::{
    Bean, BeanId, BeanSimulation, BeanSurface, CancelToken, FillLevel, SurfaceCommand,
    TransientFlag,
};

use super::triggers::{handle_triggers, SimulationCommand, TriggerBreak, TriggerExplosion};

/// Surface that queues every command for the presentation systems to drain.
#[derive(Debug, Clone)]
pub struct SurfaceOutbox {
    container: bool,
    queue: Vec<SurfaceCommand>,
}

impl Default for SurfaceOutbox {
    fn default() -> Self {
        Self {
            container: true,
            queue: Vec::new(),
        }
    }
}

impl SurfaceOutbox {
    pub fn set_container(&mut self, present: bool) {
        self.container = present;
    }

    /// Everything queued since the last call, oldest first.
    pub fn take(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.queue)
    }

    pub fn queued(&self) -> &[SurfaceCommand] {
        &self.queue
    }
}

impl BeanSurface for SurfaceOutbox {
    fn has_container(&self) -> bool {
        self.container
    }

    fn attach(&mut self, bean: &Bean) {
        self.queue.push(SurfaceCommand::Attach {
            id: bean.id,
            category: bean.category,
            position: bean.position,
        });
    }

    fn detach(&mut self, id: BeanId) {
        self.queue.push(SurfaceCommand::Detach { id });
    }

    fn set_position(&mut self, id: BeanId, position: Vec2) {
        self.queue.push(SurfaceCommand::SetPosition { id, position });
    }

    fn set_transient_flag(&mut self, id: BeanId, flag: TransientFlag, duration: Duration) {
        self.queue
            .push(SurfaceCommand::SetFlag { id, flag, duration });
    }

    fn puff_steam(&mut self, position: Vec2) {
        self.queue.push(SurfaceCommand::Steam { position });
    }

    fn show_fill_level(&mut self, level: FillLevel) {
        self.queue.push(SurfaceCommand::Fill(level));
    }
}

/// The one simulation instance of the app.
#[derive(Resource, Deref, DerefMut)]
pub struct BeanSim(pub BeanSimulation<SurfaceOutbox>);

impl BeanSim {
    pub fn from_config(cfg: &BeanConfig) -> Self {
        Self(BeanSimulation::new(cfg.clone(), SurfaceOutbox::default()))
    }
}

/// Cancellation handle of the running ambient spawn loop.
#[derive(Resource, Debug, Clone)]
pub struct AmbientHandle(pub CancelToken);

pub struct BeanSimPlugin;

impl Plugin for BeanSimPlugin {
    fn build(&self, app: &mut App) {
        let cfg = match app.world().get_resource::<BeanConfig>() {
            Some(cfg) => cfg.clone(),
            None => {
                let cfg = BeanConfig::default();
                app.insert_resource(cfg.clone());
                cfg
            }
        };
        SimulationSet::configure(app);
        app.insert_resource(BeanSim::from_config(&cfg))
            .add_event::<TriggerBreak>()
            .add_event::<TriggerExplosion>()
            .add_event::<SimulationCommand>()
            .add_systems(Startup, start_simulation)
            .add_systems(
                Update,
                (
                    handle_triggers.in_set(SimulationSet::Input),
                    advance_timers.in_set(SimulationSet::Timers),
                    step_physics.in_set(SimulationSet::Physics),
                ),
            )
            .add_systems(Last, dispose_on_exit);
    }
}

fn start_simulation(
    mut commands: Commands,
    mut sim: ResMut<BeanSim>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if let Ok(window) = windows.single() {
        sim.set_viewport(window.width(), window.height());
    }
    sim.start();

    let (ambient_enabled, shower_delay_ms, max_beans) = {
        let cfg = sim.config();
        (
            cfg.ambient.enabled,
            cfg.shower.page_load_delay_ms,
            cfg.population.max_beans,
        )
    };
    if ambient_enabled {
        let token = sim.schedule_ambient_spawns();
        commands.insert_resource(AmbientHandle(token));
    }
    if shower_delay_ms > 0 {
        sim.schedule_shower_after(Duration::from_millis(shower_delay_ms));
    }
    let viewport = sim.viewport();
    info!(
        max_beans,
        width = viewport.width,
        height = viewport.height,
        "Bean simulation ready"
    );
}

fn advance_timers(time: Res<Time>, mut sim: ResMut<BeanSim>) {
    sim.advance(time.delta());
}

fn step_physics(mut sim: ResMut<BeanSim>) {
    let expired = sim.tick();
    if expired > 0 {
        trace!(expired, "beans expired");
    }
}

fn dispose_on_exit(mut exits: EventReader<AppExit>, mut sim: ResMut<BeanSim>) {
    if exits.read().next().is_some() && sim.is_running() {
        sim.dispose();
    }
}
