#[cfg(feature = "debug")]
use crate::gameplay::BeanSim;
#[cfg(feature = "debug")]
use bevy::prelude::*;

#[cfg(feature = "debug")]
#[derive(Resource, Debug)]
pub struct DebugState {
    pub log_interval: f32,
    pub time_accum: f32,
    pub frame_counter: u64,
    /// Peak population since startup.
    pub peak_beans: usize,
}

#[cfg(feature = "debug")]
impl Default for DebugState {
    fn default() -> Self {
        Self {
            log_interval: 1.0,
            time_accum: 0.0,
            frame_counter: 0,
            peak_beans: 0,
        }
    }
}

#[cfg(feature = "debug")]
#[derive(Resource, Default, Debug, Clone)]
pub struct DebugStats {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub bean_count: usize,
    pub fill_percent: f32,
    pub gravity: f32,
    pub pending_spawns: usize,
    pub running: bool,
    pub ambient: bool,
}

#[cfg(feature = "debug")]
pub fn debug_stats_collect_system(
    time: Res<Time>,
    sim: Res<BeanSim>,
    mut state: ResMut<DebugState>,
    mut stats: ResMut<DebugStats>,
) {
    state.frame_counter += 1;
    let dt = time.delta_secs().max(1e-6);
    let inst_fps = 1.0 / dt;
    if stats.fps == 0.0 {
        stats.fps = inst_fps;
    } else {
        stats.fps = stats.fps * 0.9 + inst_fps * 0.1;
    }
    let inst_ms = dt * 1000.0;
    if stats.frame_time_ms == 0.0 {
        stats.frame_time_ms = inst_ms;
    } else {
        stats.frame_time_ms = stats.frame_time_ms * 0.9 + inst_ms * 0.1;
    }
    stats.bean_count = sim.len();
    stats.fill_percent = sim.fill_level().percent;
    stats.gravity = sim.gravity();
    stats.pending_spawns = sim.pending_spawns();
    stats.running = sim.is_running();
    stats.ambient = sim.ambient_scheduled();
    state.peak_beans = state.peak_beans.max(stats.bean_count);
}
