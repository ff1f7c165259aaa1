#[cfg(feature = "debug")]
use super::stats::{DebugState, DebugStats};
#[cfg(feature = "debug")]
use bevy::prelude::*;

#[cfg(feature = "debug")]
pub fn debug_logging_system(time: Res<Time>, mut state: ResMut<DebugState>, stats: Res<DebugStats>) {
    state.time_accum += time.delta_secs();
    if state.time_accum >= state.log_interval {
        state.time_accum = 0.0;
        info!("BEANS frame={} t={:.3}s fps={:.1} ft_ms={:.1} count={} peak={} fill={:.0}% gravity={:.2} pending={} running={} ambient={}",
            state.frame_counter,
            time.elapsed_secs(),
            stats.fps,
            stats.frame_time_ms,
            stats.bean_count,
            state.peak_beans,
            stats.fill_percent,
            stats.gravity,
            stats.pending_spawns,
            stats.running,
            stats.ambient);
    }
}
