#[cfg(feature = "debug")]
use crate::gameplay::{SimulationCommand, TriggerBreak, TriggerExplosion};
#[cfg(feature = "debug")]
use bevy::prelude::*;

/// B: break (shower), E: explosion at the centre, P: pause/resume, R: reset,
/// A: toggle ambient spawns.
#[cfg(feature = "debug")]
pub fn debug_key_input_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut breaks: EventWriter<TriggerBreak>,
    mut explosions: EventWriter<TriggerExplosion>,
    mut commands: EventWriter<SimulationCommand>,
) {
    let Some(keys) = keys else {
        return;
    };
    if keys.just_pressed(KeyCode::KeyB) {
        info!("DEBUG trigger break");
        breaks.write(TriggerBreak);
    }
    if keys.just_pressed(KeyCode::KeyE) {
        info!("DEBUG trigger explosion");
        explosions.write(TriggerExplosion::default());
    }
    if keys.just_pressed(KeyCode::KeyP) {
        commands.write(SimulationCommand::Toggle);
    }
    if keys.just_pressed(KeyCode::KeyR) {
        commands.write(SimulationCommand::Reset);
    }
    if keys.just_pressed(KeyCode::KeyA) {
        commands.write(SimulationCommand::ToggleAmbient);
    }
}
