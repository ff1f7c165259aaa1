use bevy::prelude::*;

use crate::debug::DebugPlugin;
use crate::gameplay::BeanSimPlugin;
use crate::interaction::input::BeanInputPlugin;
use crate::interaction::session::auto_close::AutoClosePlugin;
use crate::interaction::session::config_hot_reload::ConfigHotReloadPlugin;
use crate::rendering::beans::beans::BeanVisualsPlugin;
use crate::rendering::camera::camera::CameraPlugin;
use crate::rendering::readout::readout::ReadoutPlugin;

/// Everything the windowed app needs on top of `DefaultPlugins`.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            CameraPlugin,
            BeanSimPlugin,
            BeanInputPlugin,
            BeanVisualsPlugin,
            ReadoutPlugin,
            DebugPlugin,
            ConfigHotReloadPlugin,
            AutoClosePlugin,
        ));
    }
}
