use bevy::prelude::*;

use crate::rendering::palette::palette::BACKGROUND;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .add_systems(Startup, setup_camera);
    }
}

fn setup_camera(mut commands: Commands) {
    // Required Components supply the projection and transform.
    commands.spawn(Camera2d);
}
