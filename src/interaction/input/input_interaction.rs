use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::{CursorLeft, PrimaryWindow, WindowResized};

use crate::core::system::system_order::SimulationSet;
use crate::gameplay::BeanSim;

/// Device tilt in degrees, -90 (left) .. 90 (right).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TiltInput {
    pub gamma: f32,
}

/// A trivia fact to pop up near `anchor` (page coordinates).
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ShowTrivia {
    pub anchor: Vec2,
    pub text: String,
}

/// Arrow keys stand in for a tilt sensor on desktop.
const KEY_TILT_DEGREES: f32 = 45.0;

pub struct BeanInputPlugin;

impl Plugin for BeanInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TiltInput>()
            .add_event::<ShowTrivia>()
            .add_systems(
                Update,
                (
                    sync_viewport,
                    track_pointer,
                    handle_click,
                    handle_wheel,
                    keyboard_tilt,
                    apply_tilt,
                )
                    .chain()
                    .in_set(SimulationSet::Input),
            );
    }
}

fn sync_viewport(mut resized: EventReader<WindowResized>, mut sim: ResMut<BeanSim>) {
    if let Some(ev) = resized.read().last() {
        sim.set_viewport(ev.width, ev.height);
    }
}

fn track_pointer(
    mut moved: EventReader<CursorMoved>,
    mut left: EventReader<CursorLeft>,
    mut sim: ResMut<BeanSim>,
) {
    if let Some(ev) = moved.read().last() {
        sim.set_pointer(ev.position);
    }
    if left.read().next().is_some() {
        sim.clear_pointer();
    }
}

/// Click on a bean shows trivia; click anywhere else bursts beans at the cursor.
fn handle_click(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut sim: ResMut<BeanSim>,
    mut trivia: EventWriter<ShowTrivia>,
) {
    let Some(buttons) = buttons else {
        return;
    };
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    if let Some(anchor) = sim.bean_at(cursor).map(|b| b.position) {
        if let Some(text) = sim.pick_trivia() {
            trivia.write(ShowTrivia {
                anchor,
                text: text.to_owned(),
            });
        }
        return;
    }
    let count = sim.config().burst.click_count;
    sim.spawn_burst(cursor.x, cursor.y, count);
}

fn handle_wheel(mut wheel: EventReader<MouseWheel>, mut sim: ResMut<BeanSim>) {
    if wheel.read().count() > 0 {
        sim.handle_scroll();
    }
}

fn keyboard_tilt(keys: Option<Res<ButtonInput<KeyCode>>>, mut tilt: EventWriter<TiltInput>) {
    let Some(keys) = keys else {
        return;
    };
    let arrows = [KeyCode::ArrowLeft, KeyCode::ArrowRight];
    if !keys.any_just_pressed(arrows) && !keys.any_just_released(arrows) {
        return;
    }
    let mut gamma = 0.0;
    if keys.pressed(KeyCode::ArrowLeft) {
        gamma -= KEY_TILT_DEGREES;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        gamma += KEY_TILT_DEGREES;
    }
    tilt.write(TiltInput { gamma });
}

fn apply_tilt(mut events: EventReader<TiltInput>, mut sim: ResMut<BeanSim>) {
    if let Some(ev) = events.read().last() {
        sim.handle_tilt(ev.gamma);
    }
}
