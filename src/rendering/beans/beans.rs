//! Turns queued surface commands into sprites.
//!
//! The simulation works in page coordinates (origin top-left, y down, a bean's position
//! is its top-left corner). Sprites live in world space centred on the camera, so every
//! position goes through [`page_to_world`].

use std::collections::HashMap;

use bevy::prelude::*;

use crate::core::components::{BeanVisual, SteamPuff, TransientFlags};
use crate::core::system::system_order::SimulationSet;
use crate::gameplay::BeanSim;
use crate::rendering::palette::palette::{color_for_category, STEAM};
use crate::simulation::{BeanId, FillLevel, SurfaceCommand, Viewport};

const BEAN_Z: f32 = 1.0;
const STEAM_Z: f32 = 2.0;
/// Steam rise speed in world units per second.
const STEAM_RISE: f32 = 40.0;

/// Live sprite for each attached bean.
#[derive(Resource, Debug, Default)]
pub struct BeanEntities(pub HashMap<BeanId, Entity>);

/// Latest fill level published by the simulation.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct FillReadout(pub FillLevel);

pub struct BeanVisualsPlugin;

impl Plugin for BeanVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BeanEntities>()
            .init_resource::<FillReadout>()
            .add_systems(
                Update,
                (
                    apply_surface_commands.in_set(SimulationSet::Present),
                    (animate_transient_flags, animate_steam).after(SimulationSet::Present),
                ),
            );
    }
}

/// Centre of a `size` square whose top-left corner is at `page`, in world space.
pub fn page_to_world(page: Vec2, viewport: Viewport, size: f32) -> Vec2 {
    Vec2::new(
        page.x + size * 0.5 - viewport.width * 0.5,
        viewport.height * 0.5 - (page.y + size * 0.5),
    )
}

pub fn apply_surface_commands(
    mut commands: Commands,
    mut sim: ResMut<BeanSim>,
    mut entities: ResMut<BeanEntities>,
    mut readout: ResMut<FillReadout>,
    mut beans: Query<(&mut Transform, &mut TransientFlags), With<BeanVisual>>,
) {
    let queued = sim.surface_mut().take();
    if queued.is_empty() {
        return;
    }
    let viewport = sim.viewport();
    let size = sim.config().population.bean_size;
    let steam_life = sim.config().effects.steam();

    for cmd in queued {
        match cmd {
            SurfaceCommand::Attach {
                id,
                category,
                position,
            } => {
                let at = page_to_world(position, viewport, size);
                let entity = commands
                    .spawn((
                        BeanVisual { id, category },
                        TransientFlags::default(),
                        Sprite::from_color(color_for_category(category), Vec2::splat(size)),
                        Transform::from_translation(at.extend(BEAN_Z)),
                    ))
                    .id();
                if let Some(stale) = entities.0.insert(id, entity) {
                    warn!("{id} attached over a live sprite");
                    commands.entity(stale).despawn();
                }
            }
            SurfaceCommand::Detach { id } => {
                if let Some(entity) = entities.0.remove(&id) {
                    commands.entity(entity).despawn();
                }
            }
            SurfaceCommand::SetPosition { id, position } => {
                let Some(&entity) = entities.0.get(&id) else {
                    continue;
                };
                let at = page_to_world(position, viewport, size).extend(BEAN_Z);
                match beans.get_mut(entity) {
                    Ok((mut tf, _)) => tf.translation = at,
                    // Spawned earlier this frame; the command queue has not run yet.
                    Err(_) => {
                        commands
                            .entity(entity)
                            .insert(Transform::from_translation(at));
                    }
                }
            }
            SurfaceCommand::SetFlag { id, flag, duration } => {
                let Some(&entity) = entities.0.get(&id) else {
                    continue;
                };
                match beans.get_mut(entity) {
                    Ok((_, mut flags)) => flags.set(flag, duration),
                    Err(_) => {
                        commands
                            .entity(entity)
                            .insert(TransientFlags::with(flag, duration));
                    }
                }
            }
            SurfaceCommand::Steam { position } => {
                let at = page_to_world(position, viewport, size);
                commands.spawn((
                    SteamPuff {
                        timer: Timer::new(steam_life, TimerMode::Once),
                    },
                    Sprite::from_color(STEAM, Vec2::splat(size * 0.8)),
                    Transform::from_translation(at.extend(STEAM_Z)),
                ));
            }
            SurfaceCommand::Fill(level) => readout.0 = level,
        }
    }
}

fn animate_transient_flags(
    time: Res<Time>,
    mut q: Query<(&mut TransientFlags, &mut Transform), With<BeanVisual>>,
) {
    for (mut flags, mut tf) in q.iter_mut() {
        flags.tick(time.delta());
        tf.scale = flags.squash().extend(1.0);
    }
}

fn animate_steam(
    mut commands: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut SteamPuff, &mut Transform, &mut Sprite)>,
) {
    for (entity, mut puff, mut tf, mut sprite) in q.iter_mut() {
        if puff.timer.tick(time.delta()).finished() {
            commands.entity(entity).despawn();
            continue;
        }
        let progress = puff.timer.fraction();
        tf.translation.y += STEAM_RISE * time.delta_secs();
        tf.scale = Vec3::splat(1.0 + progress);
        sprite.color = STEAM.with_alpha(STEAM.alpha() * (1.0 - progress));
    }
}
