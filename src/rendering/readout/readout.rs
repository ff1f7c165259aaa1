//! Fill gauge, bean counter, hover tooltip and trivia popups.

use bevy::prelude::*;

use crate::core::components::{BeanCountLabel, FillBar, FillBarLabel, HoverTooltip, TriviaBubble};
use crate::core::config::BeanConfig;
use crate::core::system::system_order::SimulationSet;
use crate::gameplay::BeanSim;
use crate::interaction::input::ShowTrivia;
use crate::rendering::beans::beans::FillReadout;
use crate::rendering::palette::palette::{FILL_BAR, FILL_TRACK, POPUP_BG, POPUP_TEXT, TEXT};

const TOOLTIP_OFFSET: f32 = 14.0;

pub struct ReadoutPlugin;

impl Plugin for ReadoutPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_readout_ui).add_systems(
            Update,
            (
                update_fill_readout,
                update_hover_tooltip,
                spawn_trivia_bubbles,
                expire_trivia_bubbles,
            )
                .after(SimulationSet::Present),
        );
    }
}

fn spawn_readout_ui(mut commands: Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(16.0),
            bottom: Val::Px(16.0),
            width: Val::Px(220.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            ..default()
        })
        .with_children(|root| {
            root.spawn((
                Node {
                    width: Val::Percent(100.0),
                    height: Val::Px(18.0),
                    ..default()
                },
                BackgroundColor(FILL_TRACK),
            ))
            .with_children(|track| {
                track.spawn((
                    FillBar,
                    Node {
                        width: Val::Percent(0.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(FILL_BAR),
                ));
            });
            root.spawn((
                FillBarLabel,
                Text::new("0%"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(TEXT),
            ));
            root.spawn((
                BeanCountLabel,
                Text::new("0 beans"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(TEXT),
            ));
        });

    commands.spawn((
        HoverTooltip,
        Text::new(""),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        TextColor(POPUP_TEXT),
        BackgroundColor(POPUP_BG),
        Node {
            position_type: PositionType::Absolute,
            padding: UiRect::all(Val::Px(4.0)),
            ..default()
        },
        Visibility::Hidden,
    ));
}

fn update_fill_readout(
    readout: Res<FillReadout>,
    mut bars: Query<&mut Node, With<FillBar>>,
    mut percent_labels: Query<&mut Text, (With<FillBarLabel>, Without<BeanCountLabel>)>,
    mut count_labels: Query<&mut Text, (With<BeanCountLabel>, Without<FillBarLabel>)>,
) {
    if !readout.is_changed() {
        return;
    }
    let level = readout.0;
    for mut node in bars.iter_mut() {
        node.width = Val::Percent(level.percent);
    }
    for mut text in percent_labels.iter_mut() {
        text.0 = level.percent_label();
    }
    for mut text in count_labels.iter_mut() {
        text.0 = level.count_label();
    }
}

fn update_hover_tooltip(
    sim: Res<BeanSim>,
    mut tooltips: Query<(&mut Text, &mut Node, &mut Visibility), With<HoverTooltip>>,
) {
    let hovered = sim
        .pointer()
        .and_then(|p| sim.bean_at(p).map(|bean| (p, bean.category)));
    for (mut text, mut node, mut vis) in tooltips.iter_mut() {
        match hovered {
            Some((pointer, category)) => {
                if text.0 != category.tooltip() {
                    text.0 = category.tooltip().to_owned();
                }
                node.left = Val::Px(pointer.x + TOOLTIP_OFFSET);
                node.top = Val::Px(pointer.y + TOOLTIP_OFFSET);
                vis.set_if_neq(Visibility::Visible);
            }
            None => {
                vis.set_if_neq(Visibility::Hidden);
            }
        }
    }
}

/// Popup above and left of the clicked bean.
fn spawn_trivia_bubbles(
    mut commands: Commands,
    mut events: EventReader<ShowTrivia>,
    cfg: Res<BeanConfig>,
) {
    for ev in events.read() {
        commands.spawn((
            TriviaBubble {
                timer: Timer::new(cfg.trivia.display(), TimerMode::Once),
            },
            Text::new(ev.text.clone()),
            TextFont {
                font_size: 14.0,
                ..default()
            },
            TextColor(POPUP_TEXT),
            BackgroundColor(POPUP_BG),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(ev.anchor.x - 100.0),
                top: Val::Px(ev.anchor.y - 60.0),
                max_width: Val::Px(260.0),
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
        ));
    }
}

fn expire_trivia_bubbles(
    mut commands: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut TriviaBubble)>,
) {
    for (entity, mut bubble) in q.iter_mut() {
        if bubble.timer.tick(time.delta()).finished() {
            commands.entity(entity).despawn();
        }
    }
}
