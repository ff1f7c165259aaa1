use crate::core::config::BeanConfig;
use bevy::prelude::*;
use std::time::Duration;

#[derive(Resource, Deref, DerefMut)]
struct AutoCloseTimer(Timer);

/// Exits the app after `window.autoClose` seconds (0 disables). Used for smoke runs.
pub struct AutoClosePlugin;

impl Plugin for AutoClosePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_autoclose)
            .add_systems(Update, check_autoclose);
    }
}

fn setup_autoclose(mut commands: Commands, cfg: Res<BeanConfig>) {
    let secs = cfg.window.auto_close;
    if secs <= 0.0 || secs.is_nan() {
        return;
    }
    match Duration::try_from_secs_f32(secs) {
        Ok(after) => {
            info!(seconds = secs, "AutoClose: exiting after {secs} seconds");
            commands.insert_resource(AutoCloseTimer(Timer::new(after, TimerMode::Once)));
        }
        Err(err) => warn!("AutoClose: ignoring window.autoClose {secs}: {err}"),
    }
}

fn check_autoclose(
    time: Res<Time>,
    timer: Option<ResMut<AutoCloseTimer>>,
    mut ev_exit: EventWriter<AppExit>,
) {
    let Some(mut t) = timer else {
        return;
    };
    if t.tick(time.delta()).just_finished() {
        info!("AutoClose: timer finished, requesting app exit");
        ev_exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_auto_close(secs: f32) -> App {
        let mut cfg = BeanConfig::default();
        cfg.window.auto_close = secs;
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(cfg)
            .add_plugins(AutoClosePlugin);
        app.update();
        app
    }

    #[test]
    fn unusable_durations_leave_auto_close_disabled() {
        for secs in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let app = app_with_auto_close(secs);
            assert!(
                !app.world().contains_resource::<AutoCloseTimer>(),
                "autoClose {secs}"
            );
        }
    }

    #[test]
    fn positive_duration_arms_the_timer() {
        let app = app_with_auto_close(2.5);
        let timer = app.world().resource::<AutoCloseTimer>();
        assert_eq!(timer.duration(), Duration::from_secs_f32(2.5));
    }
}
