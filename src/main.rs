use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;

use bean_drop::app::headless::HeadlessPlugin;
use bean_drop::gameplay::BeanSimPlugin;
use bean_drop::interaction::session::config_hot_reload::ConfigReloadSettings;
use bean_drop::{BeanConfig, GamePlugin};

const DEFAULT_LAYERS: [&str; 2] = ["assets/config/beans.ron", "assets/config/beans.local.ron"];

/// Coffee beans falling, bouncing and piling up in a window.
#[derive(Parser, Debug)]
#[command(name = "bean_drop", version, about)]
struct Cli {
    /// Config layer (RON). Repeat to stack layers; later files win. Defaults to
    /// assets/config/beans.ron + beans.local.ron.
    #[arg(long = "config", value_name = "PATH")]
    config: Vec<PathBuf>,
    /// Fixed RNG seed, overrides the config's `seed`.
    #[arg(long)]
    seed: Option<u64>,
    /// Run without a window, at a fixed 60 Hz step.
    #[arg(long)]
    headless: bool,
    /// Frames to simulate in headless mode.
    #[arg(long, default_value_t = 600)]
    frames: u32,
}

/// Config loading outcome, logged once the log plugin is up.
#[derive(Resource, Debug, Default)]
struct ConfigReport {
    used: Vec<String>,
    issues: Vec<String>,
    warnings: Vec<String>,
}

#[cfg(target_arch = "wasm32")]
fn load_config(_cli: &Cli) -> Result<(BeanConfig, ConfigReport)> {
    // Embed the base config; no layering on wasm.
    const RAW: &str = include_str!("../assets/config/beans.ron");
    let cfg: BeanConfig = ron::from_str(RAW).context("embedded beans.ron")?;
    let warnings = cfg.validate();
    Ok((
        cfg,
        ConfigReport {
            used: vec!["<embedded>".into()],
            warnings,
            ..Default::default()
        },
    ))
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(cli: &Cli) -> Result<(BeanConfig, ConfigReport)> {
    // Explicit layers must exist; the default pair is optional.
    for path in &cli.config {
        std::fs::metadata(path)
            .with_context(|| format!("config layer {} is not readable", path.display()))?;
    }
    let (cfg, used, issues) = BeanConfig::load_layered(layer_paths(cli));
    if !cli.config.is_empty() && !issues.is_empty() {
        bail!("config: {}", issues.join("; "));
    }
    let warnings = cfg.validate();
    Ok((
        cfg,
        ConfigReport {
            used,
            issues,
            warnings,
        },
    ))
}

fn layer_paths(cli: &Cli) -> Vec<PathBuf> {
    if cli.config.is_empty() {
        DEFAULT_LAYERS.iter().map(PathBuf::from).collect()
    } else {
        cli.config.clone()
    }
}

fn log_config_report(report: Res<ConfigReport>) {
    for e in &report.issues {
        warn!("CONFIG LOAD ISSUE: {e}");
    }
    if report.used.is_empty() {
        info!("No config layers found; using defaults");
    } else {
        info!(used = ?report.used, "Config layers loaded");
    }
    for w in &report.warnings {
        warn!("CONFIG WARNING: {w}");
    }
}

fn main() -> Result<()> {
    #[cfg(target_arch = "wasm32")]
    {
        // Better panic messages on wasm
        console_error_panic_hook::set_once();
    }

    let cli = Cli::parse();
    let (mut cfg, report) = load_config(&cli)?;
    if let Some(seed) = cli.seed {
        cfg.seed = Some(seed);
    }

    let mut app = App::new();
    app.insert_resource(cfg.clone()).insert_resource(report);

    if cli.headless {
        app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
            .add_plugins(LogPlugin::default())
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
                1.0 / 60.0,
            )))
            .add_plugins((BeanSimPlugin, HeadlessPlugin { frames: cli.frames }));
    } else {
        app.insert_resource(ConfigReloadSettings {
            paths: layer_paths(&cli),
            ..Default::default()
        })
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: cfg.window.title.clone(),
                resolution: (cfg.window.width, cfg.window.height).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(GamePlugin);
    }
    app.add_systems(Startup, log_config_report);

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => bail!("bean_drop exited with code {code}"),
    }
}
