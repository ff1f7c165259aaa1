use bevy::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

use crate::simulation::bean::{BeanCategory, CategoryWeights};

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Automatically close the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Bean Drop".into(),
            auto_close: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnRange<T> {
    pub min: T,
    pub max: T,
}
impl<T: Default> Default for SpawnRange<T> {
    fn default() -> Self {
        Self {
            min: Default::default(),
            max: Default::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PopulationConfig {
    pub max_beans: usize,
    /// Ticks a bean may live; removed once its age exceeds this.
    pub max_age: u32,
    /// Removed once it falls this far below the viewport bottom.
    pub offscreen_margin: f32,
    /// Square footprint of a bean in pixels.
    pub bean_size: f32,
    pub vel_x_range: SpawnRange<f32>,
    pub vel_y_range: SpawnRange<f32>,
}
impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            max_beans: 20,
            max_age: 1000,
            offscreen_margin: 100.0,
            bean_size: 20.0,
            vel_x_range: SpawnRange { min: -2.0, max: 2.0 },
            vel_y_range: SpawnRange { min: 0.0, max: 2.0 },
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in pixels per frame².
    pub gravity: f32,
    /// Restitution applied on wall and floor reflection.
    pub bounce: f32,
    /// Per-frame velocity multiplier.
    pub friction: f32,
    /// Tilt-adjusted gravity stays within `[gravity_min, gravity_max]`.
    pub gravity_min: f32,
    pub gravity_max: f32,
    /// Gravity change at a full 90 degree tilt.
    pub tilt_influence: f32,
}
impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            bounce: 0.7,
            friction: 0.99,
            gravity_min: 0.2,
            gravity_max: 0.8,
            tilt_influence: 0.3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AttractionConfig {
    pub enabled: bool,
    pub radius: f32,
    /// Force is `(radius - distance) / falloff`.
    pub falloff: f32,
}
impl Default for AttractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 100.0,
            falloff: 1000.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    pub bounce_flag_ms: u64,
    pub landing_flag_ms: u64,
    pub steam_ms: u64,
    /// First wall bounce puffs steam when |vy| exceeds this.
    pub wall_steam_speed: f32,
    /// Floor landings puff steam when |vy| exceeds this.
    pub floor_steam_speed: f32,
}
impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            bounce_flag_ms: 300,
            landing_flag_ms: 500,
            steam_ms: 1000,
            wall_steam_speed: 3.0,
            floor_steam_speed: 5.0,
        }
    }
}
impl EffectsConfig {
    pub fn bounce_flag(&self) -> Duration {
        Duration::from_millis(self.bounce_flag_ms)
    }
    pub fn landing_flag(&self) -> Duration {
        Duration::from_millis(self.landing_flag_ms)
    }
    pub fn steam(&self) -> Duration {
        Duration::from_millis(self.steam_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BurstConfig {
    pub stagger_ms: u64,
    /// Full width of the horizontal jitter window around the burst origin.
    pub jitter_x: f32,
    pub jitter_y: f32,
    /// Beans per pointer click.
    pub click_count: u32,
    /// Beans per explosion trigger without an explicit count.
    pub explosion_count: u32,
    pub weights: CategoryWeights,
}
impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            stagger_ms: 50,
            jitter_x: 100.0,
            jitter_y: 50.0,
            click_count: 3,
            explosion_count: 6,
            weights: CategoryWeights::ZERO
                .with(BeanCategory::Premium, 0.1)
                .with(BeanCategory::Normal, 0.9),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShowerConfig {
    pub count: u32,
    pub stagger_ms: u64,
    pub spawn_y: f32,
    /// Delay of the one-shot page-load shower. 0 disables it.
    pub page_load_delay_ms: u64,
    pub weights: CategoryWeights,
}
impl Default for ShowerConfig {
    fn default() -> Self {
        Self {
            count: 8,
            stagger_ms: 300,
            spawn_y: -20.0,
            page_load_delay_ms: 14_000,
            weights: CategoryWeights::ZERO
                .with(BeanCategory::Premium, 0.05)
                .with(BeanCategory::Roasted, 0.285)
                .with(BeanCategory::Normal, 0.665),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AmbientConfig {
    pub enabled: bool,
    pub initial_delay_ms: u64,
    /// Next firing is drawn uniformly from `[min_delay_ms, max_delay_ms)`.
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Chance that a firing spawns a bean.
    pub chance: f64,
    pub spawn_y: f32,
    pub weights: CategoryWeights,
}
impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: 8_000,
            min_delay_ms: 10_000,
            max_delay_ms: 25_000,
            chance: 0.15,
            spawn_y: -20.0,
            weights: CategoryWeights::ZERO
                .with(BeanCategory::Premium, 0.02)
                .with(BeanCategory::Normal, 0.98),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    pub enabled: bool,
    /// Quiet period after the last scroll event before a spawn is considered.
    pub debounce_ms: u64,
    pub chance: f64,
    pub spawn_y: f32,
}
impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 200,
            chance: 0.3,
            spawn_y: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TriviaConfig {
    pub enabled: bool,
    pub display_ms: u64,
    pub facts: Vec<String>,
}
impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            display_ms: 3_000,
            facts: [
                "Coffee cherries are fruit; the bean is the seed inside.",
                "Arabica grows best at altitudes between 1,000 and 2,000 metres.",
                "Washed processing removes the fruit before the beans dry.",
                "A light roast keeps more of the bean's original acidity.",
                "Green beans keep for months; roasted beans fade within weeks.",
                "Most coffee plants need three to four years before their first harvest.",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
impl TriviaConfig {
    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BeanConfig {
    pub window: WindowConfig,
    pub population: PopulationConfig,
    pub physics: PhysicsConfig,
    pub attraction: AttractionConfig,
    pub effects: EffectsConfig,
    pub burst: BurstConfig,
    pub shower: ShowerConfig,
    pub ambient: AmbientConfig,
    pub scroll: ScrollConfig,
    pub trivia: TriviaConfig,
    /// Fixed RNG seed for reproducible runs; entropy when omitted.
    pub seed: Option<u64>,
}

impl BeanConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
    /// Deep-merges every readable RON file in order (later files win) and deserializes
    /// the result. Returns the config, the paths that were used, and the problems met.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let existing = bm.iter_mut().find(|(ek, _)| **ek == k).map(|(_, ev)| ev);
                        match existing {
                            Some(ev) => merge_value(ev, v),
                            None => {
                                bm.insert(k, v);
                            }
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        let Some(val) = merged else {
            return (BeanConfig::default(), used, errors);
        };
        match val.into_rust::<BeanConfig>() {
            Ok(cfg) => (cfg, used, errors),
            Err(e) => {
                errors.push(format!(
                    "failed to deserialize merged config; using defaults: {e}"
                ));
                (BeanConfig::default(), used, errors)
            }
        }
    }
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        let floats = [
            ("window.width", self.window.width as f64),
            ("window.height", self.window.height as f64),
            ("window.autoClose", self.window.auto_close as f64),
            ("population.offscreen_margin", self.population.offscreen_margin as f64),
            ("population.bean_size", self.population.bean_size as f64),
            ("population.vel_x_range.min", self.population.vel_x_range.min as f64),
            ("population.vel_x_range.max", self.population.vel_x_range.max as f64),
            ("population.vel_y_range.min", self.population.vel_y_range.min as f64),
            ("population.vel_y_range.max", self.population.vel_y_range.max as f64),
            ("physics.gravity", self.physics.gravity as f64),
            ("physics.bounce", self.physics.bounce as f64),
            ("physics.friction", self.physics.friction as f64),
            ("physics.gravity_min", self.physics.gravity_min as f64),
            ("physics.gravity_max", self.physics.gravity_max as f64),
            ("physics.tilt_influence", self.physics.tilt_influence as f64),
            ("attraction.radius", self.attraction.radius as f64),
            ("attraction.falloff", self.attraction.falloff as f64),
            ("effects.wall_steam_speed", self.effects.wall_steam_speed as f64),
            ("effects.floor_steam_speed", self.effects.floor_steam_speed as f64),
            ("burst.jitter_x", self.burst.jitter_x as f64),
            ("burst.jitter_y", self.burst.jitter_y as f64),
            ("shower.spawn_y", self.shower.spawn_y as f64),
            ("ambient.chance", self.ambient.chance),
            ("ambient.spawn_y", self.ambient.spawn_y as f64),
            ("scroll.chance", self.scroll.chance),
            ("scroll.spawn_y", self.scroll.spawn_y as f64),
        ];
        for (label, value) in floats {
            if !value.is_finite() {
                w.push(format!("{label} is not finite ({value})"));
            }
        }
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        }
        let p = &self.population;
        if p.max_beans == 0 {
            w.push("population.max_beans is 0; nothing will spawn".into());
        }
        if p.max_beans > 5_000 {
            w.push(format!(
                "population.max_beans {} very high; every bean is a separate entity",
                p.max_beans
            ));
        }
        if p.max_age == 0 {
            w.push("population.max_age is 0; beans expire on their first tick".into());
        }
        if p.bean_size <= 0.0 {
            w.push("population.bean_size must be > 0".into());
        }
        fn check_range_f32(w: &mut Vec<String>, label: &str, r: &SpawnRange<f32>) {
            if r.min > r.max {
                w.push(format!(
                    "{label} min ({}) greater than max ({})",
                    r.min, r.max
                ));
            }
        }
        check_range_f32(&mut w, "population.vel_x_range", &p.vel_x_range);
        check_range_f32(&mut w, "population.vel_y_range", &p.vel_y_range);

        let ph = &self.physics;
        if ph.gravity.abs() < 1e-4 {
            w.push("physics.gravity magnitude near zero; beans may float".into());
        }
        if ph.gravity < 0.0 {
            w.push(format!(
                "physics.gravity is negative ({}); page coordinates point down",
                ph.gravity
            ));
        }
        if !(0.0..=1.0).contains(&ph.bounce) {
            w.push(format!("physics.bounce {} outside 0..1", ph.bounce));
        }
        if !(0.0..=1.0).contains(&ph.friction) {
            w.push(format!(
                "physics.friction {} outside 0..1 -> energy gain",
                ph.friction
            ));
        }
        if ph.gravity_min > ph.gravity_max {
            w.push(format!(
                "physics.gravity_min ({}) greater than gravity_max ({})",
                ph.gravity_min, ph.gravity_max
            ));
        }
        if self.attraction.enabled {
            if self.attraction.radius <= 0.0 {
                w.push("attraction.radius must be > 0 when enabled".into());
            }
            if self.attraction.falloff <= 0.0 {
                w.push("attraction.falloff must be > 0 when enabled".into());
            }
        }
        for (label, weights) in [
            ("burst.weights", &self.burst.weights),
            ("shower.weights", &self.shower.weights),
            ("ambient.weights", &self.ambient.weights),
        ] {
            if weights.total() <= 0.0 {
                w.push(format!("{label} has no positive weight; falls back to normal"));
            }
        }
        if self.ambient.enabled {
            let a = &self.ambient;
            if a.min_delay_ms > a.max_delay_ms {
                w.push(format!(
                    "ambient.min_delay_ms ({}) greater than max_delay_ms ({})",
                    a.min_delay_ms, a.max_delay_ms
                ));
            }
            if a.max_delay_ms == 0 {
                w.push("ambient delays are 0; clamped to 1ms per firing".into());
            }
            if !(0.0..=1.0).contains(&a.chance) {
                w.push(format!(
                    "ambient.chance {} outside 0..1 (clamped, non-finite never fires)",
                    a.chance
                ));
            }
        }
        if self.scroll.enabled && !(0.0..=1.0).contains(&self.scroll.chance) {
            w.push(format!(
                "scroll.chance {} outside 0..1 (clamped, non-finite never fires)",
                self.scroll.chance
            ));
        }
        if self.trivia.enabled && self.trivia.facts.is_empty() {
            w.push("trivia.enabled with an empty fact list; clicks on beans show nothing".into());
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_clean() {
        let cfg = BeanConfig::default();
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
        assert_eq!(cfg.population.max_beans, 20);
        assert_eq!(cfg.physics.gravity, 0.5);
        assert_eq!(cfg.burst.weights.premium, 0.1);
    }

    #[test]
    fn validation_reports_bad_values() {
        let mut bad = BeanConfig::default();
        bad.window.width = -100.0;
        bad.population.max_beans = 0;
        bad.population.vel_x_range = SpawnRange {
            min: 3.0,
            max: -3.0,
        };
        bad.physics.friction = 1.5;
        bad.ambient.min_delay_ms = 30_000;
        bad.shower.weights = CategoryWeights::ZERO;
        bad.trivia.facts.clear();
        let warnings = bad.validate();
        let joined = warnings.join(" | ");
        assert!(joined.contains("window dimensions must be > 0"));
        assert!(joined.contains("population.max_beans is 0"));
        assert!(joined.contains("population.vel_x_range min (3"));
        assert!(joined.contains("physics.friction"));
        assert!(joined.contains("ambient.min_delay_ms"));
        assert!(joined.contains("shower.weights has no positive weight"));
        assert!(joined.contains("empty fact list"));
    }

    #[test]
    fn validation_reports_non_finite_floats() {
        let cfg: BeanConfig =
            ron::from_str("(scroll: (chance: NaN), window: (autoClose: inf))").unwrap();
        assert!(cfg.scroll.chance.is_nan());
        let joined = cfg.validate().join(" | ");
        assert!(joined.contains("scroll.chance is not finite"), "{joined}");
        assert!(joined.contains("window.autoClose is not finite"), "{joined}");
    }

    #[test]
    fn load_or_default_missing_file() {
        let (cfg, err) = BeanConfig::load_or_default("this/file/does/not/exist.ron");
        assert!(err.is_some());
        assert_eq!(cfg, BeanConfig::default());
    }

    #[test]
    fn partial_file_keeps_section_defaults() {
        let sample = r"(
            population: (max_beans: 5),
            burst: (weights: (normal: 1.0, roasted: 3.0)),
            seed: Some(9),
        )";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample.as_bytes()).unwrap();
        let cfg = BeanConfig::load_from_file(file.path()).expect("parse config");
        assert_eq!(cfg.population.max_beans, 5);
        assert_eq!(cfg.population.max_age, 1000);
        assert_eq!(cfg.burst.weights.roasted, 3.0);
        assert_eq!(cfg.burst.weights.premium, 0.0);
        assert_eq!(cfg.burst.stagger_ms, 50);
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn layered_merge_overrides() {
        let base = r#"(
            window: (width: 900.0, title: "Base"),
            physics: (gravity: 0.4, bounce: 0.6),
        )"#;
        let overlay = r"(
            physics: (bounce: 0.9),
            ambient: (enabled: false),
        )";
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        let mut f2 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(base.as_bytes()).unwrap();
        f2.write_all(overlay.as_bytes()).unwrap();
        let (cfg, used, errors) = BeanConfig::load_layered([f1.path(), f2.path()]);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(used.len(), 2);
        assert_eq!(cfg.window.width, 900.0);
        assert_eq!(cfg.window.title, "Base");
        assert_eq!(cfg.physics.gravity, 0.4);
        assert_eq!(cfg.physics.bounce, 0.9);
        assert!(!cfg.ambient.enabled);
        assert_eq!(cfg.window.height, WindowConfig::default().height);
    }

    #[test]
    fn layered_missing_layer_is_reported_not_fatal() {
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(b"(population: (max_beans: 7))").unwrap();
        let (cfg, used, errors) =
            BeanConfig::load_layered([f1.path(), Path::new("missing/beans.local.ron")]);
        assert_eq!(cfg.population.max_beans, 7);
        assert_eq!(used.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("read error"));
    }
}
