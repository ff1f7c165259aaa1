//! Headless bean simulation.
//!
//! [`BeanSimulation`] owns the population, the spawn timers and the physics. It is
//! driven from outside: [`BeanSimulation::advance`] moves the virtual clock and fires
//! due timers, [`BeanSimulation::tick`] runs one physics frame. Visual side effects go
//! through the injected [`BeanSurface`]; randomness comes from the injected RNG.

pub mod bean;
pub mod physics;
pub mod schedule;
pub mod surface;

use std::collections::VecDeque;
use std::time::Duration;

use bevy::log::{debug, info};
use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::core::config::{BeanConfig, SpawnRange};

pub use bean::{Bean, BeanCategory, BeanId, CategoryWeights};
pub use physics::{StepOutcome, StepParams, Viewport};
pub use schedule::{CancelToken, PendingAction, Scheduler};
pub use surface::{
    BeanSurface, FillLevel, NullSurface, RecordingSurface, SurfaceCommand, TransientFlag,
};

use schedule::AmbientTask;

pub struct BeanSimulation<S, R = StdRng> {
    config: BeanConfig,
    surface: S,
    rng: R,
    /// Insertion order is eviction order.
    beans: VecDeque<Bean>,
    next_id: u64,
    viewport: Viewport,
    pointer: Option<Vec2>,
    gravity: f32,
    running: bool,
    scheduler: Scheduler,
    ambient: Option<AmbientTask>,
    scroll_due: Option<Duration>,
}

impl<S: BeanSurface> BeanSimulation<S, StdRng> {
    /// Seeds from `config.seed`, or from entropy when no seed is configured.
    pub fn new(config: BeanConfig, surface: S) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, surface, rng)
    }
}

impl<S: BeanSurface, R: Rng> BeanSimulation<S, R> {
    pub fn with_rng(config: BeanConfig, surface: S, rng: R) -> Self {
        let viewport = Viewport::new(config.window.width, config.window.height);
        let gravity = config.physics.gravity;
        Self {
            config,
            surface,
            rng,
            beans: VecDeque::new(),
            next_id: 0,
            viewport,
            pointer: None,
            gravity,
            running: false,
            scheduler: Scheduler::default(),
            ambient: None,
            scroll_due: None,
        }
    }

    // ---------------- Lifecycle ----------------

    pub fn start(&mut self) {
        if !self.running {
            info!("Bean simulation started");
        }
        self.running = true;
    }

    /// Later ticks do nothing until [`start`](Self::start) is called again. Timers keep
    /// running.
    pub fn stop(&mut self) {
        if self.running {
            info!("Bean simulation stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Removes every bean through the surface. Timers are kept.
    pub fn reset(&mut self) {
        let ids: Vec<BeanId> = self.beans.iter().map(|b| b.id).collect();
        for id in ids {
            self.remove(id);
        }
        self.publish_fill_level();
    }

    /// Stops the simulation for good: cancels the ambient loop, drops every pending
    /// spawn and removes every bean.
    pub fn dispose(&mut self) {
        self.cancel_ambient();
        self.scheduler.clear();
        self.scroll_due = None;
        self.reset();
        self.running = false;
        info!("Bean simulation disposed");
    }

    /// Swaps in a new configuration. Gravity returns to the configured base value and the
    /// viewport is kept. Disabling ambient spawns cancels a running ambient loop.
    pub fn set_config(&mut self, config: BeanConfig) {
        self.gravity = config.physics.gravity;
        self.config = config;
        if !self.config.ambient.enabled && self.ambient.is_some() {
            self.cancel_ambient();
            info!("Ambient spawns disabled by config; loop cancelled");
        }
        while self.beans.len() > self.config.population.max_beans {
            if !self.remove_oldest() {
                break;
            }
        }
        self.publish_fill_level();
    }

    // ---------------- Inputs ----------------

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn set_pointer(&mut self, position: Vec2) {
        self.pointer = Some(position);
    }

    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    /// Device tilt around the front-to-back axis, in degrees (-90 left .. 90 right).
    pub fn handle_tilt(&mut self, gamma: f32) {
        if !gamma.is_finite() {
            return;
        }
        let ph = &self.config.physics;
        let (lo, hi) = (
            ph.gravity_min.min(ph.gravity_max),
            ph.gravity_max.max(ph.gravity_min),
        );
        let tilted = ph.gravity + gamma / 90.0 * ph.tilt_influence;
        // NaN bounds fail `lo <= hi`; leave gravity unclamped rather than panic.
        self.gravity = if lo <= hi { tilted.clamp(lo, hi) } else { tilted };
    }

    /// Restarts the scroll quiet timer; a spawn is considered once it elapses.
    pub fn handle_scroll(&mut self) {
        if !self.config.scroll.enabled {
            return;
        }
        self.scroll_due =
            Some(self.scheduler.now() + Duration::from_millis(self.config.scroll.debounce_ms));
    }

    // ---------------- Spawning ----------------

    pub fn spawn(&mut self, x: f32, y: f32, category: BeanCategory) -> Option<BeanId> {
        let velocity = Vec2::new(
            sample_range(&mut self.rng, &self.config.population.vel_x_range),
            sample_range(&mut self.rng, &self.config.population.vel_y_range),
        );
        self.spawn_with_velocity(Vec2::new(x, y), velocity, category)
    }

    pub fn spawn_with_velocity(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        category: BeanCategory,
    ) -> Option<BeanId> {
        let capacity = self.config.population.max_beans;
        if !self.surface.has_container() || capacity == 0 {
            self.publish_fill_level();
            return None;
        }
        while self.beans.len() >= capacity {
            if !self.remove_oldest() {
                break;
            }
        }
        self.next_id += 1;
        let bean = Bean::new(BeanId(self.next_id), position, velocity, category);
        self.surface.attach(&bean);
        let id = bean.id;
        self.beans.push_back(bean);
        self.publish_fill_level();
        Some(id)
    }

    /// Staggered spawns jittered around `(x, y)`; one steam puff at the origin right away.
    pub fn spawn_burst(&mut self, x: f32, y: f32, count: u32) {
        let origin = Vec2::new(x, y);
        let stagger = Duration::from_millis(self.config.burst.stagger_ms);
        for i in 0..count {
            self.scheduler
                .schedule(stagger * i, PendingAction::BurstBean { origin });
        }
        self.surface.puff_steam(origin);
    }

    /// Staggered spawns across the top edge.
    pub fn spawn_shower(&mut self, count: u32) {
        let now = self.scheduler.now();
        self.schedule_shower_from(now, count);
    }

    pub fn schedule_shower_after(&mut self, delay: Duration) {
        let count = self.config.shower.count;
        self.scheduler
            .schedule(delay, PendingAction::Shower { count });
    }

    /// Starts the ambient spawn loop, replacing (and cancelling) any previous one.
    pub fn schedule_ambient_spawns(&mut self) -> CancelToken {
        if let Some(previous) = self.ambient.take() {
            previous.token.cancel();
        }
        let token = CancelToken::new();
        let next_due =
            self.scheduler.now() + Duration::from_millis(self.config.ambient.initial_delay_ms);
        self.ambient = Some(AmbientTask {
            token: token.clone(),
            next_due,
        });
        token
    }

    /// Same as cancelling the token returned by
    /// [`schedule_ambient_spawns`](Self::schedule_ambient_spawns).
    pub fn cancel_ambient(&mut self) {
        if let Some(task) = self.ambient.take() {
            task.token.cancel();
        }
    }

    pub fn trigger_explosion(&mut self, x: f32, y: f32, count: u32) {
        self.spawn_burst(x, y, count);
    }

    /// Explosion at the viewport centre with the configured default count.
    pub fn trigger_explosion_default(&mut self) {
        let center = self.viewport.center();
        self.spawn_burst(center.x, center.y, self.config.burst.explosion_count);
    }

    /// Shower with the configured count.
    pub fn trigger_shower(&mut self) {
        self.spawn_shower(self.config.shower.count);
    }

    pub fn trigger_break(&mut self) {
        self.trigger_shower();
    }

    // ---------------- Removal ----------------

    /// Detaches and drops the bean. Returns `false` (and changes nothing) when it is
    /// already gone.
    pub fn remove(&mut self, id: BeanId) -> bool {
        let Some(idx) = self.beans.iter().position(|b| b.id == id) else {
            return false;
        };
        let Some(bean) = self.beans.remove(idx) else {
            return false;
        };
        self.surface.detach(bean.id);
        self.publish_fill_level();
        true
    }

    fn remove_oldest(&mut self) -> bool {
        let Some(oldest) = self.beans.front().map(|b| b.id) else {
            return false;
        };
        debug!("Evicting {oldest} at capacity");
        self.remove(oldest)
    }

    // ---------------- Clock & physics ----------------

    /// Moves the virtual clock and runs every timer that became due.
    pub fn advance(&mut self, dt: Duration) {
        self.scheduler.advance(dt);
        while let Some((due, action)) = self.scheduler.pop_due() {
            self.fire(due, action);
        }
        self.run_ambient();
        self.run_scroll();
    }

    /// One physics frame over the whole population. Returns how many beans expired.
    pub fn tick(&mut self) -> usize {
        if !self.running {
            return 0;
        }
        let params = self.step_params();
        let effects = self.config.effects.clone();
        let (bounce_flag, landing_flag) = (effects.bounce_flag(), effects.landing_flag());
        let mut expired = Vec::new();

        for bean in self.beans.iter_mut() {
            let outcome = physics::step(bean, self.pointer, self.viewport, &params);
            if outcome.hit_wall {
                self.surface
                    .set_transient_flag(bean.id, TransientFlag::Bouncing, bounce_flag);
                if bean.bounces == 1 && bean.velocity.y.abs() > effects.wall_steam_speed {
                    self.surface.puff_steam(bean.position);
                }
            }
            if outcome.hit_floor {
                self.surface
                    .set_transient_flag(bean.id, TransientFlag::Landing, landing_flag);
                if bean.velocity.y.abs() > effects.floor_steam_speed {
                    self.surface.puff_steam(bean.position);
                }
            }
            self.surface.set_position(bean.id, bean.position);
            if outcome.expired {
                expired.push(bean.id);
            }
        }

        for id in &expired {
            self.remove(*id);
        }
        expired.len()
    }

    fn step_params(&self) -> StepParams {
        let c = &self.config;
        StepParams {
            gravity: self.gravity,
            friction: c.physics.friction,
            restitution: c.physics.bounce,
            bean_size: c.population.bean_size,
            attraction_radius: if c.attraction.enabled {
                c.attraction.radius
            } else {
                0.0
            },
            attraction_falloff: c.attraction.falloff,
            max_age: c.population.max_age,
            offscreen_margin: c.population.offscreen_margin,
        }
    }

    fn fire(&mut self, due: Duration, action: PendingAction) {
        match action {
            PendingAction::BurstBean { origin } => {
                let jitter = Vec2::new(
                    (self.rng.gen::<f32>() - 0.5) * self.config.burst.jitter_x,
                    (self.rng.gen::<f32>() - 0.5) * self.config.burst.jitter_y,
                );
                let category = self.config.burst.weights.choose(&mut self.rng);
                let at = origin + jitter;
                self.spawn(at.x, at.y, category);
            }
            PendingAction::ShowerBean => {
                let x = self.random_x();
                let category = self.config.shower.weights.choose(&mut self.rng);
                self.spawn(x, self.config.shower.spawn_y, category);
            }
            PendingAction::Shower { count } => self.schedule_shower_from(due, count),
        }
    }

    fn schedule_shower_from(&mut self, start: Duration, count: u32) {
        let stagger = Duration::from_millis(self.config.shower.stagger_ms);
        for i in 0..count {
            self.scheduler
                .schedule_at(start + stagger * i, PendingAction::ShowerBean);
        }
    }

    fn run_ambient(&mut self) {
        let now = self.scheduler.now();
        loop {
            let Some(task) = &self.ambient else {
                return;
            };
            if task.token.is_cancelled() {
                debug!("Ambient spawn loop cancelled");
                self.ambient = None;
                return;
            }
            if task.next_due > now {
                return;
            }
            let fired_at = task.next_due;
            let ambient = &self.config.ambient;
            if self.rng.gen_bool(probability(ambient.chance)) {
                let category = ambient.weights.choose(&mut self.rng);
                let y = ambient.spawn_y;
                let x = self.random_x();
                self.spawn(x, y, category);
            }
            let delay = self.ambient_delay();
            if let Some(task) = &mut self.ambient {
                task.next_due = fired_at + delay;
            }
        }
    }

    fn ambient_delay(&mut self) -> Duration {
        let a = &self.config.ambient;
        let ms = if a.max_delay_ms > a.min_delay_ms {
            self.rng.gen_range(a.min_delay_ms..a.max_delay_ms)
        } else {
            a.min_delay_ms
        };
        Duration::from_millis(ms.max(1))
    }

    fn run_scroll(&mut self) {
        match self.scroll_due {
            Some(due) if due <= self.scheduler.now() => {
                self.scroll_due = None;
                if self.rng.gen_bool(probability(self.config.scroll.chance)) {
                    let x = self.random_x();
                    self.spawn(x, self.config.scroll.spawn_y, BeanCategory::Normal);
                }
            }
            _ => {}
        }
    }

    fn random_x(&mut self) -> f32 {
        self.rng.gen::<f32>() * self.viewport.width
    }

    fn publish_fill_level(&mut self) {
        let level = self.fill_level();
        self.surface.show_fill_level(level);
    }

    // ---------------- Queries ----------------

    pub fn beans(&self) -> impl Iterator<Item = &Bean> {
        self.beans.iter()
    }

    pub fn bean(&self, id: BeanId) -> Option<&Bean> {
        self.beans.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    pub fn fill_level(&self) -> FillLevel {
        FillLevel::new(self.beans.len(), self.config.population.max_beans)
    }

    /// Topmost (most recently spawned) bean under `point`.
    pub fn bean_at(&self, point: Vec2) -> Option<&Bean> {
        let size = self.config.population.bean_size;
        self.beans.iter().rev().find(|b| b.contains(point, size))
    }

    /// A random trivia fact, if trivia is enabled and the deck is not empty.
    pub fn pick_trivia(&mut self) -> Option<&str> {
        if !self.config.trivia.enabled {
            return None;
        }
        self.config
            .trivia
            .facts
            .choose(&mut self.rng)
            .map(String::as_str)
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn pending_spawns(&self) -> usize {
        self.scheduler.len()
    }

    pub fn ambient_scheduled(&self) -> bool {
        self.ambient
            .as_ref()
            .is_some_and(|t| !t.token.is_cancelled())
    }

    pub fn config(&self) -> &BeanConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

/// Configured chance as something `gen_bool` accepts; non-finite values never fire.
fn probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn sample_range<R: Rng>(rng: &mut R, range: &SpawnRange<f32>) -> f32 {
    // Infinite bounds or span make `gen_range` panic.
    if range.max > range.min && (range.max - range.min).is_finite() {
        rng.gen_range(range.min..range.max)
    } else if range.min.is_finite() {
        range.min
    } else {
        0.0
    }
}
