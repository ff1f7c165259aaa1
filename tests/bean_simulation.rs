use bevy::math::Vec2;

use bean_drop::core::config::BeanConfig;
use bean_drop::simulation::{
    BeanCategory, BeanSimulation, RecordingSurface, SurfaceCommand, TransientFlag,
};

fn config() -> BeanConfig {
    let mut cfg = BeanConfig {
        seed: Some(11),
        ..Default::default()
    };
    cfg.attraction.enabled = false;
    cfg
}

fn sim_with(cfg: BeanConfig, width: f32, height: f32) -> BeanSimulation<RecordingSurface> {
    let mut sim = BeanSimulation::new(cfg, RecordingSurface::default());
    sim.set_viewport(width, height);
    sim.start();
    sim
}

fn still(sim: &mut BeanSimulation<RecordingSurface>, x: f32, y: f32, vx: f32, vy: f32) {
    sim.spawn_with_velocity(Vec2::new(x, y), Vec2::new(vx, vy), BeanCategory::Normal)
        .expect("container present");
}

#[test]
fn capacity_evicts_oldest_first() {
    let mut cfg = config();
    cfg.population.max_beans = 3;
    let mut sim = sim_with(cfg, 800.0, 600.0);

    let ids: Vec<_> = (0..4)
        .map(|i| {
            sim.spawn(i as f32 * 50.0, 10.0, BeanCategory::Normal)
                .expect("spawned")
        })
        .collect();

    assert_eq!(sim.len(), 3);
    assert!(sim.bean(ids[0]).is_none());
    assert!(!sim.surface().is_live(ids[0]));
    let live: Vec<_> = sim.beans().map(|b| b.id).collect();
    assert_eq!(live, ids[1..].to_vec());

    let fill = sim.surface().last_fill_level().expect("fill published");
    assert_eq!((fill.count, fill.capacity), (3, 3));
    assert_eq!(fill.percent, 100.0);
    assert!(sim.surface().violations().is_empty());
}

#[test]
fn ids_are_unique_and_increasing() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    let a = sim.spawn(0.0, 0.0, BeanCategory::Normal).unwrap();
    let b = sim.spawn(0.0, 0.0, BeanCategory::Normal).unwrap();
    sim.remove(a);
    let c = sim.spawn(0.0, 0.0, BeanCategory::Normal).unwrap();
    assert!(a < b && b < c);
}

#[test]
fn spawn_velocity_comes_from_configured_ranges() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    for _ in 0..20 {
        sim.spawn(100.0, 100.0, BeanCategory::Raw);
    }
    for bean in sim.beans() {
        assert!((-2.0..2.0).contains(&bean.velocity.x));
        assert!((0.0..2.0).contains(&bean.velocity.y));
        assert_eq!(bean.category, BeanCategory::Raw);
        assert_eq!(bean.age, 0);
    }
}

#[test]
fn age_grows_by_one_per_tick() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    still(&mut sim, 100.0, 100.0, 0.0, 0.0);
    still(&mut sim, 300.0, 50.0, 1.0, 0.0);
    for _ in 0..5 {
        sim.tick();
    }
    assert!(sim.beans().all(|b| b.age == 5));
}

#[test]
fn free_fall_matches_closed_form() {
    let mut sim = sim_with(config(), 1280.0, 100_000.0);
    still(&mut sim, 100.0, -20.0, 0.0, 0.0);
    let n = 50;
    for _ in 0..n {
        sim.tick();
    }
    let bean = sim.beans().next().unwrap();

    let (g, f) = (0.5_f64, 0.99_f64);
    let expected_y = -20.0 + g / (1.0 - f) * (n as f64 - f * (1.0 - f.powi(n)) / (1.0 - f));
    let expected_vy = g * f * (1.0 - f.powi(n)) / (1.0 - f);
    assert!(
        (bean.position.y as f64 - expected_y).abs() < 0.05,
        "y {} vs {expected_y}",
        bean.position.y
    );
    assert!((bean.velocity.y as f64 - expected_vy).abs() < 1e-3);
    assert_eq!(bean.position.x, 100.0);
    assert_eq!(bean.bounces, 0);
}

#[test]
fn floor_reflects_and_flags_landing() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    still(&mut sim, 100.0, 575.0, 0.0, 5.0);
    let id = sim.beans().next().unwrap().id;
    sim.tick();

    let bean = sim.bean(id).unwrap();
    assert_eq!(bean.position.y, 580.0);
    assert!((bean.velocity.y - (-5.5 * 0.99 * 0.7)).abs() < 1e-4);
    assert_eq!(
        sim.surface().flags_for(id),
        vec![(TransientFlag::Landing, std::time::Duration::from_millis(500))]
    );
    // Slow landing: no steam.
    assert_eq!(sim.surface().steam_count(), 0);
}

#[test]
fn hard_landing_puffs_steam() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    still(&mut sim, 100.0, 570.0, 0.0, 10.0);
    sim.tick();
    assert_eq!(sim.surface().steam_count(), 1);
}

#[test]
fn walls_reflect_count_bounces_and_steam_once() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    still(&mut sim, 775.0, 100.0, 5.0, 4.0);
    let id = sim.beans().next().unwrap().id;
    sim.tick();

    let bean = sim.bean(id).unwrap();
    assert_eq!(bean.position.x, 780.0);
    assert!((bean.velocity.x - (-5.0 * 0.99 * 0.7)).abs() < 1e-4);
    assert_eq!(bean.bounces, 1);
    assert_eq!(sim.surface().steam_count(), 1);
    assert!(sim
        .surface()
        .flags_for(id)
        .iter()
        .any(|(flag, _)| *flag == TransientFlag::Bouncing));
}

#[test]
fn only_the_first_wall_contact_steams() {
    // max_x = 20: the bean crosses from the right wall to the left one in a few ticks.
    let mut sim = sim_with(config(), 40.0, 600.0);
    still(&mut sim, 15.0, 100.0, 5.0, 4.0);
    let id = sim.beans().next().unwrap().id;
    for _ in 0..10 {
        sim.tick();
    }
    let bean = sim.bean(id).unwrap();
    assert_eq!(bean.bounces, 2);
    assert!(bean.velocity.x > 0.0);
    assert_eq!(sim.surface().steam_count(), 1);
    let bounce_flags = sim
        .surface()
        .flags_for(id)
        .iter()
        .filter(|(flag, _)| *flag == TransientFlag::Bouncing)
        .count();
    assert_eq!(bounce_flags, 2);
}

#[test]
fn narrow_viewport_pins_beans_at_zero() {
    let mut sim = sim_with(config(), 10.0, 600.0);
    still(&mut sim, 5.0, 100.0, 3.0, 0.0);
    sim.tick();
    let bean = sim.beans().next().unwrap();
    assert_eq!(bean.position.x, 0.0);
}

#[test]
fn remove_is_idempotent() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    let id = sim.spawn(10.0, 10.0, BeanCategory::Normal).unwrap();
    assert!(sim.remove(id));
    assert!(!sim.remove(id));
    assert!(sim.is_empty());
    let detaches = sim
        .surface()
        .commands
        .iter()
        .filter(|c| matches!(c, SurfaceCommand::Detach { .. }))
        .count();
    assert_eq!(detaches, 1);
    assert!(sim.surface().violations().is_empty());
}

#[test]
fn beans_expire_after_max_age() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    still(&mut sim, 100.0, 580.0, 0.0, 0.0);
    for _ in 0..1000 {
        assert_eq!(sim.tick(), 0);
    }
    assert_eq!(sim.len(), 1);
    assert_eq!(sim.tick(), 1);
    assert!(sim.is_empty());
    assert_eq!(sim.surface().live_count(), 0);
}

#[test]
fn beans_below_the_offscreen_margin_expire() {
    let mut cfg = config();
    cfg.population.offscreen_margin = -50.0;
    let mut sim = sim_with(cfg, 800.0, 600.0);
    still(&mut sim, 100.0, 575.0, 0.0, 5.0);
    let id = sim.beans().next().unwrap().id;

    // Lands at y = 580, which is past 600 - 50.
    assert_eq!(sim.tick(), 1);
    assert!(sim.is_empty());
    assert!(!sim.surface().is_live(id));
    assert!(sim.surface().violations().is_empty());
}

#[test]
fn floor_clamp_keeps_beans_inside_the_default_margin() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    still(&mut sim, 100.0, 575.0, 0.0, 40.0);
    for _ in 0..20 {
        assert_eq!(sim.tick(), 0);
    }
    assert_eq!(sim.len(), 1);
}

#[test]
fn nan_gravity_bounds_leave_tilt_unclamped() {
    let mut cfg = config();
    cfg.physics.gravity_min = f32::NAN;
    cfg.physics.gravity_max = f32::NAN;
    let mut sim = sim_with(cfg, 800.0, 600.0);
    sim.handle_tilt(45.0);
    assert!((sim.gravity() - 0.65).abs() < 1e-6);
}

#[test]
fn stopped_simulation_does_not_move_beans() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    still(&mut sim, 100.0, 100.0, 1.0, 1.0);
    sim.stop();
    assert_eq!(sim.tick(), 0);
    let bean = sim.beans().next().unwrap();
    assert_eq!(bean.position, Vec2::new(100.0, 100.0));
    assert_eq!(bean.age, 0);
    sim.start();
    sim.tick();
    assert_eq!(sim.beans().next().unwrap().age, 1);
}

#[test]
fn pointer_attracts_nearby_beans() {
    let mut cfg = config();
    cfg.attraction.enabled = true;
    let mut sim = sim_with(cfg, 800.0, 600.0);
    still(&mut sim, 100.0, 100.0, 0.0, 0.0);
    still(&mut sim, 500.0, 100.0, 0.0, 0.0);
    sim.set_pointer(Vec2::new(150.0, 100.0));
    sim.tick();

    let beans: Vec<_> = sim.beans().cloned().collect();
    assert!((beans[0].position.x - 100.05).abs() < 1e-4);
    // Out of range.
    assert_eq!(beans[1].position.x, 500.0);
}

#[test]
fn pointer_on_the_bean_exerts_no_force() {
    let mut cfg = config();
    cfg.attraction.enabled = true;
    let mut sim = sim_with(cfg, 800.0, 600.0);
    still(&mut sim, 100.0, 100.0, 0.0, 0.0);
    sim.set_pointer(Vec2::new(100.0, 100.0));
    sim.tick();
    let bean = sim.beans().next().unwrap();
    assert_eq!(bean.position.x, 100.0);
    assert!(bean.velocity.x.is_finite());
}

#[test]
fn tilt_shifts_gravity_within_bounds() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    sim.handle_tilt(45.0);
    assert!((sim.gravity() - 0.65).abs() < 1e-6);
    sim.handle_tilt(90.0);
    assert!((sim.gravity() - 0.8).abs() < 1e-6);
    sim.handle_tilt(-90.0);
    assert!((sim.gravity() - 0.2).abs() < 1e-6);
    sim.handle_tilt(720.0);
    assert!((sim.gravity() - 0.8).abs() < 1e-6);
    sim.handle_tilt(f32::NAN);
    assert!((sim.gravity() - 0.8).abs() < 1e-6);
}

#[test]
fn missing_container_refuses_spawns() {
    let mut sim = BeanSimulation::new(config(), RecordingSurface::without_container());
    assert_eq!(sim.spawn(0.0, 0.0, BeanCategory::Normal), None);
    assert!(sim.is_empty());
    assert_eq!(sim.surface().live_count(), 0);
    assert_eq!(sim.surface().last_fill_level().map(|f| f.count), Some(0));
}

#[test]
fn zero_capacity_spawns_nothing() {
    let mut cfg = config();
    cfg.population.max_beans = 0;
    let mut sim = sim_with(cfg, 800.0, 600.0);
    assert_eq!(sim.spawn(0.0, 0.0, BeanCategory::Normal), None);
    assert_eq!(sim.fill_level().percent, 0.0);
}

#[test]
fn bean_at_prefers_most_recent() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    still(&mut sim, 100.0, 100.0, 0.0, 0.0);
    still(&mut sim, 110.0, 110.0, 0.0, 0.0);
    let newest = sim.beans().last().unwrap().id;
    assert_eq!(sim.bean_at(Vec2::new(115.0, 115.0)).map(|b| b.id), Some(newest));
    assert!(sim.bean_at(Vec2::new(300.0, 300.0)).is_none());
}

#[test]
fn trivia_respects_toggle() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    let fact = sim.pick_trivia().map(str::to_owned);
    assert!(fact.is_some());
    assert!(sim.config().trivia.facts.contains(&fact.unwrap()));

    let mut cfg = config();
    cfg.trivia.enabled = false;
    sim.set_config(cfg);
    assert!(sim.pick_trivia().is_none());
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut sim = sim_with(config(), 800.0, 600.0);
        sim.spawn_burst(400.0, 300.0, 5);
        for _ in 0..30 {
            sim.advance(std::time::Duration::from_millis(16));
            sim.tick();
        }
        sim.beans()
            .map(|b| (b.position, b.category))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn full_population_swaps_oldest_for_newest() {
    let mut sim = sim_with(config(), 800.0, 600.0);
    let first = sim.spawn(0.0, 0.0, BeanCategory::Normal).unwrap();
    for i in 1..20 {
        sim.spawn(i as f32 * 10.0, 0.0, BeanCategory::Normal);
    }
    assert_eq!(sim.len(), 20);
    let newest = sim.spawn(400.0, 0.0, BeanCategory::Premium).unwrap();
    assert_eq!(sim.len(), 20);
    assert!(sim.bean(first).is_none());
    assert_eq!(sim.bean(newest).map(|b| b.category), Some(BeanCategory::Premium));
    assert_eq!(sim.surface().live_count(), 20);
}
