//! Capability boundary between the simulation and whatever draws it.
//!
//! The simulation never touches a rendering target directly. Every visual side effect
//! goes through a [`BeanSurface`], keyed by [`BeanId`]. The rule is that only the
//! simulation that attached a bean's visual detaches it.

use std::collections::HashSet;
use std::time::Duration;

use bevy::math::Vec2;

use super::bean::{Bean, BeanCategory, BeanId};

/// Short-lived visual state a surface clears by itself once `duration` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientFlag {
    Bouncing,
    Landing,
}

/// Population expressed against capacity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FillLevel {
    pub count: usize,
    pub capacity: usize,
    /// `count / capacity * 100`, capped at 100.
    pub percent: f32,
}

impl FillLevel {
    pub fn new(count: usize, capacity: usize) -> Self {
        let percent = if capacity == 0 {
            0.0
        } else {
            (count as f32 / capacity as f32 * 100.0).min(100.0)
        };
        Self {
            count,
            capacity,
            percent,
        }
    }

    /// Text for the fill bar, e.g. `45%`.
    pub fn percent_label(&self) -> String {
        format!("{}%", self.percent.round() as u32)
    }

    /// Text for the counter, e.g. `9 beans`.
    pub fn count_label(&self) -> String {
        format!("{} beans", self.count)
    }
}

pub trait BeanSurface {
    /// `false` when there is nowhere to attach visuals; spawns then only update the
    /// fill level.
    fn has_container(&self) -> bool {
        true
    }
    fn attach(&mut self, bean: &Bean);
    fn detach(&mut self, id: BeanId);
    fn set_position(&mut self, id: BeanId, position: Vec2);
    fn set_transient_flag(&mut self, id: BeanId, flag: TransientFlag, duration: Duration);
    fn puff_steam(&mut self, position: Vec2);
    fn show_fill_level(&mut self, level: FillLevel);
}

/// One visual side effect, as recorded or queued by a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Attach {
        id: BeanId,
        category: BeanCategory,
        position: Vec2,
    },
    Detach {
        id: BeanId,
    },
    SetPosition {
        id: BeanId,
        position: Vec2,
    },
    SetFlag {
        id: BeanId,
        flag: TransientFlag,
        duration: Duration,
    },
    Steam {
        position: Vec2,
    },
    Fill(FillLevel),
}

/// A surface with no container at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl BeanSurface for NullSurface {
    fn has_container(&self) -> bool {
        false
    }
    fn attach(&mut self, _bean: &Bean) {}
    fn detach(&mut self, _id: BeanId) {}
    fn set_position(&mut self, _id: BeanId, _position: Vec2) {}
    fn set_transient_flag(&mut self, _id: BeanId, _flag: TransientFlag, _duration: Duration) {}
    fn puff_steam(&mut self, _position: Vec2) {}
    fn show_fill_level(&mut self, _level: FillLevel) {}
}

/// Headless surface that keeps a log of every command and checks handle ownership.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub commands: Vec<SurfaceCommand>,
    container: bool,
    live: HashSet<BeanId>,
    violations: Vec<String>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            container: true,
            live: HashSet::new(),
            violations: Vec::new(),
        }
    }
}

impl RecordingSurface {
    pub fn without_container() -> Self {
        Self {
            container: false,
            ..Self::default()
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: BeanId) -> bool {
        self.live.contains(&id)
    }

    /// Attach/detach calls that broke the one-visual-per-bean rule.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    pub fn steam_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::Steam { .. }))
            .count()
    }

    pub fn flags_for(&self, id: BeanId) -> Vec<(TransientFlag, Duration)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::SetFlag {
                    id: flagged,
                    flag,
                    duration,
                } if *flagged == id => Some((*flag, *duration)),
                _ => None,
            })
            .collect()
    }

    pub fn last_fill_level(&self) -> Option<FillLevel> {
        self.commands.iter().rev().find_map(|c| match c {
            SurfaceCommand::Fill(level) => Some(*level),
            _ => None,
        })
    }

    pub fn clear_log(&mut self) {
        self.commands.clear();
    }
}

impl BeanSurface for RecordingSurface {
    fn has_container(&self) -> bool {
        self.container
    }

    fn attach(&mut self, bean: &Bean) {
        if !self.live.insert(bean.id) {
            self.violations.push(format!("{} attached twice", bean.id));
        }
        self.commands.push(SurfaceCommand::Attach {
            id: bean.id,
            category: bean.category,
            position: bean.position,
        });
    }

    fn detach(&mut self, id: BeanId) {
        if !self.live.remove(&id) {
            self.violations.push(format!("{id} detached while not attached"));
        }
        self.commands.push(SurfaceCommand::Detach { id });
    }

    fn set_position(&mut self, id: BeanId, position: Vec2) {
        if !self.live.contains(&id) {
            self.violations.push(format!("{id} moved while not attached"));
        }
        self.commands.push(SurfaceCommand::SetPosition { id, position });
    }

    fn set_transient_flag(&mut self, id: BeanId, flag: TransientFlag, duration: Duration) {
        self.commands
            .push(SurfaceCommand::SetFlag { id, flag, duration });
    }

    fn puff_steam(&mut self, position: Vec2) {
        self.commands.push(SurfaceCommand::Steam { position });
    }

    fn show_fill_level(&mut self, level: FillLevel) {
        self.commands.push(SurfaceCommand::Fill(level));
    }
}
