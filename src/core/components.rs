use std::time::Duration;

use bevy::prelude::*;

use crate::simulation::{BeanCategory, BeanId, TransientFlag};

/// Sprite entity standing in for one simulated bean.
#[derive(Component, Debug, Clone, Copy)]
pub struct BeanVisual {
    pub id: BeanId,
    pub category: BeanCategory,
}

/// Bouncing / landing squash state; each slot clears itself when its timer runs out.
#[derive(Component, Debug, Default, Clone)]
pub struct TransientFlags {
    pub bouncing: Option<Timer>,
    pub landing: Option<Timer>,
}

impl TransientFlags {
    pub fn with(flag: TransientFlag, duration: Duration) -> Self {
        let mut flags = Self::default();
        flags.set(flag, duration);
        flags
    }

    /// Restarts the flag's timer (setting a live flag again extends it).
    pub fn set(&mut self, flag: TransientFlag, duration: Duration) {
        let timer = Some(Timer::new(duration, TimerMode::Once));
        match flag {
            TransientFlag::Bouncing => self.bouncing = timer,
            TransientFlag::Landing => self.landing = timer,
        }
    }

    pub fn is_active(&self, flag: TransientFlag) -> bool {
        match flag {
            TransientFlag::Bouncing => self.bouncing.is_some(),
            TransientFlag::Landing => self.landing.is_some(),
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        for slot in [&mut self.bouncing, &mut self.landing] {
            if slot.as_mut().is_some_and(|t| t.tick(dt).finished()) {
                *slot = None;
            }
        }
    }

    /// Sprite scale for the current state. Landing wins over bouncing.
    pub fn squash(&self) -> Vec2 {
        if self.landing.is_some() {
            Vec2::new(1.3, 0.7)
        } else if self.bouncing.is_some() {
            Vec2::new(0.8, 1.2)
        } else {
            Vec2::ONE
        }
    }
}

/// Rising, fading puff of steam.
#[derive(Component, Debug)]
pub struct SteamPuff {
    pub timer: Timer,
}

/// Trivia popup removed when its timer finishes.
#[derive(Component, Debug)]
pub struct TriviaBubble {
    pub timer: Timer,
}

/// Inner bar of the fill gauge; its width tracks the fill percentage.
#[derive(Component)]
pub struct FillBar;

#[derive(Component)]
pub struct FillBarLabel;

#[derive(Component)]
pub struct BeanCountLabel;

/// Follows the pointer while it hovers a bean.
#[derive(Component)]
pub struct HoverTooltip;
