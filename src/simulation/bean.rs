//! Bean entity, categories and the weighted category tables spawn sources draw from.

use std::fmt;

use bevy::math::Vec2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Deserialize;

/// Opaque identity of a bean. Unique for the lifetime of one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeanId(pub(crate) u64);

impl BeanId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BeanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bean#{}", self.0)
    }
}

/// Cosmetic bean flavour. Has no effect on physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BeanCategory {
    #[default]
    Normal,
    Premium,
    Raw,
    Roasted,
}

impl BeanCategory {
    pub const ALL: [BeanCategory; 4] = [
        BeanCategory::Normal,
        BeanCategory::Premium,
        BeanCategory::Raw,
        BeanCategory::Roasted,
    ];

    /// Hover text shown for a bean of this category.
    pub fn tooltip(self) -> &'static str {
        match self {
            BeanCategory::Normal => "Coffee bean - click for trivia!",
            BeanCategory::Premium => "Premium coffee bean!",
            BeanCategory::Raw => "Raw green coffee bean",
            BeanCategory::Roasted => "Perfectly roasted bean",
        }
    }
}

/// A live bean. Position and velocity are in page pixels (origin top-left, y down),
/// velocity per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Bean {
    pub id: BeanId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub category: BeanCategory,
    /// Horizontal wall reflections so far.
    pub bounces: u32,
    /// Physics ticks survived.
    pub age: u32,
}

impl Bean {
    pub fn new(id: BeanId, position: Vec2, velocity: Vec2, category: BeanCategory) -> Self {
        Self {
            id,
            position,
            velocity,
            category,
            bounces: 0,
            age: 0,
        }
    }

    /// Hit test against the bean's square footprint (`position` is its top-left corner).
    pub fn contains(&self, point: Vec2, size: f32) -> bool {
        let d = point - self.position;
        d.x >= 0.0 && d.y >= 0.0 && d.x <= size && d.y <= size
    }
}

/// Relative weight per category. Categories left out of a config table weigh 0;
/// non-positive weights never win.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CategoryWeights {
    #[serde(default)]
    pub normal: f32,
    #[serde(default)]
    pub premium: f32,
    #[serde(default)]
    pub raw: f32,
    #[serde(default)]
    pub roasted: f32,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::only(BeanCategory::Normal)
    }
}

impl CategoryWeights {
    pub const ZERO: CategoryWeights = CategoryWeights {
        normal: 0.0,
        premium: 0.0,
        raw: 0.0,
        roasted: 0.0,
    };

    pub fn only(category: BeanCategory) -> Self {
        Self::ZERO.with(category, 1.0)
    }

    pub fn with(mut self, category: BeanCategory, weight: f32) -> Self {
        *self.slot_mut(category) = weight;
        self
    }

    pub fn weight(&self, category: BeanCategory) -> f32 {
        match category {
            BeanCategory::Normal => self.normal,
            BeanCategory::Premium => self.premium,
            BeanCategory::Raw => self.raw,
            BeanCategory::Roasted => self.roasted,
        }
    }

    fn slot_mut(&mut self, category: BeanCategory) -> &mut f32 {
        match category {
            BeanCategory::Normal => &mut self.normal,
            BeanCategory::Premium => &mut self.premium,
            BeanCategory::Raw => &mut self.raw,
            BeanCategory::Roasted => &mut self.roasted,
        }
    }

    /// Sum of the usable (positive, finite) weights.
    pub fn total(&self) -> f32 {
        BeanCategory::ALL
            .iter()
            .map(|c| sanitize(self.weight(*c)))
            .sum()
    }

    pub fn probability(&self, category: BeanCategory) -> f32 {
        let total = self.total();
        if total <= 0.0 {
            return if category == BeanCategory::Normal { 1.0 } else { 0.0 };
        }
        sanitize(self.weight(category)) / total
    }

    /// Weighted draw. A table with no usable weight always yields `Normal`.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> BeanCategory {
        let weights = BeanCategory::ALL.map(|c| sanitize(self.weight(c)));
        match WeightedIndex::new(weights) {
            Ok(dist) => BeanCategory::ALL[dist.sample(rng)],
            Err(_) => BeanCategory::Normal,
        }
    }
}

fn sanitize(w: f32) -> f32 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}
