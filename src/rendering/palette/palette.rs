use bevy::prelude::*;

use crate::simulation::BeanCategory;

pub const BACKGROUND: Color = Color::srgb(0.96, 0.93, 0.88);

pub const BEAN_COLORS: [Color; 4] = [
    Color::srgb(0.44, 0.26, 0.13), // Normal: medium roast brown
    Color::srgb(0.85, 0.65, 0.20), // Premium: gold
    Color::srgb(0.55, 0.62, 0.35), // Raw: green coffee
    Color::srgb(0.24, 0.13, 0.07), // Roasted: dark roast
];

pub const STEAM: Color = Color::srgba(1.0, 1.0, 1.0, 0.8);
pub const FILL_TRACK: Color = Color::srgba(0.24, 0.13, 0.07, 0.15);
pub const FILL_BAR: Color = Color::srgb(0.44, 0.26, 0.13);
pub const TEXT: Color = Color::srgb(0.2, 0.12, 0.06);
pub const POPUP_BG: Color = Color::srgba(0.24, 0.13, 0.07, 0.92);
pub const POPUP_TEXT: Color = Color::srgb(0.98, 0.95, 0.9);

#[inline]
pub fn color_for_category(category: BeanCategory) -> Color {
    let i = BeanCategory::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or(0);
    BEAN_COLORS[i % BEAN_COLORS.len()]
}
