pub mod game;
pub mod headless;
