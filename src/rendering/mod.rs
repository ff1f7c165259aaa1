pub mod beans;
pub mod camera;
pub mod palette;
pub mod readout;
