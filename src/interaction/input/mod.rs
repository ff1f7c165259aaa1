pub mod input_interaction;

pub use input_interaction::{BeanInputPlugin, ShowTrivia, TiltInput};
