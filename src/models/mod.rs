pub mod annotation;

pub use annotation::*;
