pub mod swish;

pub use swish::Swish;
