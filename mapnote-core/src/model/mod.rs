mod annotation;
mod snapshot;

pub use annotation::*;
pub use snapshot::*;
