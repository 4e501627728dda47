//! Pipeline module - load, prepare, split, resample, fit and evaluate

pub mod clean;
pub mod encode;
pub mod error;
pub mod evaluate;
pub mod experiment;
pub mod explore;
pub mod loader;
pub mod model;
pub mod resample;
pub mod scale;
pub mod schema;
pub mod split;
pub mod target;

pub use clean::*;
pub use encode::*;
pub use error::*;
pub use evaluate::*;
pub use experiment::*;
pub use explore::*;
pub use loader::*;
pub use model::*;
pub use resample::*;
pub use scale::*;
pub use split::*;
pub use target::*;
