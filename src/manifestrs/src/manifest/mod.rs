// manifestrs/src/manifest/mod.rs

pub mod component;
pub mod logic;
pub mod model;

pub use component::{Component, ComponentId, DataType, PropertyDefinition, Styling};
pub use logic::{LogicContext, LogicFlow};
pub use model::Manifest;
