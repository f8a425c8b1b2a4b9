// manifestrs/src/sync/mod.rs

pub mod changes;
pub mod detector;
pub mod roots;

pub use changes::ChangeDetectionResult;
pub use detector::ChangeDetector;
pub use roots::{find_root_component_ids, root_components, RootComponent};
