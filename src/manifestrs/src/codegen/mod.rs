// manifestrs/src/codegen/mod.rs

pub mod react;

use crate::error::Result;
use crate::manifest::{Component, LogicContext, Manifest};
use crate::sync::RootComponent;

pub use react::ReactGenerator;

/// Turns manifest content into source text.
///
/// Implementations must be deterministic: identical inputs give identical
/// output, otherwise hash-based skipping is meaningless.
pub trait CodeGenerator: Send + Sync {
    /// Source of the file generated for one component
    fn generate_component(&self, component: &Component, manifest: &Manifest) -> Result<String>;

    /// Source of the entry point composing the root components
    fn generate_entry_point(
        &self,
        roots: &[RootComponent],
        logic: Option<&LogicContext>,
    ) -> Result<String>;

    /// Source of the bootstrap file mounting the entry point
    fn generate_bootstrap(&self) -> Result<String>;
}
