//! Processing units and incremental validity bookkeeping

pub mod registry;
pub mod validity;

pub use registry::ProcessingUnitRegistry;
pub use validity::ValidityCache;
