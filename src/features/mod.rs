//! Calendar feature engineering and future-row assembly.

pub mod assembler;
/// Sine/cosine calendar encoding.
pub mod cyclic;
pub mod pipeline;
pub mod schema;
/// Integer calendar features.
pub mod temporal;

pub use assembler::FeatureAssembler;
pub use cyclic::CyclicFeatures;
pub use pipeline::build_feature_table;
pub use schema::{CarryForwardPolicy, FeatureKind, FeatureSchema};
pub use temporal::TemporalFeatures;
