// ── Domain model ──
//
// Canonical types shared by the resolvers, the cache and the diff engine.

pub mod drift;
pub mod instance;
pub mod setting;
pub mod source;

pub use drift::DriftRecord;
pub use instance::InstanceSummary;
pub use setting::{Setting, SettingScope, SettingSet, is_formula};
pub use source::{ConnectionDescriptor, DeclaredSource, SourceIdentity, SourceKind, SourceSpec};
