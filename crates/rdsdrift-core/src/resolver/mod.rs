// ── Source resolvers ──
//
// Two symmetric providers of a SettingSet behind one capability trait.
// The caller picks the implementation from the kind of source requested;
// neither resolver caches (the cache layer wraps the declared one).

mod live;
mod template;

use std::future::Future;

pub use live::LiveResolver;
pub use template::TemplateResolver;

use crate::error::CoreError;
use crate::model::{SettingScope, SettingSet};

/// Something that can produce the settings of a source.
pub trait SettingsResolver: Send + Sync {
    /// The kind of source this resolver understands.
    type Source: ?Sized + Sync;

    /// Resolve the settings inside `scope`. Names in scope that the source
    /// does not report are simply absent from the result.
    fn resolve(
        &self,
        source: &Self::Source,
        scope: &SettingScope,
    ) -> impl Future<Output = Result<SettingSet, CoreError>> + Send;
}
