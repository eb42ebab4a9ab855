// ── Runtime audit configuration ──
//
// Describes how to reach the backing services and how to cache. The CLI
// builds an `AuditorConfig` from the config file and flags and hands it
// in; core never reads config files.

use rdsdrift_api::AwsCliConfig;

use crate::cache::CacheConfig;

/// Instances resolved at once during a fleet audit.
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct AuditorConfig {
    /// How to invoke the AWS command line.
    pub aws: AwsCliConfig,
    /// Where and for how long to cache declared settings.
    pub cache: CacheConfig,
    /// Upper bound on concurrent instance resolutions. Zero is treated as one.
    pub concurrency: usize,
}
