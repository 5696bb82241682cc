use serde::Serialize;

/// Compile-time facts about the running binary, reported on startup
///  and served from the status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub build_profile: &'static str,
    pub build_target: &'static str,
    pub build_timestamp: &'static str,
    pub version: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        build_profile: env!("RELAY_BUILD_PROFILE"),
        build_target: env!("RELAY_BUILD_TARGET"),
        build_timestamp: env!("RELAY_BUILD_TIMESTAMP"),
        version: env!("RELAY_REPO_VERSION"),
    }
}
