/// Build metadata stamped into the binary by `build.rs`.
///
/// Construct one with the [`build_info!`](crate::build_info) macro to capture
/// the metadata of the invoking crate, or call [`build_info`] for this
/// crate's own metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_profile: &'static str,
    pub build_features: &'static str,
    pub build_timestamp: &'static str,
    pub rust_version: &'static str,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.version)?;
        writeln!(f, "  profile:  {}", self.build_profile)?;
        writeln!(f, "  features: {}", self.build_features)?;
        writeln!(f, "  rustc:    {}", self.rust_version)?;
        write!(f, "  built:    {}", self.build_timestamp)
    }
}

#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo {
            version: env!("REPO_VERSION"),
            build_profile: env!("BUILD_PROFILE"),
            build_features: env!("BUILD_FEATURES"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rust_version: env!("RUST_VERSION"),
        }
    };
}

/// Build metadata of this crate.
pub fn build_info() -> BuildInfo {
    crate::build_info!()
}
