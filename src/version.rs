// Build-time identity from Cargo.toml

/// Package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// User agent sent to the collector, e.g. "resmon/0.3.0".
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}
