use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = zikr_api::id::prefixed_ulid("bkg");
/// assert!(id.starts_with("bkg_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new().to_string())
}

/// Well-known ID prefixes.
///
/// `usr`, `grp`, `pora` and `zikr` rows are minted by the CRUD application;
/// they are listed here so fixtures and migrations agree on the shape.
pub mod prefix {
    pub const USER: &str = "usr";
    pub const GROUP: &str = "grp";
    pub const PORA: &str = "pora";
    pub const ZIKR: &str = "zikr";
    pub const BOOKING: &str = "bkg";
    pub const NOTIFICATION: &str = "ntf";
    pub const ZIKR_COUNT: &str = "zkc";
    pub const FINISHED_COUNT: &str = "fpc";
    pub const ZIKR_ACTIVITY: &str = "gza";
    pub const CONNECTION: &str = "conn";
}
