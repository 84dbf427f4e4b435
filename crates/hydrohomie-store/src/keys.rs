//! Fixed storage keys.
//!
//! These names are the on-disk layout shared with existing profiles, so
//! they must not change.

/// JSON map of username → `User`.
pub const DEMO_USERS: &str = "demoUsers";

/// `"true"` or `"false"`.
pub const IS_AUTHENTICATED: &str = "isAuthenticated";

/// JSON `User` or `null`.
pub const CURRENT_USER: &str = "currentUser";

/// JSON array of per-user hydration records.
pub const ALL_HYDRATION_DATA: &str = "HydroHomie_all_users_hydration_data";

/// JSON `{data, timestamp}` for the last fetched encouragement.
pub const ENCOURAGEMENT_CACHE: &str = "encouragement_cache";
