use thiserror::Error;

/// Errors that can arise in the price registry and its loader pipeline.
///
/// Loaders never let these escape a `load()` call — they are captured into
/// the per-source report — but the parsing and persistence helpers they are
/// built from surface them normally.
#[derive(Debug, Error)]
pub enum PriceError {
    /// Wrapper around IO errors (catalog files, pack archives, overrides).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON parse/serialize errors.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Returned when a pack manifest cannot be parsed.
    #[error("bad pack manifest at {path}: {reason}")]
    BadManifest { path: String, reason: String },

    /// Returned when an item identifier is not `namespace:name`.
    #[error("invalid item id: {0}")]
    InvalidItemId(String),

    /// A declared embedded catalog path is missing from its pack.
    #[error("pack {pack} has no price catalog at {path}")]
    MissingPackCatalog { pack: String, path: String },

    /// Writing the user override file failed.
    #[error("override persistence failed: {0}")]
    Persist(String),
}
