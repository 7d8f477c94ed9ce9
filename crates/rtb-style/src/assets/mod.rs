//! Assets referenced by compiled styles.

mod registry;

pub use registry::{
    AssetKind, AssetLocation, AssetOwner, AssetReference, AssetRegistry, AssetSource,
    EmbeddedAsset, ExternalAsset, sanitize_identifier,
};
