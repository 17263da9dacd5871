//! # mrepo-core: Record Types for the Munki Repository Server
//!
//! This crate defines the record model every other crate in the workspace
//! depends on. It performs no I/O and has no internal crate dependencies,
//! only `serde`, `serde_json`, `plist`, and `thiserror` from the ecosystem.
//!
//! ## Layers
//!
//! 1. **Records.** [`Manifest`] and [`PkgsInfo`] implement [`Record`]. Their
//!    identity (`filename`) lives outside the serialized body.
//!
//! 2. **Codec.** [`codec::encode`] and [`codec::decode`] move records between
//!    JSON and XML plist. Persistence always uses plist; the HTTP layer
//!    negotiates per request.
//!
//! 3. **Collections.** [`PkgsInfoCollection`] answers catalog-membership and
//!    name queries over a single repository walk.
//!
//! 4. **Views.** The [`View`] trait renders records, collections, catalogs and
//!    [`ErrorResponse`] bodies in a negotiated [`MediaType`].

pub mod codec;
pub mod collection;
pub mod error;
pub mod manifest;
pub mod pkgsinfo;
pub mod record;
pub mod view;

// Re-export primary types at crate root for ergonomic imports.
pub use codec::MediaType;
pub use collection::{
    Collection, ManifestCollection, PkgsInfoCollection, RecordIndex, ALL_CATALOG,
};
pub use error::{CodecError, ValidationError, ViewError};
pub use manifest::{ConditionalItem, Manifest, ManifestPatch};
pub use pkgsinfo::{CatalogEntry, PkgsInfo, PkgsInfoMetadata};
pub use record::{FilenameField, Record, RecordKind};
pub use view::{render, ErrorResponse, Rendered, View};
