//! Outbound collaborators: item metadata feed and remote loot store.

pub mod metadata;
pub mod persistence;

pub use metadata::{
    HttpItemMetadataProvider, ItemMetadata, ItemMetadataProvider, MetadataError,
    StaticItemMetadataProvider,
};
pub use persistence::{ClientError, HttpPersistenceClient, PersistenceClient};
