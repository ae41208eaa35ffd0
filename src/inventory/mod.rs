//! Inventory domain: item records, their in-memory store, and the service driving both.

mod service;
pub mod store;
pub mod types;

pub use service::{InventoryApi, InventoryService};
pub use store::InventoryStore;
pub use types::{
    DEFAULT_PHOTO_CONTENT_TYPE, InventoryError, Item, ItemPatch, NewItem, PhotoBlob, PhotoUpload,
    SearchRequest,
};
