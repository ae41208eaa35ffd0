//! Core data types and error definitions for the inventory service.

use crate::photos::{PhotoStorageError, UPLOADS_ROUTE};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Content type assumed for photos uploaded without one.
pub const DEFAULT_PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// Errors emitted by inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// A required field was missing or empty.
    #[error("Bad Request: {0}")]
    Validation(String),
    /// No item (or no photo) exists for the requested identifier.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Reading or writing a photo file failed.
    #[error("Photo storage failed: {0}")]
    Storage(#[from] PhotoStorageError),
}

impl InventoryError {
    pub(crate) fn item_not_found(id: &str) -> Self {
        Self::NotFound(format!("no inventory item with id '{id}'"))
    }
}

/// A single registered inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Item {
    /// Identifier assigned at registration; never changes afterwards.
    pub id: String,
    /// Human readable item name.
    pub name: String,
    /// Free-form description, empty when none was given.
    pub description: String,
    /// On-disk location of the stored photo, if any.
    ///
    /// Serialized as `uploads/<file name>`, the path the file is served under, so the
    /// server's directory layout never leaves the process.
    #[serde(rename = "photo", serialize_with = "serialize_photo_ref")]
    #[schemars(with = "Option<String>")]
    pub photo_path: Option<PathBuf>,
    /// Content type the photo was uploaded with.
    #[serde(skip)]
    pub photo_content_type: Option<String>,
}

/// Public reference of a stored photo, relative to the server root.
fn photo_ref(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    Some(format!("{}/{file_name}", UPLOADS_ROUTE.trim_start_matches('/')))
}

fn serialize_photo_ref<S>(path: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match path.as_deref().and_then(photo_ref) {
        Some(reference) => serializer.serialize_some(&reference),
        None => serializer.serialize_none(),
    }
}

/// Binary photo received from a client.
#[derive(Debug, Clone, Default)]
pub struct PhotoUpload {
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Content type declared by the client.
    pub content_type: Option<String>,
    /// Original file name declared by the client.
    pub file_name: Option<String>,
}

impl PhotoUpload {
    /// Browsers submit an empty, unnamed file part when no file was picked.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.file_name.as_deref().is_none_or(str::is_empty)
    }
}

/// Input accepted by the registration operation.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    /// Item name; required and non-empty.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional photo.
    pub photo: Option<PhotoUpload>,
}

/// Field update body for `PUT /inventory/:id`.
///
/// Empty strings are treated like absent values, so a field cannot be cleared through an update.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ItemPatch {
    /// Replacement name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Photo content served back to clients.
#[derive(Debug, Clone)]
pub struct PhotoBlob {
    /// Content type to advertise.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Parameters of a search by identifier.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Identifier to look up.
    pub id: String,
    /// Append a photo link to the returned description when the item has a photo.
    pub include_photo: bool,
}
