//! Inventory service coordinating the item store, photo files, and metrics.

use crate::{
    config::Config,
    inventory::{
        store::InventoryStore,
        types::{
            DEFAULT_PHOTO_CONTENT_TYPE, InventoryError, Item, ItemPatch, NewItem, PhotoBlob,
            PhotoUpload, SearchRequest,
        },
    },
    metrics::{InventoryMetrics, MetricsSnapshot},
    photos::PhotoStorage,
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Owns the in-memory store together with the photo directory it references.
///
/// Construct it once near process start and share it through an `Arc`. Nothing here is
/// process-global, so tests can run any number of isolated services side by side.
pub struct InventoryService {
    store: RwLock<InventoryStore>,
    photos: PhotoStorage,
    metrics: Arc<InventoryMetrics>,
    public_url: String,
}

/// Abstraction over inventory operations used by the HTTP surface.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Validate and insert a new item, storing its photo when one is supplied.
    async fn register(&self, new_item: NewItem) -> Result<Item, InventoryError>;

    /// Return every item in registration order.
    async fn list(&self) -> Vec<Item>;

    /// Fetch one item.
    async fn get(&self, id: &str) -> Result<Item, InventoryError>;

    /// Load the photo attached to an item.
    async fn get_photo(&self, id: &str) -> Result<PhotoBlob, InventoryError>;

    /// Overwrite the name and/or description of an item.
    async fn update_fields(&self, id: &str, patch: ItemPatch) -> Result<Item, InventoryError>;

    /// Replace the photo of an item. `None` leaves the item untouched.
    async fn update_photo(
        &self,
        id: &str,
        photo: Option<PhotoUpload>,
    ) -> Result<Item, InventoryError>;

    /// Remove an item and its photo file.
    async fn delete(&self, id: &str) -> Result<Item, InventoryError>;

    /// Look up an item by id, optionally annotating the returned copy with a photo link.
    async fn search(&self, request: SearchRequest) -> Result<Item, InventoryError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl InventoryService {
    /// Build a service storing photos in `photos` and linking them under `public_url`.
    pub fn new(photos: PhotoStorage, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self {
            store: RwLock::new(InventoryStore::new()),
            photos,
            metrics: Arc::new(InventoryMetrics::new()),
            public_url,
        }
    }

    /// Build a service from the runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        tracing::debug!(
            uploads_dir = %config.uploads_dir.display(),
            public_url = %config.public_url(),
            "Initializing inventory service"
        );
        Self::new(PhotoStorage::new(&config.uploads_dir), config.public_url())
    }

    #[cfg(test)]
    pub(crate) fn uploads_dir(&self) -> &Path {
        self.photos.root()
    }

    async fn store_photo(
        &self,
        photo: PhotoUpload,
    ) -> Result<(std::path::PathBuf, String), InventoryError> {
        let path = self.photos.save(&photo.bytes).await?;
        self.metrics.record_photo_stored();
        let content_type = photo
            .content_type
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_PHOTO_CONTENT_TYPE.to_string());
        Ok((path, content_type))
    }

    /// Deletion failures never fail the enclosing request; they are logged and counted.
    async fn discard_photo(&self, id: &str, path: &Path) {
        if let Err(err) = self.photos.remove(path).await {
            self.metrics.record_cleanup_failure();
            tracing::warn!(id, path = %path.display(), error = %err, "Failed to remove photo file");
        }
    }

    fn photo_url(&self, id: &str) -> String {
        format!("{}/inventory/{id}/photo", self.public_url)
    }
}

#[async_trait]
impl InventoryApi for InventoryService {
    async fn register(&self, new_item: NewItem) -> Result<Item, InventoryError> {
        let NewItem {
            name,
            description,
            photo,
        } = new_item;
        let name = name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| InventoryError::Validation("inventory_name is required".into()))?;

        let (photo_path, photo_content_type) = match photo.filter(|photo| !photo.is_empty()) {
            Some(photo) => {
                let (path, content_type) = self.store_photo(photo).await?;
                (Some(path), Some(content_type))
            }
            None => (None, None),
        };

        let item = Item {
            id: Uuid::new_v4().to_string(),
            name,
            description: description.unwrap_or_default(),
            photo_path,
            photo_content_type,
        };
        self.store.write().await.insert(item.clone());
        self.metrics.record_registration();
        tracing::info!(
            id = %item.id,
            name = %item.name,
            has_photo = item.photo_path.is_some(),
            "Item registered"
        );
        Ok(item)
    }

    async fn list(&self) -> Vec<Item> {
        self.store.read().await.list_all()
    }

    async fn get(&self, id: &str) -> Result<Item, InventoryError> {
        self.store
            .read()
            .await
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| InventoryError::item_not_found(id))
    }

    async fn get_photo(&self, id: &str) -> Result<PhotoBlob, InventoryError> {
        let item = self.get(id).await?;
        let path = item
            .photo_path
            .ok_or_else(|| InventoryError::NotFound(format!("item '{id}' has no photo")))?;
        let bytes = self.photos.read(&path).await.map_err(|err| {
            if err.is_not_found() {
                tracing::warn!(id, path = %path.display(), "Photo file is missing");
                InventoryError::NotFound(format!("photo for item '{id}' is missing"))
            } else {
                InventoryError::Storage(err)
            }
        })?;
        Ok(PhotoBlob {
            content_type: item
                .photo_content_type
                .unwrap_or_else(|| DEFAULT_PHOTO_CONTENT_TYPE.to_string()),
            bytes,
        })
    }

    async fn update_fields(&self, id: &str, patch: ItemPatch) -> Result<Item, InventoryError> {
        let mut store = self.store.write().await;
        let item = store
            .find_by_id_mut(id)
            .ok_or_else(|| InventoryError::item_not_found(id))?;
        // Empty strings count as absent, so fields can never be cleared here.
        if let Some(name) = patch.name.filter(|value| !value.is_empty()) {
            item.name = name;
        }
        if let Some(description) = patch.description.filter(|value| !value.is_empty()) {
            item.description = description;
        }
        let updated = item.clone();
        drop(store);

        self.metrics.record_update();
        tracing::info!(id, "Item fields updated");
        Ok(updated)
    }

    async fn update_photo(
        &self,
        id: &str,
        photo: Option<PhotoUpload>,
    ) -> Result<Item, InventoryError> {
        let current = self.get(id).await?;
        let Some(photo) = photo.filter(|photo| !photo.is_empty()) else {
            tracing::debug!(id, "Photo update without a file; item unchanged");
            return Ok(current);
        };

        let (path, content_type) = self.store_photo(photo).await?;
        let swapped = {
            let mut store = self.store.write().await;
            store.find_by_id_mut(id).map(|item| {
                let previous = item.photo_path.replace(path.clone());
                item.photo_content_type = Some(content_type);
                (item.clone(), previous)
            })
        };

        let Some((updated, previous)) = swapped else {
            // Deleted while the upload was being written.
            self.discard_photo(id, &path).await;
            return Err(InventoryError::item_not_found(id));
        };
        if let Some(previous) = previous {
            self.discard_photo(id, &previous).await;
        }
        self.metrics.record_update();
        tracing::info!(id, path = %path.display(), "Item photo replaced");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<Item, InventoryError> {
        let removed = self
            .store
            .write()
            .await
            .remove_by_id(id)
            .ok_or_else(|| InventoryError::item_not_found(id))?;
        if let Some(path) = &removed.photo_path {
            self.discard_photo(id, path).await;
        }
        self.metrics.record_deletion();
        tracing::info!(id, "Item deleted");
        Ok(removed)
    }

    async fn search(&self, request: SearchRequest) -> Result<Item, InventoryError> {
        let SearchRequest { id, include_photo } = request;
        let mut found = self.get(&id).await?;
        if include_photo && found.photo_path.is_some() {
            if !found.description.is_empty() {
                found.description.push(' ');
            }
            found.description.push_str("Photo: ");
            found.description.push_str(&self.photo_url(&id));
        }
        tracing::debug!(id, include_photo, "Search completed");
        Ok(found)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service() -> (InventoryService, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = InventoryService::new(
            PhotoStorage::new(dir.path().join("uploads")),
            "http://localhost:3000/",
        );
        (service, dir)
    }

    fn new_item(name: &str, description: &str, photo: Option<&[u8]>) -> NewItem {
        NewItem {
            name: Some(name.into()),
            description: Some(description.into()),
            photo: photo.map(|bytes| PhotoUpload {
                bytes: bytes.to_vec(),
                content_type: Some("image/png".into()),
                file_name: Some("tool.png".into()),
            }),
        }
    }

    #[tokio::test]
    async fn register_rejects_missing_or_empty_name() {
        let (service, _dir) = service();

        let err = service.register(NewItem::default()).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        let err = service
            .register(new_item("", "cordless", Some(b"img")))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));

        assert!(service.list().await.is_empty());
        assert!(!service.uploads_dir().exists(), "no photo written");
        assert_eq!(service.metrics_snapshot().items_registered, 0);
    }

    #[tokio::test]
    async fn registered_item_is_retrievable() {
        let (service, _dir) = service();
        let item = service
            .register(NewItem {
                name: Some("drill".into()),
                description: None,
                photo: None,
            })
            .await
            .expect("registered");

        let fetched = service.get(&item.id).await.expect("found");
        assert_eq!(fetched.name, "drill");
        assert_eq!(fetched.description, "");
        assert!(fetched.photo_path.is_none());
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let (service, _dir) = service();
        let a = service.register(new_item("a", "", None)).await.unwrap();
        let b = service.register(new_item("b", "", None)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn empty_file_part_counts_as_no_photo() {
        let (service, _dir) = service();
        let item = service
            .register(NewItem {
                name: Some("saw".into()),
                description: None,
                photo: Some(PhotoUpload {
                    file_name: Some(String::new()),
                    ..PhotoUpload::default()
                }),
            })
            .await
            .expect("registered");
        assert!(item.photo_path.is_none());
        assert_eq!(service.metrics_snapshot().photos_stored, 0);
    }

    #[tokio::test]
    async fn photo_round_trips_with_content_type() {
        let (service, _dir) = service();
        let item = service
            .register(new_item("drill", "", Some(b"png-bytes")))
            .await
            .unwrap();

        let blob = service.get_photo(&item.id).await.expect("photo");
        assert_eq!(blob.bytes, b"png-bytes");
        assert_eq!(blob.content_type, "image/png");
    }

    #[tokio::test]
    async fn photo_lookup_without_photo_is_not_found() {
        let (service, _dir) = service();
        let item = service.register(new_item("drill", "", None)).await.unwrap();
        assert!(matches!(
            service.get_photo(&item.id).await,
            Err(InventoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn field_update_only_touches_provided_fields() {
        let (service, _dir) = service();
        let item = service
            .register(new_item("drill", "cordless", None))
            .await
            .unwrap();

        let updated = service
            .update_fields(
                &item.id,
                ItemPatch {
                    name: Some("hammer drill".into()),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "hammer drill");
        assert_eq!(updated.description, "cordless");

        let updated = service
            .update_fields(
                &item.id,
                ItemPatch {
                    name: None,
                    description: Some("corded".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "hammer drill");
        assert_eq!(updated.description, "corded");
    }

    #[tokio::test]
    async fn empty_strings_leave_fields_unchanged() {
        let (service, _dir) = service();
        let item = service
            .register(new_item("drill", "cordless", None))
            .await
            .unwrap();

        let updated = service
            .update_fields(
                &item.id,
                ItemPatch {
                    name: Some(String::new()),
                    description: Some(String::new()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "drill");
        assert_eq!(updated.description, "cordless");
    }

    #[tokio::test]
    async fn photo_update_replaces_and_removes_previous_file() {
        let (service, _dir) = service();
        let item = service
            .register(new_item("drill", "", Some(b"old")))
            .await
            .unwrap();
        let old_path = item.photo_path.clone().unwrap();

        let updated = service
            .update_photo(
                &item.id,
                Some(PhotoUpload {
                    bytes: b"new".to_vec(),
                    content_type: None,
                    file_name: Some("new.jpg".into()),
                }),
            )
            .await
            .unwrap();

        let new_path = updated.photo_path.clone().unwrap();
        assert_ne!(old_path, new_path);
        assert!(!old_path.exists());
        let blob = service.get_photo(&item.id).await.unwrap();
        assert_eq!(blob.bytes, b"new");
        assert_eq!(blob.content_type, DEFAULT_PHOTO_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn photo_update_survives_missing_previous_file() {
        let (service, _dir) = service();
        let item = service
            .register(new_item("drill", "", Some(b"old")))
            .await
            .unwrap();
        std::fs::remove_file(item.photo_path.as_ref().unwrap()).unwrap();

        let updated = service
            .update_photo(&item.id, Some(new_item("x", "", Some(b"new")).photo.unwrap()))
            .await
            .expect("cleanup failure is not fatal");
        assert!(updated.photo_path.is_some());
        assert_eq!(service.metrics_snapshot().photo_cleanup_failures, 1);
    }

    #[tokio::test]
    async fn delete_survives_missing_photo_file() {
        let (service, _dir) = service();
        let item = service
            .register(new_item("drill", "", Some(b"img")))
            .await
            .unwrap();
        std::fs::remove_file(item.photo_path.as_ref().unwrap()).unwrap();

        let removed = service
            .delete(&item.id)
            .await
            .expect("cleanup failure is not fatal");
        assert_eq!(removed.id, item.id);
        assert!(matches!(
            service.get(&item.id).await,
            Err(InventoryError::NotFound(_))
        ));
        let metrics = service.metrics_snapshot();
        assert_eq!(metrics.photo_cleanup_failures, 1);
        assert_eq!(metrics.items_deleted, 1);
    }

    #[tokio::test]
    async fn photo_update_for_unknown_id_writes_nothing() {
        let (service, _dir) = service();
        let err = service
            .update_photo("missing", Some(new_item("x", "", Some(b"new")).photo.unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
        assert!(!service.uploads_dir().exists());
    }

    #[tokio::test]
    async fn delete_removes_item_and_photo() {
        let (service, _dir) = service();
        let item = service
            .register(new_item("drill", "", Some(b"img")))
            .await
            .unwrap();
        let path = item.photo_path.clone().unwrap();

        let removed = service.delete(&item.id).await.unwrap();
        assert_eq!(removed.id, item.id);
        assert!(!path.exists());
        assert!(matches!(
            service.get(&item.id).await,
            Err(InventoryError::NotFound(_))
        ));
        assert!(matches!(
            service.get_photo(&item.id).await,
            Err(InventoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found_everywhere() {
        let (service, _dir) = service();
        let not_found = |result: Result<_, InventoryError>| {
            matches!(result, Err(InventoryError::NotFound(_)))
        };
        assert!(not_found(service.get("nope").await.map(|_| ())));
        assert!(not_found(service.get_photo("nope").await.map(|_| ())));
        assert!(not_found(
            service
                .update_fields("nope", ItemPatch::default())
                .await
                .map(|_| ())
        ));
        assert!(not_found(service.update_photo("nope", None).await.map(|_| ())));
        assert!(not_found(service.delete("nope").await.map(|_| ())));
        assert!(not_found(
            service
                .search(SearchRequest {
                    id: "nope".into(),
                    include_photo: true,
                })
                .await
                .map(|_| ())
        ));
    }

    #[tokio::test]
    async fn search_annotates_copy_only() {
        let (service, _dir) = service();
        let item = service
            .register(new_item("drill", "cordless", Some(b"img")))
            .await
            .unwrap();

        let found = service
            .search(SearchRequest {
                id: item.id.clone(),
                include_photo: true,
            })
            .await
            .unwrap();
        assert_eq!(
            found.description,
            format!(
                "cordless Photo: http://localhost:3000/inventory/{}/photo",
                item.id
            )
        );
        assert_eq!(service.get(&item.id).await.unwrap().description, "cordless");
    }

    #[tokio::test]
    async fn search_without_flag_or_photo_returns_plain_item() {
        let (service, _dir) = service();
        let with_photo = service
            .register(new_item("drill", "cordless", Some(b"img")))
            .await
            .unwrap();
        let without_photo = service
            .register(new_item("saw", "manual", None))
            .await
            .unwrap();

        let found = service
            .search(SearchRequest {
                id: with_photo.id.clone(),
                include_photo: false,
            })
            .await
            .unwrap();
        assert_eq!(found.description, "cordless");

        let found = service
            .search(SearchRequest {
                id: without_photo.id.clone(),
                include_photo: true,
            })
            .await
            .unwrap();
        assert_eq!(found.description, "manual");
    }
}
