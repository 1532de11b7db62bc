//! Photo ingestion shared by the park and campground synchronizers.

use async_trait::async_trait;

use crate::db::models::{Campground, Park};
use crate::db::store::RecordStore;
use crate::services::images::{is_new_image, ImageTranscoder};

/// A record that owns an ordered list of stored photo names.
#[async_trait]
pub trait ImageOwner: Send {
    /// Label used in log lines, e.g. "park yose".
    fn label(&self) -> String;
    fn images(&self) -> &[String];
    fn images_mut(&mut self) -> &mut Vec<String>;
    /// Save the record and refresh `self` from the stored row.
    async fn persist(&mut self, store: &dyn RecordStore) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl ImageOwner for Park {
    fn label(&self) -> String {
        format!("park {}", self.park_code)
    }

    fn images(&self) -> &[String] {
        &self.images
    }

    fn images_mut(&mut self) -> &mut Vec<String> {
        &mut self.images
    }

    async fn persist(&mut self, store: &dyn RecordStore) -> Result<(), sqlx::Error> {
        *self = store.save_park(self).await?;
        Ok(())
    }
}

#[async_trait]
impl ImageOwner for Campground {
    fn label(&self) -> String {
        format!("campground {}", self.camp_id)
    }

    fn images(&self) -> &[String] {
        &self.images
    }

    fn images_mut(&mut self) -> &mut Vec<String> {
        &mut self.images
    }

    async fn persist(&mut self, store: &dyn RecordStore) -> Result<(), sqlx::Error> {
        *self = store.save_campground(self).await?;
        Ok(())
    }
}

/// Ingest every not-yet-seen photo in `urls` into `owner`.
///
/// Each successful photo is persisted immediately, so a later failure never
/// loses an earlier one. Failures are logged and skipped; a stored file whose
/// owner could not be saved is deleted again. Returns the number of photos
/// added.
pub async fn ingest_photos<O: ImageOwner>(
    store: &dyn RecordStore,
    transcoder: &ImageTranscoder,
    owner: &mut O,
    urls: &[String],
) -> usize {
    let mut added = 0;

    for url in urls {
        if url.trim().is_empty() || !is_new_image(url, owner.images()) {
            continue;
        }

        let image = match transcoder.fetch_and_transcode(url).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Error resizing image {} for {}: {}", url, owner.label(), e);
                continue;
            }
        };

        let name = match store.put_file(url, "jpg", "image/jpeg", &image.bytes).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Error storing image {} for {}: {}", url, owner.label(), e);
                continue;
            }
        };

        tracing::info!(
            "Adding img to {}: {}x{}, {:.1} kb",
            owner.label(),
            image.width,
            image.height,
            image.size_kb()
        );
        owner.images_mut().push(name.clone());

        if let Err(e) = owner.persist(store).await {
            tracing::warn!("Error saving {} with image: {}", owner.label(), e);
            owner.images_mut().pop();
            if let Err(e) = store.delete_file(&name).await {
                tracing::warn!("Error removing orphaned image {}: {}", name, e);
            }
            continue;
        }
        added += 1;
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::services::images::tests::png_fixture;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn photo_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/bass_harbor.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_fixture(120, 80)))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_repeated_url_ingested_once() {
        let server = photo_server().await;
        let store = MemoryStore::new();
        let transcoder = ImageTranscoder::new(reqwest::Client::new(), 1500);
        let mut park = store.save_park(&Park::new("acad")).await.unwrap();
        let url = format!("{}/img/bass_harbor.jpg", server.uri());

        let added = ingest_photos(&store, &transcoder, &mut park, &[url.clone(), url]).await;
        assert_eq!(added, 1);
        assert_eq!(park.images.len(), 1);
        assert!(park.images[0].starts_with("bass_harbor_"));
        assert_eq!(store.file_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_removes_stored_file() {
        let server = photo_server().await;
        let store = MemoryStore::new();
        let transcoder = ImageTranscoder::new(reqwest::Client::new(), 1500);
        let mut park = store.save_park(&Park::new("acad")).await.unwrap();
        store.fail_saves(true);

        let url = format!("{}/img/bass_harbor.jpg", server.uri());
        let added = ingest_photos(&store, &transcoder, &mut park, &[url]).await;
        assert_eq!(added, 0);
        assert!(park.images.is_empty());
        assert_eq!(store.file_count(), 0, "no file left without an owner");
    }
}
