//! Post service implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::{PostError, PostOperation};
use super::types::{Confirmation, MediaUpload, NewPost, Post, PostPatch};
use crate::storage::MediaStore;

/// Repository trait for post documents.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait PostRepository: Send + Sync {
    /// Find a post by identifier.
    fn find_by_id(
        &self,
        post_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Post>, PostError>> + Send;

    /// Check if a post exists.
    fn exists(
        &self,
        post_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, PostError>> + Send;

    /// Insert the post, or overwrite every field of the stored post with the same identifier.
    fn save(&self, post: Post)
    -> impl std::future::Future<Output = Result<Post, PostError>> + Send;

    /// List all posts.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Post>, PostError>> + Send;

    /// Delete a post, returning whether a document was removed.
    fn delete(
        &self,
        post_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, PostError>> + Send;
}

/// Post service coordinating the document store and the media area.
pub struct PostService<R: PostRepository> {
    repo: Arc<R>,
    media: Arc<MediaStore>,
}

impl<R: PostRepository> PostService<R> {
    /// Create a new post service.
    #[must_use]
    pub fn new(repo: Arc<R>, media: Arc<MediaStore>) -> Self {
        Self { repo, media }
    }

    /// Get the media store.
    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    /// Create a post, or overwrite the post with the same identifier.
    ///
    /// The media file is written completely before the document. If the
    /// document write then fails, the new media file is removed again.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required field is empty
    /// - The media file is too large or cannot be written
    /// - The document cannot be saved
    pub async fn create(
        &self,
        new_post: NewPost,
        media: Option<MediaUpload>,
    ) -> Result<Confirmation, PostError> {
        let empty = new_post.empty_fields();
        if !empty.is_empty() {
            return Err(PostError::EmptyFields(empty));
        }

        let previous = self.repo.find_by_id(&new_post.post_id).await?;

        let media_url = match media {
            Some(upload) => {
                let filename = MediaStore::media_filename(
                    &new_post.username,
                    &new_post.post_id,
                    &upload.filename,
                );
                self.media.store(&filename, upload.content).await?
            }
            None => String::new(),
        };

        let post = Post::from_new(new_post, media_url);

        if let Err(err) = self.repo.save(post.clone()).await {
            // Keep the file when the surviving document still points at it.
            let shared_with_previous = previous
                .as_ref()
                .is_some_and(|p| p.media_url == post.media_url);
            if post.has_media() && !shared_with_previous {
                self.remove_media(&post.media_url).await;
            }
            return Err(err);
        }

        if let Some(previous) = previous {
            if previous.has_media() && previous.media_url != post.media_url {
                self.remove_media(&previous.media_url).await;
            }
        }

        info!(
            post_id = %post.post_id,
            username = %post.username,
            has_media = post.has_media(),
            "Post saved"
        );

        Ok(Confirmation::created(&post.post_id, &post.username))
    }

    /// List every post.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::NoPosts`] when the store is empty, or an error if
    /// the store cannot be read.
    pub async fn list(&self) -> Result<Vec<Post>, PostError> {
        let posts = self.repo.list().await?;
        if posts.is_empty() {
            return Err(PostError::NoPosts);
        }
        Ok(posts)
    }

    /// Apply a partial update to a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the post does not exist or cannot be saved.
    pub async fn update(&self, post_id: &str, patch: PostPatch) -> Result<Confirmation, PostError> {
        let mut post = self
            .repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| PostError::not_found(PostOperation::Update, post_id))?;

        if patch.is_empty() {
            debug!(post_id, "Patch changes nothing, skipping write");
        } else {
            patch.apply_to(&mut post);
            self.repo.save(post).await?;
            info!(post_id, "Post updated");
        }


        Ok(Confirmation::updated(post_id))
    }

    /// Delete a post and its media file.
    ///
    /// A media file that is already gone does not fail the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the post does not exist or the document cannot be
    /// deleted.
    pub async fn delete(&self, post_id: &str) -> Result<Confirmation, PostError> {
        let post = self
            .repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| PostError::not_found(PostOperation::Delete, post_id))?;

        if post.has_media() {
            self.remove_media(&post.media_url).await;
        }

        if !self.repo.delete(post_id).await? {
            return Err(PostError::not_found(PostOperation::Delete, post_id));
        }

        info!(post_id, "Post deleted");
        Ok(Confirmation::deleted(post_id))
    }

    /// Best-effort media removal.
    async fn remove_media(&self, reference: &str) {
        match self.media.exists(reference).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(media_url = reference, "Media file already gone");
                return;
            }
            Err(e) => {
                warn!(error = %e, media_url = reference, "Failed to check media file");
                return;
            }
        }

        if let Err(e) = self.media.delete(reference).await {
            warn!(error = %e, media_url = reference, "Failed to delete media file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageConfig, StorageError, StorageProvider};
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Mock repository for testing.
    struct MockPostRepository {
        posts: Mutex<BTreeMap<String, Post>>,
        fail_saves: AtomicBool,
    }

    impl MockPostRepository {
        fn new() -> Self {
            Self {
                posts: Mutex::new(BTreeMap::new()),
                fail_saves: AtomicBool::new(false),
            }
        }

        fn get(&self, post_id: &str) -> Option<Post> {
            self.posts.lock().unwrap().get(post_id).cloned()
        }

        fn snapshot(&self) -> BTreeMap<String, Post> {
            self.posts.lock().unwrap().clone()
        }
    }

    impl PostRepository for MockPostRepository {
        async fn find_by_id(&self, post_id: &str) -> Result<Option<Post>, PostError> {
            Ok(self.get(post_id))
        }

        async fn exists(&self, post_id: &str) -> Result<bool, PostError> {
            Ok(self.posts.lock().unwrap().contains_key(post_id))
        }

        async fn save(&self, post: Post) -> Result<Post, PostError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(PostError::repository("store unavailable"));
            }
            self.posts
                .lock()
                .unwrap()
                .insert(post.post_id.clone(), post.clone());
            Ok(post)
        }

        async fn list(&self) -> Result<Vec<Post>, PostError> {
            Ok(self.posts.lock().unwrap().values().cloned().collect())
        }

        async fn delete(&self, post_id: &str) -> Result<bool, PostError> {
            Ok(self.posts.lock().unwrap().remove(post_id).is_some())
        }
    }

    struct Fixture {
        service: PostService<MockPostRepository>,
        repo: Arc<MockPostRepository>,
        dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(StorageProvider::local_fs(dir.path()));
        let media = Arc::new(MediaStore::from_config(config).unwrap());
        let repo = Arc::new(MockPostRepository::new());
        let service = PostService::new(repo.clone(), media);
        Fixture { service, repo, dir }
    }

    fn new_post(post_id: &str, caption: &str) -> NewPost {
        NewPost {
            username: "alice".to_string(),
            post_id: post_id.to_string(),
            caption: caption.to_string(),
            media_type: "image".to_string(),
            hashtags: "#sky".to_string(),
            location: "Lisbon".to_string(),
            tagged_users: "bob".to_string(),
            system_date_time: "2024-05-01 18:00".to_string(),
            is_sponsored: "false".to_string(),
            platform_name: "instagram".to_string(),
        }
    }

    fn photo() -> Option<MediaUpload> {
        Some(MediaUpload::new("sunset.png", &b"png-bytes"[..]))
    }

    #[tokio::test]
    async fn test_create_without_media_stores_empty_reference() {
        let f = fixture();

        let confirmation = f.service.create(new_post("p1", "hello"), None).await.unwrap();

        assert_eq!(confirmation.message, "Post p1 by alice added successfully!");
        assert_eq!(f.repo.get("p1").unwrap().media_url, "");
    }

    #[tokio::test]
    async fn test_create_with_media_writes_file_at_reference() {
        let f = fixture();

        f.service.create(new_post("p1", "hello"), photo()).await.unwrap();

        let stored = f.repo.get("p1").unwrap();
        let expected = format!("{}/alice.p1.png", f.dir.path().to_string_lossy());
        assert_eq!(stored.media_url, expected);
        assert!(Path::new(&stored.media_url).exists());
        assert_eq!(std::fs::read(&stored.media_url).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_fields() {
        let f = fixture();

        let result = f.service.create(new_post("p1", ""), photo()).await;

        assert!(matches!(result, Err(PostError::EmptyFields(ref fields)) if fields == &["caption"]));
        assert!(f.repo.get("p1").is_none());
        assert!(!f.dir.path().join("alice.p1.png").exists());
    }

    #[tokio::test]
    async fn test_create_same_id_overwrites_document() {
        let f = fixture();

        f.service.create(new_post("p1", "first"), None).await.unwrap();
        f.service.create(new_post("p1", "second"), None).await.unwrap();

        let stored = f.repo.get("p1").unwrap();
        assert_eq!(stored.caption, "second");
        assert_eq!(f.repo.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_recreate_without_media_removes_superseded_file() {
        let f = fixture();

        f.service.create(new_post("p1", "first"), photo()).await.unwrap();
        let old_reference = f.repo.get("p1").unwrap().media_url;

        f.service.create(new_post("p1", "second"), None).await.unwrap();

        assert_eq!(f.repo.get("p1").unwrap().media_url, "");
        assert!(!Path::new(&old_reference).exists());
    }

    #[tokio::test]
    async fn test_recreate_with_same_media_name_keeps_new_file() {
        let f = fixture();

        f.service.create(new_post("p1", "first"), photo()).await.unwrap();
        f.service
            .create(
                new_post("p1", "second"),
                Some(MediaUpload::new("again.png", &b"new-bytes"[..])),
            )
            .await
            .unwrap();

        let stored = f.repo.get("p1").unwrap();
        assert_eq!(std::fs::read(&stored.media_url).unwrap(), b"new-bytes");
    }

    #[tokio::test]
    async fn test_create_media_failure_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            StorageConfig::new(StorageProvider::local_fs(dir.path())).with_max_file_size(2);
        let media = Arc::new(MediaStore::from_config(config).unwrap());
        let repo = Arc::new(MockPostRepository::new());
        let service = PostService::new(repo.clone(), media);

        let result = service.create(new_post("p1", "hello"), photo()).await;

        assert!(matches!(
            result,
            Err(PostError::Storage(StorageError::FileTooLarge { .. }))
        ));
        assert!(repo.get("p1").is_none());
    }

    #[tokio::test]
    async fn test_create_document_failure_removes_new_media() {
        let f = fixture();
        f.repo.fail_saves.store(true, Ordering::SeqCst);

        let result = f.service.create(new_post("p1", "hello"), photo()).await;

        assert!(matches!(result, Err(PostError::Repository(_))));
        assert!(!f.dir.path().join("alice.p1.png").exists());
    }

    #[tokio::test]
    async fn test_list_empty_is_not_found() {
        let f = fixture();

        let result = f.service.list().await;

        assert!(matches!(result, Err(PostError::NoPosts)));
    }

    #[tokio::test]
    async fn test_list_single_post_returns_full_document() {
        let f = fixture();
        f.service.create(new_post("p1", "hello"), None).await.unwrap();

        let posts = f.service.list().await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0], Post::from_new(new_post("p1", "hello"), String::new()));
    }

    #[tokio::test]
    async fn test_update_subset_leaves_other_fields() {
        let f = fixture();
        f.service.create(new_post("p1", "hello"), photo()).await.unwrap();
        let before = f.repo.get("p1").unwrap();

        let patch = PostPatch {
            caption: Some("edited".to_string()),
            hashtags: Some(String::new()),
            ..PostPatch::default()
        };
        let confirmation = f.service.update("p1", patch).await.unwrap();

        assert_eq!(confirmation.message, "Post p1 updated successfully!");
        let after = f.repo.get("p1").unwrap();
        assert_eq!(after.caption, "edited");
        assert_eq!(
            Post {
                caption: before.caption.clone(),
                ..after
            },
            before
        );
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let f = fixture();
        f.service.create(new_post("p1", "hello"), None).await.unwrap();
        let before = f.repo.snapshot();

        let patch = PostPatch {
            caption: Some("edited".to_string()),
            ..PostPatch::default()
        };
        let result = f.service.update("ghost", patch).await;

        assert!(matches!(
            result,
            Err(PostError::NotFound { operation: PostOperation::Update, ref post_id }) if post_id == "ghost"
        ));
        assert_eq!(f.repo.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_skips_write() {
        let f = fixture();
        f.service.create(new_post("p1", "hello"), None).await.unwrap();
        let before = f.repo.snapshot();
        f.repo.fail_saves.store(true, Ordering::SeqCst);

        let patch = PostPatch {
            caption: Some(String::new()),
            ..PostPatch::default()
        };
        let confirmation = f.service.update("p1", patch).await.unwrap();

        assert_eq!(confirmation.message, "Post p1 updated successfully!");
        assert_eq!(f.repo.snapshot(), before);
    }

    #[tokio::test]
    async fn test_delete_removes_document_and_media() {
        let f = fixture();
        f.service.create(new_post("p1", "hello"), photo()).await.unwrap();
        let reference = f.repo.get("p1").unwrap().media_url;

        let confirmation = f.service.delete("p1").await.unwrap();

        assert_eq!(confirmation.message, "Post p1 deleted successfully!");
        assert!(f.repo.get("p1").is_none());
        assert!(!Path::new(&reference).exists());
    }

    #[tokio::test]
    async fn test_delete_with_externally_removed_media_succeeds() {
        let f = fixture();
        f.service.create(new_post("p1", "hello"), photo()).await.unwrap();
        std::fs::remove_file(f.repo.get("p1").unwrap().media_url).unwrap();

        f.service.delete("p1").await.unwrap();

        assert!(f.repo.get("p1").is_none());
    }

    #[tokio::test]
    async fn test_delete_with_unreadable_media_reference_still_deletes_document() {
        let f = fixture();
        let post = Post::from_new(new_post("p1", "hello"), "UserMedia/..".to_string());
        f.repo.save(post).await.unwrap();

        f.service.delete("p1").await.unwrap();

        assert!(f.repo.get("p1").is_none());
        assert!(f.dir.path().exists());
    }

    #[tokio::test]
    async fn test_posts_with_non_ascii_ids_keep_separate_media() {
        let f = fixture();
        f.service
            .create(
                new_post("日本", "tokyo"),
                Some(MediaUpload::new("a.png", &b"JAPAN"[..])),
            )
            .await
            .unwrap();
        f.service
            .create(
                new_post("中国", "beijing"),
                Some(MediaUpload::new("b.png", &b"CHINA"[..])),
            )
            .await
            .unwrap();

        let japan = f.repo.get("日本").unwrap().media_url;
        let china = f.repo.get("中国").unwrap().media_url;
        assert_ne!(japan, china);
        assert_eq!(std::fs::read(&japan).unwrap(), b"JAPAN");

        f.service.delete("中国").await.unwrap();

        assert!(!Path::new(&china).exists());
        assert_eq!(std::fs::read(&japan).unwrap(), b"JAPAN");
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let f = fixture();
        f.service.create(new_post("p1", "hello"), None).await.unwrap();
        let before = f.repo.snapshot();

        let result = f.service.delete("ghost").await;

        assert!(matches!(
            result,
            Err(PostError::NotFound { operation: PostOperation::Delete, .. })
        ));
        assert_eq!(f.repo.snapshot(), before);
    }

    #[tokio::test]
    async fn test_exists_tracks_lifecycle() {
        let f = fixture();
        assert!(!f.repo.exists("p1").await.unwrap());

        f.service.create(new_post("p1", "hello"), None).await.unwrap();
        assert!(f.repo.exists("p1").await.unwrap());

        f.service.delete("p1").await.unwrap();
        assert!(!f.repo.exists("p1").await.unwrap());
    }
}
