//! Post repository for database operations.
//!
//! Implements the post document store using SeaORM. Saving is an upsert on
//! `post_id`, so a second save with the same identifier replaces every column.

use sea_orm::{
    ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder,
    sea_query::OnConflict,
};

use crate::entities::posts;
use postgate_core::post::{Post, PostError, PostRepository as PostRepoTrait};

/// Post repository implementation.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PostRepoTrait for PostRepository {
    async fn find_by_id(&self, post_id: &str) -> Result<Option<Post>, PostError> {
        let model = posts::Entity::find_by_id(post_id.to_string())
            .one(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(model.map(to_domain))
    }

    async fn exists(&self, post_id: &str) -> Result<bool, PostError> {
        let count = posts::Entity::find_by_id(post_id.to_string())
            .count(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(count > 0)
    }

    async fn save(&self, post: Post) -> Result<Post, PostError> {
        posts::Entity::insert(to_active_model(&post))
            .on_conflict(
                OnConflict::column(posts::Column::PostId)
                    .update_columns([
                        posts::Column::Username,
                        posts::Column::Caption,
                        posts::Column::MediaUrl,
                        posts::Column::MediaType,
                        posts::Column::Hashtags,
                        posts::Column::Location,
                        posts::Column::TaggedUsers,
                        posts::Column::SystemDateTime,
                        posts::Column::IsSponsored,
                        posts::Column::PlatformName,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(post)
    }

    async fn list(&self) -> Result<Vec<Post>, PostError> {
        let models = posts::Entity::find()
            .order_by_asc(posts::Column::PostId)
            .all(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn delete(&self, post_id: &str) -> Result<bool, PostError> {
        let result = posts::Entity::delete_by_id(post_id.to_string())
            .exec(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(result.rows_affected > 0)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn repository_error(err: DbErr) -> PostError {
    PostError::repository(err.to_string())
}

/// Convert domain post to an active model with every column set.
fn to_active_model(post: &Post) -> posts::ActiveModel {
    posts::ActiveModel {
        post_id: Set(post.post_id.clone()),
        username: Set(post.username.clone()),
        caption: Set(post.caption.clone()),
        media_url: Set(post.media_url.clone()),
        media_type: Set(post.media_type.clone()),
        hashtags: Set(post.hashtags.clone()),
        location: Set(post.location.clone()),
        tagged_users: Set(post.tagged_users.clone()),
        system_date_time: Set(post.system_date_time.clone()),
        is_sponsored: Set(post.is_sponsored.clone()),
        platform_name: Set(post.platform_name.clone()),
    }
}

/// Convert database model to domain model.
fn to_domain(model: posts::Model) -> Post {
    Post {
        post_id: model.post_id,
        username: model.username,
        caption: model.caption,
        media_url: model.media_url,
        media_type: model.media_type,
        hashtags: model.hashtags,
        location: model.location,
        tagged_users: model.tagged_users,
        system_date_time: model.system_date_time,
        is_sponsored: model.is_sponsored,
        platform_name: model.platform_name,
    }
}
