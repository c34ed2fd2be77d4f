//! Posts migration.
//!
//! Creates the posts table, one row per post document keyed by its
//! caller-supplied identifier.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(POSTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS posts;").await?;
        Ok(())
    }
}

const POSTS_SQL: &str = r"
-- Post documents; every field is free text as submitted by the client
CREATE TABLE IF NOT EXISTS posts (
    post_id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    caption TEXT NOT NULL,
    media_url TEXT NOT NULL DEFAULT '',
    media_type TEXT NOT NULL,
    hashtags TEXT NOT NULL,
    location TEXT NOT NULL,
    tagged_users TEXT NOT NULL,
    system_date_time TEXT NOT NULL,
    is_sponsored TEXT NOT NULL,
    platform_name TEXT NOT NULL
);
";
