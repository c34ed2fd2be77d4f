//! `SeaORM` Entity for posts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: String,
    pub username: String,
    pub caption: String,
    pub media_url: String,
    pub media_type: String,
    pub hashtags: String,
    pub location: String,
    pub tagged_users: String,
    pub system_date_time: String,
    pub is_sponsored: String,
    pub platform_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
