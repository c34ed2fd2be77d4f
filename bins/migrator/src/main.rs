//! Applies the `posts` table migrations outside the server.
//!
//! The CLI reads `DATABASE_URL` (or `-u <url>`), not the `POSTGATE__DATABASE__URL`
//! setting the server uses, so both must point at the same database:
//!
//!   migrator up      - create the posts table
//!   migrator down    - drop it again
//!   migrator status  - list applied migrations

use postgate_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
