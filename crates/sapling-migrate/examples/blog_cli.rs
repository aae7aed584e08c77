//! Example: migrations for a small blog.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example blog_cli -p sapling-migrate -- --database-url sqlite://blog.db setup
//! cargo run --example blog_cli -p sapling-migrate -- --database-url sqlite://blog.db migrate
//! cargo run --example blog_cli -p sapling-migrate -- --database-url sqlite://blog.db state
//! cargo run --example blog_cli -p sapling-migrate -- metadata
//! ```

use futures::future::BoxFuture;
use sapling_core::schema::Schema;
use sapling_core::{MigrationCatalog, MigrationScript, Result};

struct CreateUsers;

impl MigrationScript for CreateUsers {
    fn up<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            schema
                .create_table("users", &|t| {
                    t.increments("id")?;
                    t.text("username")?.unique()?;
                    t.text("email")?;
                    t.integer("is_active")?.default_bool(true)?;
                    t.created_at()?;
                    Ok(())
                })
                .await
        })
    }

    fn down<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { schema.drop_table("users").await })
    }
}

struct CreatePosts;

impl MigrationScript for CreatePosts {
    fn up<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            schema
                .create_table("posts", &|t| {
                    t.increments("id")?;
                    t.integer("author_id")?.references("users", "id")?;
                    t.text("title")?;
                    t.text("body")?.default_str("")?;
                    t.created_at()?;
                    t.updated_at()?;
                    Ok(())
                })
                .await
        })
    }

    fn down<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { schema.drop_table("posts").await })
    }
}

struct AddUserBio;

impl MigrationScript for AddUserBio {
    fn up<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            schema
                .update_table("users", &|t| {
                    t.text("bio")?.nullable();
                    Ok(())
                })
                .await
        })
    }

    // SQLite cannot drop columns portably; the column stays.
    fn down<'a>(&'a self, _schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { Ok::<_, sapling_core::Error>(()) })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let catalog = MigrationCatalog::new()
        .register("0001_create_users", CreateUsers)
        .register("0002_create_posts", CreatePosts)
        .register("0003_add_user_bio", AddUserBio);

    sapling_migrate::cli::main_with(catalog).await
}
