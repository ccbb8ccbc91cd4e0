use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A post carries a denormalized copy of the author's name and avatar so it
/// stays renderable after the author deletes their account.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Post {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        text: &str,
        name: &str,
        avatar: &str,
    ) -> anyhow::Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, text, name, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, text, name, avatar, created_at
            "#,
        )
        .bind(user_id)
        .bind(text)
        .bind(name)
        .bind(avatar)
        .fetch_one(db)
        .await
        .context("failed to create post")
    }
}
