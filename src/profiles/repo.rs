use anyhow::Context;
use sqlx::types::Json;
use sqlx::{Executor, FromRow, PgPool, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::dto::{Education, Experience, ProfileFields, SocialLinks};

/// Profile row joined with the owning user's display fields.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: Json<SocialLinks>,
    pub experience: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub user_name: String,
    pub user_avatar: String,
}

/// Outcome of removing an experience/education entry.
#[derive(Debug)]
pub enum EntryEdit {
    Updated(ProfileRecord),
    NoProfile,
    EntryNotFound,
}

const PROFILE_COLUMNS: &str = r#"
    p.id, p.user_id, p.company, p.website, p.location, p.bio, p.status,
    p.github_username, p.skills, p.social, p.experience, p.education,
    p.created_at, p.updated_at,
    u.name AS user_name, u.avatar AS user_avatar
"#;

async fn fetch_by_user<'e, E>(executor: E, user_id: Uuid) -> anyhow::Result<Option<ProfileRecord>>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        r#"
        SELECT {PROFILE_COLUMNS}
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE p.user_id = $1
        "#
    );

    sqlx::query_as::<_, ProfileRecord>(&query)
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch profile")
}

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<ProfileRecord>> {
    fetch_by_user(db, user_id).await
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<ProfileRecord>> {
    let query = format!(
        r#"
        SELECT {PROFILE_COLUMNS}
        FROM profiles p
        JOIN users u ON u.id = p.user_id
        ORDER BY p.created_at DESC
        "#
    );

    sqlx::query_as::<_, ProfileRecord>(&query)
        .fetch_all(db)
        .await
        .context("failed to list profiles")
}

/// Create-or-update in one statement. `status`, `skills` and `social` are
/// always written; the optional scalars keep their stored value when the
/// submission left them out. The write and the returning joined read share
/// a transaction, so losing a race with an account deletion rolls the write
/// back rather than leaving a profile row without its user.
pub async fn upsert(db: &PgPool, user_id: Uuid, fields: &ProfileFields) -> anyhow::Result<ProfileRecord> {
    let mut tx = db.begin().await.context("failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, company, website, location, bio, status, github_username, skills, social)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (user_id) DO UPDATE SET
            company         = COALESCE(EXCLUDED.company, profiles.company),
            website         = COALESCE(EXCLUDED.website, profiles.website),
            location        = COALESCE(EXCLUDED.location, profiles.location),
            bio             = COALESCE(EXCLUDED.bio, profiles.bio),
            status          = EXCLUDED.status,
            github_username = COALESCE(EXCLUDED.github_username, profiles.github_username),
            skills          = EXCLUDED.skills,
            social          = EXCLUDED.social,
            updated_at      = now()
        "#,
    )
    .bind(user_id)
    .bind(&fields.company)
    .bind(&fields.website)
    .bind(&fields.location)
    .bind(&fields.bio)
    .bind(&fields.status)
    .bind(&fields.github_username)
    .bind(&fields.skills)
    .bind(Json(&fields.social))
    .execute(&mut *tx)
    .await
    .context("failed to upsert profile")?;

    let record = fetch_by_user(&mut *tx, user_id)
        .await?
        .context("profile missing after upsert")?;
    tx.commit().await.context("failed to commit transaction")?;

    Ok(record)
}

/// Prepends an entry to the profile's experience list. Returns `None` when
/// the caller has no profile. The row is locked for the read-modify-write.
pub async fn add_experience(
    db: &PgPool,
    user_id: Uuid,
    entry: Experience,
) -> anyhow::Result<Option<ProfileRecord>> {
    let mut tx = db.begin().await.context("failed to begin transaction")?;

    let row = sqlx::query_as::<_, (Json<Vec<Experience>>,)>(
        r#"SELECT experience FROM profiles WHERE user_id = $1 FOR UPDATE"#,
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await
    .context("failed to lock profile")?;

    let Some((Json(mut entries),)) = row else {
        return Ok(None);
    };
    prepend(&mut entries, entry);

    sqlx::query(r#"UPDATE profiles SET experience = $2, updated_at = now() WHERE user_id = $1"#)
        .bind(user_id)
        .bind(Json(&entries))
        .execute(&mut *tx)
        .await
        .context("failed to update experience")?;

    let record = fetch_by_user(&mut *tx, user_id)
        .await?
        .context("profile missing after experience update")?;
    tx.commit().await.context("failed to commit transaction")?;

    Ok(Some(record))
}

pub async fn remove_experience(db: &PgPool, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<EntryEdit> {
    let mut tx = db.begin().await.context("failed to begin transaction")?;

    let row = sqlx::query_as::<_, (Json<Vec<Experience>>,)>(
        r#"SELECT experience FROM profiles WHERE user_id = $1 FOR UPDATE"#,
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await
    .context("failed to lock profile")?;

    let Some((Json(mut entries),)) = row else {
        return Ok(EntryEdit::NoProfile);
    };
    if !remove_by_id(&mut entries, entry_id, |e| e.id) {
        return Ok(EntryEdit::EntryNotFound);
    }

    sqlx::query(r#"UPDATE profiles SET experience = $2, updated_at = now() WHERE user_id = $1"#)
        .bind(user_id)
        .bind(Json(&entries))
        .execute(&mut *tx)
        .await
        .context("failed to update experience")?;

    let record = fetch_by_user(&mut *tx, user_id)
        .await?
        .context("profile missing after experience removal")?;
    tx.commit().await.context("failed to commit transaction")?;

    Ok(EntryEdit::Updated(record))
}

pub async fn add_education(
    db: &PgPool,
    user_id: Uuid,
    entry: Education,
) -> anyhow::Result<Option<ProfileRecord>> {
    let mut tx = db.begin().await.context("failed to begin transaction")?;

    let row = sqlx::query_as::<_, (Json<Vec<Education>>,)>(
        r#"SELECT education FROM profiles WHERE user_id = $1 FOR UPDATE"#,
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await
    .context("failed to lock profile")?;

    let Some((Json(mut entries),)) = row else {
        return Ok(None);
    };
    prepend(&mut entries, entry);

    sqlx::query(r#"UPDATE profiles SET education = $2, updated_at = now() WHERE user_id = $1"#)
        .bind(user_id)
        .bind(Json(&entries))
        .execute(&mut *tx)
        .await
        .context("failed to update education")?;

    let record = fetch_by_user(&mut *tx, user_id)
        .await?
        .context("profile missing after education update")?;
    tx.commit().await.context("failed to commit transaction")?;

    Ok(Some(record))
}

pub async fn remove_education(db: &PgPool, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<EntryEdit> {
    let mut tx = db.begin().await.context("failed to begin transaction")?;

    let row = sqlx::query_as::<_, (Json<Vec<Education>>,)>(
        r#"SELECT education FROM profiles WHERE user_id = $1 FOR UPDATE"#,
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await
    .context("failed to lock profile")?;

    let Some((Json(mut entries),)) = row else {
        return Ok(EntryEdit::NoProfile);
    };
    if !remove_by_id(&mut entries, entry_id, |e| e.id) {
        return Ok(EntryEdit::EntryNotFound);
    }

    sqlx::query(r#"UPDATE profiles SET education = $2, updated_at = now() WHERE user_id = $1"#)
        .bind(user_id)
        .bind(Json(&entries))
        .execute(&mut *tx)
        .await
        .context("failed to update education")?;

    let record = fetch_by_user(&mut *tx, user_id)
        .await?
        .context("profile missing after education removal")?;
    tx.commit().await.context("failed to commit transaction")?;

    Ok(EntryEdit::Updated(record))
}

/// Lists are newest-first: new entries always go to the head.
fn prepend<T>(entries: &mut Vec<T>, entry: T) {
    entries.insert(0, entry);
}

/// Removes the entry whose id matches, and only that entry. Returns whether
/// anything was removed.
fn remove_by_id<T>(entries: &mut Vec<T>, entry_id: Uuid, id_of: impl Fn(&T) -> Uuid) -> bool {
    match entries.iter().position(|e| id_of(e) == entry_id) {
        Some(idx) => {
            entries.remove(idx);
            true
        }
        None => false,
    }
}

/// Deletes the profile (if any) and the user row in one transaction.
pub async fn delete_profile_and_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("failed to begin transaction")?;

    sqlx::query(r#"DELETE FROM profiles WHERE user_id = $1"#)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("failed to delete profile")?;

    sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("failed to delete user")?;

    tx.commit().await.context("failed to commit transaction")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo::User;

    fn entry(id: Uuid, title: &str) -> Experience {
        Experience {
            id,
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            from: "2020-01-01".to_string(),
            to: None,
            current: false,
            description: None,
        }
    }

    #[test]
    fn new_entries_go_to_the_head() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut entries = vec![entry(first, "older")];

        prepend(&mut entries, entry(second, "newer"));
        assert_eq!(entries[0].id, second);
        assert_eq!(entries[1].id, first);
    }

    #[test]
    fn remove_by_id_targets_only_the_matching_entry() {
        let keep = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let mut entries = vec![entry(keep, "first"), entry(gone, "second")];

        assert!(remove_by_id(&mut entries, gone, |e| e.id));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, keep);
    }

    #[test]
    fn remove_by_id_with_unknown_id_leaves_list_untouched() {
        let mut entries = vec![entry(Uuid::new_v4(), "first"), entry(Uuid::new_v4(), "second")];

        assert!(!remove_by_id(&mut entries, Uuid::new_v4(), |e| e.id));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn remove_by_id_on_empty_list_reports_missing() {
        let mut entries: Vec<Experience> = Vec::new();
        assert!(!remove_by_id(&mut entries, Uuid::new_v4(), |e| e.id));
    }

    // The ignored tests below need a running Postgres: point DATABASE_URL at
    // a scratch database and run with `cargo test -- --ignored`.

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect");
        sqlx::migrate!("./migrations").run(&pool).await.expect("migrate");
        pool
    }

    fn fields(status: &str, bio: Option<&str>) -> ProfileFields {
        ProfileFields {
            company: None,
            website: None,
            location: None,
            bio: bio.map(str::to_string),
            status: status.to_string(),
            github_username: None,
            skills: vec!["js".to_string(), "go".to_string(), "rust".to_string()],
            social: SocialLinks::default(),
        }
    }

    #[tokio::test]
    #[ignore] // Ignore by default since it requires a database
    async fn upsert_keeps_unsent_fields_on_resubmission() {
        let pool = test_pool().await;
        let email = format!("upsert-{}@example.com", Uuid::new_v4());
        let user = User::create(&pool, "Ada", &email, "hash", "avatar")
            .await
            .expect("user");

        let first = upsert(&pool, user.id, &fields("Developer", Some("Builds things")))
            .await
            .expect("create");
        assert_eq!(first.bio.as_deref(), Some("Builds things"));
        assert_eq!(first.skills, vec!["js", "go", "rust"]);

        let second = upsert(&pool, user.id, &fields("Senior Developer", None))
            .await
            .expect("update");
        assert_eq!(second.id, first.id);
        assert_eq!(second.status.as_deref(), Some("Senior Developer"));
        assert_eq!(second.bio.as_deref(), Some("Builds things"));

        delete_profile_and_user(&pool, user.id).await.expect("cleanup");
    }

    #[tokio::test]
    #[ignore] // Ignore by default since it requires a database
    async fn entry_removal_addresses_ids_on_the_stored_profile() {
        let pool = test_pool().await;
        let email = format!("entries-{}@example.com", Uuid::new_v4());
        let user = User::create(&pool, "Ada", &email, "hash", "avatar")
            .await
            .expect("user");
        upsert(&pool, user.id, &fields("Developer", None))
            .await
            .expect("profile");

        let older = entry(Uuid::new_v4(), "older");
        let newer = entry(Uuid::new_v4(), "newer");
        let newer_id = newer.id;
        add_experience(&pool, user.id, older.clone())
            .await
            .expect("add")
            .expect("profile exists");
        let record = add_experience(&pool, user.id, newer)
            .await
            .expect("add")
            .expect("profile exists");
        assert_eq!(record.experience.0[0].id, newer_id);
        assert_eq!(record.experience.0[1].id, older.id);

        let miss = remove_experience(&pool, user.id, Uuid::new_v4())
            .await
            .expect("remove");
        assert!(matches!(miss, EntryEdit::EntryNotFound));

        let hit = remove_experience(&pool, user.id, newer_id)
            .await
            .expect("remove");
        let EntryEdit::Updated(record) = hit else {
            panic!("expected an updated profile");
        };
        assert_eq!(record.experience.0.len(), 1);
        assert_eq!(record.experience.0[0].id, older.id);

        delete_profile_and_user(&pool, user.id).await.expect("cleanup");
        assert!(find_by_user(&pool, user.id).await.expect("fetch").is_none());
    }
}
