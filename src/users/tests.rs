//! Tests for the SQLite user directory

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::migrations::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn memory_pool() -> SqlitePool {
        // One connection: every `sqlite::memory:` connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        run_migrations(&pool, false).await.expect("Failed to run migrations");
        pool
    }

    async fn count_users(pool: &SqlitePool, email: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(pool)
            .await
            .expect("Failed to count users")
    }

    #[tokio::test]
    async fn test_upsert_creates_user() {
        let pool = memory_pool().await;
        let directory = SqliteUserDirectory::new(pool.clone());

        let user = directory
            .find_or_create_user(
                "a@x.com",
                &UserAttrs {
                    name: Some("A".to_string()),
                },
            )
            .await
            .expect("upsert failed")
            .expect("upsert returned no user");

        assert!(user.id.starts_with("U_"));
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name.as_deref(), Some("A"));
        assert_eq!(count_users(&pool, "a@x.com").await, 1);
    }

    #[tokio::test]
    async fn test_migrations_keep_rows_unless_reset() {
        let pool = memory_pool().await;
        let directory = SqliteUserDirectory::new(pool.clone());
        directory
            .find_or_create_user("a@x.com", &UserAttrs::default())
            .await
            .expect("upsert failed");

        run_migrations(&pool, false).await.expect("Failed to rerun migrations");
        assert_eq!(count_users(&pool, "a@x.com").await, 1);

        run_migrations(&pool, true).await.expect("Failed to reset schema");
        assert_eq!(count_users(&pool, "a@x.com").await, 0);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_on_email() {
        let pool = memory_pool().await;
        let directory = SqliteUserDirectory::new(pool.clone());
        let attrs = UserAttrs {
            name: Some("A".to_string()),
        };

        let first = directory
            .find_or_create_user("a@x.com", &attrs)
            .await
            .unwrap()
            .unwrap();
        let second = directory
            .find_or_create_user("a@x.com", &attrs)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(count_users(&pool, "a@x.com").await, 1);
    }

    #[tokio::test]
    async fn test_upsert_updates_name_and_keeps_it_when_absent() {
        let pool = memory_pool().await;
        let directory = SqliteUserDirectory::new(pool);

        directory
            .find_or_create_user("a@x.com", &UserAttrs { name: Some("A".into()) })
            .await
            .unwrap();
        let renamed = directory
            .find_or_create_user("a@x.com", &UserAttrs { name: Some("B".into()) })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name.as_deref(), Some("B"));

        let unchanged = directory
            .find_or_create_user("a@x.com", &UserAttrs::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.name.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let pool = memory_pool().await;
        let directory = SqliteUserDirectory::new(pool);

        let created = directory
            .find_or_create_user("a@x.com", &UserAttrs::default())
            .await
            .unwrap()
            .unwrap();

        let found = directory.get_user_by_id(&created.id).await.unwrap();
        assert_eq!(found, Some(created));

        let missing = directory.get_user_by_id("U_MISSING").await.unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User {
            id: "U_ABC123".to_string(),
            email: "a@x.com".to_string(),
            name: None,
            created_at: Some("2024-01-01 00:00:00".to_string()),
            updated_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["createdAt"], "2024-01-01 00:00:00");
        assert!(json.get("created_at").is_none());
    }
}
