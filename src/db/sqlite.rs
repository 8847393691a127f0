use crate::db::models::{Account, Provider};
use crate::db::schema::SQLITE_INIT;
use crate::error::AuthError;
use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub type SqlitePool = Pool<Sqlite>;

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, provider, \
     external_id, avatar_url, created_at, updated_at";

/// Durable key-value access to Account rows. No business logic lives here;
/// every operation is a point lookup or a single-row write.
#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), AuthError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_model).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_model).transpose()
    }

    /// Indexed point lookup on `(provider, external_id)`, the durable match
    /// key for SSO accounts.
    pub async fn find_by_provider_external_id(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE provider = ? AND external_id = ?"
        ))
        .bind(provider.as_str())
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_model).transpose()
    }

    /// Full scan. Acceptable at this data scale; nothing on the request path
    /// depends on it.
    pub async fn list_all(&self) -> Result<Vec<Account>, AuthError> {
        let rows = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Account, AuthError> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_model(row)
    }

    /// Insert a locally registered account. The UNIQUE constraint, not a
    /// pre-check, is the source of truth for duplicates: two concurrent
    /// registrations race safely and the loser observes `DuplicateUsername`.
    pub async fn insert_local(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, AuthError> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, provider, created_at, updated_at)
            VALUES (?, ?, 'local', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(Self::map_unique_violation)?;
        self.get_by_id(res.last_insert_rowid()).await
    }

    /// Insert an SSO-originated account. Same uniqueness contract as
    /// [`insert_local`](Self::insert_local).
    pub async fn insert_sso(
        &self,
        username: &str,
        email: Option<&str>,
        provider: Provider,
        external_id: &str,
        avatar_url: Option<&str>,
    ) -> Result<Account, AuthError> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (username, email, provider, external_id, avatar_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(provider.as_str())
        .bind(external_id)
        .bind(avatar_url)
        .execute(&self.pool)
        .await
        .map_err(Self::map_unique_violation)?;
        self.get_by_id(res.last_insert_rowid()).await
    }

    pub async fn update_password_hash(
        &self,
        account_id: i64,
        new_hash: &str,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(new_hash)
        .bind(account_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_avatar(&self, account_id: i64, avatar_url: &str) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET avatar_url = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(avatar_url)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn map_unique_violation(e: sqlx::Error) -> AuthError {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AuthError::DuplicateUsername
            }
            _ => AuthError::Database(e),
        }
    }

    fn row_to_model(row: SqliteRow) -> Result<Account, AuthError> {
        let id: i64 = row.try_get("id")?;
        let username: String = row.try_get("username")?;
        let email: Option<String> = row.try_get("email")?;
        let password_hash: Option<String> = row.try_get("password_hash")?;
        let provider_str: String = row.try_get("provider")?;
        let external_id: Option<String> = row.try_get("external_id")?;
        let avatar_url: Option<String> = row.try_get("avatar_url")?;
        let created_at: NaiveDateTime = row.try_get("created_at")?;
        let updated_at: NaiveDateTime = row.try_get("updated_at")?;

        let provider = Provider::from_str(&provider_str).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown provider '{provider_str}'").into())
        })?;

        Ok(Account {
            id,
            username,
            email,
            password_hash,
            provider,
            external_id,
            avatar_url,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> AccountStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        let store = AccountStore::new(pool);
        store.init_schema().await.expect("schema init");
        store
    }

    #[tokio::test]
    async fn insert_local_and_lookup_roundtrip() {
        let store = memory_store().await;
        let created = store.insert_local("alice", "$2b$fakehash").await.unwrap();
        assert_eq!(created.provider, Provider::Local);
        assert!(created.email.is_none());

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash.as_deref(), Some("$2b$fakehash"));
    }

    #[tokio::test]
    async fn duplicate_username_maps_to_conflict() {
        let store = memory_store().await;
        store.insert_local("bob", "h1").await.unwrap();
        let err = store.insert_local("bob", "h2").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
    }

    #[tokio::test]
    async fn sso_lookup_by_provider_and_external_id() {
        let store = memory_store().await;
        let created = store
            .insert_sso(
                "github_bob_999",
                Some("bob@x.com"),
                Provider::Github,
                "999",
                Some("A1"),
            )
            .await
            .unwrap();

        let found = store
            .find_by_provider_external_id(Provider::Github, "999")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        // same external id under a different provider is not a match
        assert!(
            store
                .find_by_provider_external_id(Provider::Google, "999")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_avatar_refreshes_row() {
        let store = memory_store().await;
        let created = store
            .insert_sso("g_user", Some("g@x.com"), Provider::Google, "42", None)
            .await
            .unwrap();
        store.update_avatar(created.id, "http://img").await.unwrap();
        let found = store.get_by_id(created.id).await.unwrap();
        assert_eq!(found.avatar_url.as_deref(), Some("http://img"));
    }
}
