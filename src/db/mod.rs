use crate::domain::{Principal, UserId};
use crate::services::visibility::ReportScope;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::report::Report;
pub use repositories::user::{DuplicateUser, NewUser};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn report_repo(&self) -> repositories::report::ReportRepository {
        repositories::report::ReportRepository::new(self.conn.clone())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<Principal>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().exists_username(username).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().exists_email(email).await
    }

    pub async fn create_user(&self, user: NewUser) -> Result<Principal> {
        self.user_repo().create(user).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn create_report(
        &self,
        owner: UserId,
        category: &str,
        message: &str,
    ) -> Result<Report> {
        self.report_repo().create(owner, category, message).await
    }

    pub async fn list_reports(&self, scope: ReportScope) -> Result<Vec<Report>> {
        self.report_repo().list(scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store")
    }

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_user_lookup_is_exact() {
        let store = memory_store().await;
        store.create_user(new_user("alice", Role::Staff)).await.unwrap();

        let found = store.get_user_by_username("alice").await.unwrap();
        assert_eq!(found.map(|p| p.role), Some(Role::Staff));

        assert!(store.get_user_by_username("Alice").await.unwrap().is_none());
        assert!(store.get_user_by_username("ali").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_uniqueness_checks() {
        let store = memory_store().await;
        store.create_user(new_user("bob", Role::Admin)).await.unwrap();

        assert!(store.username_exists("bob").await.unwrap());
        assert!(store.email_exists("bob@example.com").await.unwrap());
        assert!(!store.username_exists("carol").await.unwrap());

        // unique index rejects a second row with the same username or email
        let err = store.create_user(new_user("bob", Role::Staff)).await.unwrap_err();
        assert!(err.is::<DuplicateUser>());

        let mut same_email = new_user("robert", Role::Staff);
        same_email.email = "bob@example.com".to_string();
        let err = store.create_user(same_email).await.unwrap_err();
        assert!(err.is::<DuplicateUser>());
    }

    #[tokio::test]
    async fn test_list_reports_by_scope() {
        let store = memory_store().await;
        let alice = store.create_user(new_user("alice", Role::Staff)).await.unwrap();
        let bob = store.create_user(new_user("bob", Role::Staff)).await.unwrap();

        store.create_report(alice.id, "bug", "first").await.unwrap();
        store.create_report(bob.id, "bug", "second").await.unwrap();
        store.create_report(alice.id, "idea", "third").await.unwrap();

        let all = store.list_reports(ReportScope::All).await.unwrap();
        let messages: Vec<&str> = all.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);

        let own = store.list_reports(ReportScope::OwnedBy(alice.id)).await.unwrap();
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|r| r.user_id == alice.id));
    }

    #[tokio::test]
    async fn test_delete_user_cascades_reports() {
        let store = memory_store().await;
        let alice = store.create_user(new_user("alice", Role::Staff)).await.unwrap();
        store.create_report(alice.id, "bug", "gone soon").await.unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());
        assert!(store.get_user_by_username("alice").await.unwrap().is_none());
        assert!(store.list_reports(ReportScope::All).await.unwrap().is_empty());
        assert!(!store.delete_user(alice.id).await.unwrap());
    }
}
