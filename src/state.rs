use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, PasswordHasher, ReportService, SeaOrmReportService, SeaOrmUserService,
    TokenAuthService, TokenCodec, UserService,
};

/// Everything a request handler or CLI command needs, built once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub report_service: Arc<dyn ReportService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::from_config(&config.security)
            .map_err(|e| anyhow::anyhow!("Failed to build password hasher: {e}"))?;

        let codec = TokenCodec::new(&config.security.secret_key, config.security.token_ttl());

        let auth_service: Arc<dyn AuthService> = Arc::new(TokenAuthService::new(
            Arc::new(store.clone()),
            hasher.clone(),
            codec,
        ));

        let user_service: Arc<dyn UserService> = Arc::new(SeaOrmUserService::new(
            store.clone(),
            hasher,
            config.security.min_password_length,
        ));

        let report_service: Arc<dyn ReportService> =
            Arc::new(SeaOrmReportService::new(store.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            user_service,
            report_service,
        })
    }
}
