// src/config.rs

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::{env, sync::Arc, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{InMemoryPersonRepository, PersonStore, PgPersonRepository},
    services::{auth::AuthService, move_service::MoveService, person_service::PersonService},
};

// Primeiro admin, criado na subida se o e-mail ainda não existir
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub name: String,
    pub site: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    // Sem DATABASE_URL o diretório fica em memória
    pub database_url: Option<String>,
    pub managed_sites: Vec<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let token_ttl_days = parse_token_ttl_days(env::var("TOKEN_TTL_DAYS").ok().as_deref())?;

        let managed_sites = env::var("MANAGED_SITES")
            .unwrap_or_else(|_| "mbt,mfs,kir".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let bootstrap_admin = env::var("BOOTSTRAP_ADMIN_EMAIL").ok().map(|email| BootstrapAdmin {
            email,
            name: env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
            site: env::var("BOOTSTRAP_ADMIN_SITE").unwrap_or_else(|_| "other".to_string()),
        });

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jwt_secret,
            token_ttl_days,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            managed_sites,
            bootstrap_admin,
        })
    }
}

// Validade dos tokens, em dias
const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;
const MAX_TOKEN_TTL_DAYS: i64 = 3650;

fn parse_token_ttl_days(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(DEFAULT_TOKEN_TTL_DAYS);
    };

    let days: i64 = raw
        .parse()
        .with_context(|| format!("TOKEN_TTL_DAYS inválido: {raw}"))?;
    if !(1..=MAX_TOKEN_TTL_DAYS).contains(&days) {
        anyhow::bail!("TOKEN_TTL_DAYS deve estar entre 1 e {MAX_TOKEN_TTL_DAYS}, veio {days}");
    }
    Ok(days)
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub person_service: PersonService,
    pub move_service: MoveService,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    /// Escolhe o backend, roda as migrações (Postgres) e cria o admin inicial.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn PersonStore> = match &config.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgPersonRepository::new(db_pool))
            }
            None => {
                tracing::warn!("DATABASE_URL não definida, usando diretório em memória");
                Arc::new(InMemoryPersonRepository::new())
            }
        };

        let state = Self::with_store(config, store);

        if let Some(admin) = &state.config.bootstrap_admin {
            state
                .person_service
                .ensure_bootstrap_admin(&admin.email, &admin.name, &admin.site)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao criar o admin inicial: {e}"))?;
        }

        Ok(state)
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(config: AppConfig, store: Arc<dyn PersonStore>) -> Self {
        let auth_service = AuthService::new(store.clone(), config.jwt_secret.clone(), config.token_ttl_days);
        let person_service = PersonService::new(store.clone());
        let move_service = MoveService::new(store);

        Self {
            config: Arc::new(config),
            auth_service,
            person_service,
            move_service,
            i18n_store: Arc::new(I18nStore::default()),
        }
    }
}
