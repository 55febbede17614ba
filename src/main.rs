use std::{net::SocketAddr, process, sync::Arc, time::Duration};

use jdigital::{
    application::{
        admin::{
            AdminContentService, AdminLeadService, AdminMediaService, AdminSettingsService,
            AdminUserService, AuthService,
        },
        error::AppError,
        leads::LeadIntakeService,
        notify::LeadNotifier,
        public::PublicSiteService,
        rate_limit::{InMemoryRateLimiter, RateLimitStore, RateLimiter, StoreRateLimiter},
        repos::{LeadsRepo, MediaRepo, PublicContentRepo, SiteSettingsRepo, UsersRepo},
        sitemap::SitemapService,
    },
    cache::{CacheConfig, CacheInvalidator, CacheState, InvalidationTable},
    config::{self, RateLimitBackend},
    domain::entities::{
        FaqRecord, PortfolioProjectRecord, PricingPackageRecord, ProcessStepRecord,
        ProjectCategoryRecord, ServiceRecord, TestimonialRecord,
    },
    infra::{
        db::PostgresRepositories,
        email::build_dispatcher,
        error::InfraError,
        http::{self, AdminState, PublicState},
        http_client,
        storage::build_storage,
        telemetry,
    },
};
use metrics::gauge;
use tokio::{task::JoinHandle, try_join};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::SeedAdmin(args) => run_seed_admin(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories.clone(), &settings)?;

    if let Some(password) = settings.site.admin_password.as_deref() {
        match app
            .admin_state
            .users
            .ensure_admin(
                &settings.site.admin_email,
                password,
                settings.site.admin_name.as_deref(),
            )
            .await
        {
            Ok(Some(user)) => info!(
                target = "jdigital::serve",
                user_id = %user.id,
                "seeded admin account"
            ),
            Ok(None) => {}
            Err(err) => warn!(
                target = "jdigital::serve",
                error = %err,
                "failed to seed admin account"
            ),
        }
    }

    let sweeper = spawn_rate_limit_sweeper(&settings, app.memory_limiter.clone(), repositories);
    let result = serve_http(&settings, app.public_state, app.admin_state).await;

    sweeper.abort();
    let _ = sweeper.await;

    result
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;
    info!(target = "jdigital::migrate", "migrations applied");
    Ok(())
}

async fn run_seed_admin(
    settings: config::Settings,
    args: config::SeedAdminArgs,
) -> Result<(), AppError> {
    let email = args
        .email
        .unwrap_or_else(|| settings.site.admin_email.clone());
    let password = args
        .password
        .or_else(|| settings.site.admin_password.clone())
        .ok_or_else(|| {
            AppError::validation("seed-admin needs --password or site.admin_password")
        })?;
    let name = args.name.or_else(|| settings.site.admin_name.clone());

    let repositories = init_repositories(&settings).await?;
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let users = AdminUserService::new(
        users_repo,
        CacheInvalidator::detached(),
        settings.auth.bcrypt_cost,
    );

    match users
        .ensure_admin(&email, &password, name.as_deref())
        .await
        .map_err(|err| AppError::validation(err.to_string()))?
    {
        Some(user) => info!(
            target = "jdigital::seed_admin",
            user_id = %user.id,
            email = %user.email,
            "admin account created"
        ),
        None => info!(
            target = "jdigital::seed_admin",
            email = %email,
            "admin account already exists"
        ),
    }
    Ok(())
}

struct ApplicationContext {
    public_state: PublicState,
    admin_state: AdminState,
    memory_limiter: Option<Arc<InMemoryRateLimiter>>,
}

async fn connect_pool(settings: &config::Settings) -> Result<sqlx::PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let pool = connect_pool(settings).await?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<ApplicationContext, AppError> {
    let public_repo: Arc<dyn PublicContentRepo> = repositories.clone();
    let leads_repo: Arc<dyn LeadsRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let settings_repo: Arc<dyn SiteSettingsRepo> = repositories.clone();
    let media_repo: Arc<dyn MediaRepo> = repositories.clone();

    let cache_config = CacheConfig::from(&settings.cache);
    let cache_state = cache_config
        .enabled
        .then(|| CacheState::new(cache_config.clone()));
    let invalidator = CacheInvalidator::new(
        InvalidationTable::default(),
        cache_state.as_ref().map(|state| state.store.clone()),
    );

    let (limiter, memory_limiter): (Arc<dyn RateLimiter>, Option<Arc<InMemoryRateLimiter>>) =
        match settings.rate_limit.backend {
            RateLimitBackend::Memory => {
                let limiter = Arc::new(InMemoryRateLimiter::new());
                (limiter.clone(), Some(limiter))
            }
            RateLimitBackend::Postgres => {
                let store: Arc<dyn RateLimitStore> = repositories.clone();
                (Arc::new(StoreRateLimiter::new(store)), None)
            }
        };

    let client = http_client().map_err(AppError::from)?;
    let notifier: Arc<dyn LeadNotifier> = Arc::new(
        build_dispatcher(&settings.notifications, client.clone()).map_err(AppError::from)?,
    );
    let storage = build_storage(&settings.storage, client);

    let public_state = PublicState {
        site: Arc::new(PublicSiteService::new(public_repo.clone())),
        sitemap: Arc::new(SitemapService::new(
            public_repo.clone(),
            &settings.site.base_url,
        )),
        leads: Arc::new(LeadIntakeService::new(
            leads_repo.clone(),
            limiter,
            notifier,
            settings.rate_limit.policies(),
        )),
        repo: public_repo,
        trust_forwarded_for: settings.rate_limit.trust_forwarded_for,
        cache: cache_state,
    };

    let admin_state = AdminState {
        auth: Arc::new(AuthService::new(
            users_repo.clone(),
            settings.auth.secret.clone(),
            settings.auth.session_ttl_hours,
        )),
        services: Arc::new(AdminContentService::<ServiceRecord>::new(
            repositories.clone(),
            invalidator.clone(),
        )),
        portfolio: Arc::new(AdminContentService::<PortfolioProjectRecord>::new(
            repositories.clone(),
            invalidator.clone(),
        )),
        categories: Arc::new(AdminContentService::<ProjectCategoryRecord>::new(
            repositories.clone(),
            invalidator.clone(),
        )),
        process: Arc::new(AdminContentService::<ProcessStepRecord>::new(
            repositories.clone(),
            invalidator.clone(),
        )),
        pricing: Arc::new(AdminContentService::<PricingPackageRecord>::new(
            repositories.clone(),
            invalidator.clone(),
        )),
        faqs: Arc::new(AdminContentService::<FaqRecord>::new(
            repositories.clone(),
            invalidator.clone(),
        )),
        testimonials: Arc::new(AdminContentService::<TestimonialRecord>::new(
            repositories.clone(),
            invalidator.clone(),
        )),
        settings: Arc::new(AdminSettingsService::new(
            settings_repo,
            invalidator.clone(),
        )),
        leads: Arc::new(AdminLeadService::new(leads_repo, invalidator.clone())),
        media: Arc::new(AdminMediaService::new(
            media_repo,
            storage,
            invalidator.clone(),
            settings.storage.upload_limit_bytes.get(),
        )),
        users: Arc::new(AdminUserService::new(
            users_repo,
            invalidator,
            settings.auth.bcrypt_cost,
        )),
        secure_cookies: settings.site.base_url.starts_with("https://"),
    };

    if !admin_state.auth.is_configured() {
        warn!(
            target = "jdigital::serve",
            "auth.secret is not set; admin login is disabled"
        );
    }

    Ok(ApplicationContext {
        public_state,
        admin_state,
        memory_limiter,
    })
}

/// Periodically drops idle in-memory buckets or expired counter rows.
fn spawn_rate_limit_sweeper(
    settings: &config::Settings,
    memory: Option<Arc<InMemoryRateLimiter>>,
    repositories: Arc<PostgresRepositories>,
) -> JoinHandle<()> {
    let interval = settings.rate_limit.cleanup_interval;
    let window = settings.rate_limit.window;
    let store = StoreRateLimiter::new(repositories);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match memory.as_ref() {
                Some(limiter) => {
                    let removed = limiter.sweep(window);
                    gauge!("jdigital_rate_limit_keys").set(limiter.tracked_keys() as f64);
                    if removed > 0 {
                        info!(
                            target = "jdigital::rate_limit",
                            removed, "swept idle rate limit keys"
                        );
                    }
                }
                None => match store.cleanup(window).await {
                    Ok(removed) if removed > 0 => info!(
                        target = "jdigital::rate_limit",
                        removed, "deleted expired rate limit rows"
                    ),
                    Ok(_) => {}
                    Err(err) => warn!(
                        target = "jdigital::rate_limit",
                        error = %err,
                        "rate limit cleanup failed"
                    ),
                },
            }
        }
    })
}

async fn serve_http(
    settings: &config::Settings,
    public_state: PublicState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_public_router(public_state);
    let upload_body_limit =
        usize::try_from(settings.storage.upload_limit_bytes.get()).unwrap_or(usize::MAX);
    let admin_router = http::build_admin_router(admin_state, upload_body_limit);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| InfraError::bind(settings.server.public_addr, err))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| InfraError::bind(settings.server.admin_addr, err))?;

    info!(
        target = "jdigital::serve",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "listening"
    );

    let grace = settings.server.graceful_shutdown;
    let public_server = axum::serve(
        public_listener,
        public_router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(grace));
    let admin_server = axum::serve(
        admin_listener,
        admin_router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(grace));

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

/// Resolves on Ctrl-C, then forces exit if draining outlasts `grace`.
async fn shutdown_signal(grace: Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target = "jdigital::serve",
            error = %err,
            "failed to listen for shutdown signal"
        );
        return std::future::pending().await;
    }
    info!(
        target = "jdigital::serve",
        grace_secs = grace.as_secs(),
        "shutdown requested; draining connections"
    );
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(
            target = "jdigital::serve",
            "graceful shutdown timed out"
        );
        process::exit(0);
    });
}
