use std::{process, sync::Arc, time::Duration};

use brezza::{
    application::{
        error::AppError,
        providers::{ProfilesProvider, StaticPagesProvider},
        sitemap::SitemapService,
        sources::{EntryProvider, ProfilesRepo, RouteResolver},
    },
    cache::{CacheConfig, SlidingStore},
    config,
    infra::{
        directory::InMemoryProfiles,
        error::InfraError,
        http::{self, HttpState},
        routes::SiteRoutes,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
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
        config::Command::Sitemap(args) => run_sitemap(settings, args).await,
    }
}

fn build_sitemap_service(settings: &config::Settings) -> Arc<SitemapService> {
    let routes: Arc<dyn RouteResolver> =
        Arc::new(SiteRoutes::new(settings.site.public_url.clone()));
    let profiles: Arc<dyn ProfilesRepo> = Arc::new(InMemoryProfiles::new());
    let providers: Vec<Arc<dyn EntryProvider>> = vec![
        Arc::new(StaticPagesProvider::standard()),
        Arc::new(ProfilesProvider::new(profiles)),
    ];

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = cache_config
        .enabled
        .then(|| Arc::new(SlidingStore::new(&cache_config)));

    Arc::new(SitemapService::new(routes, providers, cache))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let sitemap = build_sitemap_service(&settings);
    let router = http::build_router(HttpState { sitemap });

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "brezza::serve",
        addr = %settings.server.public_addr,
        site = %settings.site.public_url,
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(
            target = "brezza::serve",
            grace_seconds = grace.as_secs(),
            "Shutdown signal received, draining connections"
        ),
        Err(err) => error!(error = %err, "failed to listen for shutdown signal"),
    }
}

async fn run_sitemap(
    settings: config::Settings,
    args: config::SitemapArgs,
) -> Result<(), AppError> {
    let sitemap = build_sitemap_service(&settings);

    match sitemap.document(args.index).await {
        Some(document) => {
            println!("{document}");
            Ok(())
        }
        None => {
            let count = sitemap.document_count().await;
            Err(AppError::validation(format!(
                "index {} is outside the document range 0..{count}",
                args.index.unwrap_or(0)
            )))
        }
    }
}
