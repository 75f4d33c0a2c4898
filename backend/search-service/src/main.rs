use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use event_bus::{EventConsumer, RetryPolicy};
use search_service::{
    error::Result,
    events::{ContentEventHandler, UserEventHandler},
    Config, EsClient, IndexingService, SearchService,
};
use serde::Deserialize;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
    #[serde(rename = "type")]
    search_type: Option<String>,
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_page_size")]
    page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

/// Fuzzy search across posts, users and hashtags
///
/// GET /search?q&type&page&page_size
async fn search(
    service: web::Data<Arc<SearchService>>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    let results = service
        .search(
            &params.q,
            params.search_type.as_deref(),
            params.page,
            params.page_size,
        )
        .await?;

    Ok(HttpResponse::Ok().json(results))
}

async fn health(es: web::Data<EsClient>) -> HttpResponse {
    match es.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "service": "search-service",
            "elasticsearch": "connected"
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "search-service",
                "elasticsearch": "disconnected"
            }))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting search service");

    let config = Config::from_env();

    let es = match EsClient::new(&config.elasticsearch_url) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build Elasticsearch client: {}", e);
            return Err(io::Error::other("elasticsearch client failed"));
        }
    };

    match es.ensure_indices().await {
        Ok(()) => tracing::info!("Elasticsearch indices ready"),
        Err(e) => {
            // The service can still boot; consumers will fail and retry
            // until the index backend is reachable
            tracing::warn!("Failed to bootstrap indices: {}", e);
        }
    }

    let indexing = Arc::new(IndexingService::new(es.clone()));
    let search_service = Arc::new(SearchService::new(
        es.clone(),
        Duration::from_millis(config.search_timeout_ms),
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let retry = RetryPolicy::new(config.index_max_retries);
    match EventConsumer::new(
        &config.kafka_brokers,
        &config.kafka_consumer_group,
        vec![
            Arc::new(ContentEventHandler::new(
                config.kafka_content_topic.clone(),
                indexing.clone(),
                retry.clone(),
            )),
            Arc::new(UserEventHandler::new(
                config.kafka_user_topic.clone(),
                indexing.clone(),
                retry,
            )),
        ],
    ) {
        Ok(consumer) => {
            let consumer_shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                consumer.run(consumer_shutdown).await;
            });
        }
        Err(e) => {
            tracing::error!("Kafka consumer could not start: {}", e);
        }
    }

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting HTTP server on {}", addr);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(search_service.clone()))
            .app_data(web::Data::new(es.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health))
            .route("/search", web::get().to(search))
    })
    .bind(&addr)?
    .run()
    .await;

    let _ = shutdown_tx.send(true);
    server
}
