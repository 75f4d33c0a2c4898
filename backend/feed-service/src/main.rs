use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use db_pool::{create_pool, DbConfig};
use event_bus::EventConsumer;
use feed_service::{
    handlers::register_routes,
    repo::FeedRepo,
    services::{ContentEventHandler, FeedService},
    Config, FeedCache, RelevanceScorer,
};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

    tracing::info!("Starting feed service");

    let config = Config::from_env();

    let db_pool = match create_pool(DbConfig::for_service("feed-service")).await {
        Ok(pool) => {
            tracing::info!("Connected to database");
            pool
        }
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            return Err(io::Error::other("database connection failed"));
        }
    };

    let cache = match FeedCache::connect(
        &config.redis_url,
        config.feed_cache_ttl_secs,
        config.score_cache_ttl_secs,
    )
    .await
    {
        Ok(cache) => {
            tracing::info!("Connected to Redis");
            cache
        }
        Err(e) => {
            tracing::error!("Failed to connect to Redis: {}", e);
            return Err(io::Error::other("redis connection failed"));
        }
    };

    let scorer = RelevanceScorer::new(
        config.engagement_weight_likes,
        config.engagement_weight_comments,
        config.engagement_weight_shares,
        config.time_decay_hours,
    );

    let service = Arc::new(FeedService::new(
        FeedRepo::new(db_pool),
        cache,
        scorer,
        config.posts_per_page,
        config.max_feed_size,
        config.trending_window_days,
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Cache invalidation driven by content events
    match EventConsumer::new(
        &config.kafka_brokers,
        &config.kafka_consumer_group,
        vec![Arc::new(ContentEventHandler::new(
            config.kafka_content_topic.clone(),
            service.clone(),
        ))],
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
            .app_data(web::Data::new(service.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health))
            .configure(register_routes)
    })
    .bind(&addr)?
    .run()
    .await;

    let _ = shutdown_tx.send(true);
    server
}

async fn health(service: web::Data<Arc<FeedService>>) -> HttpResponse {
    let database = sqlx::query("SELECT 1")
        .execute(service.repo().pool())
        .await
        .is_ok();
    let redis = service.cache().ping().await.is_ok();

    let status = if database && redis {
        "healthy"
    } else {
        "unhealthy"
    };
    let body = serde_json::json!({
        "status": status,
        "service": "feed-service",
        "database": if database { "connected" } else { "disconnected" },
        "redis": if redis { "connected" } else { "disconnected" },
    });

    if database && redis {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
