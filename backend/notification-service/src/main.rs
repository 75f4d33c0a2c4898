use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use db_pool::{create_pool, DbConfig};
use event_bus::EventConsumer;
use notification_service::{
    handlers::{register_notifications, register_preferences},
    services::{
        retention::run_retention_sweep, ApnsClient, ContentEventHandler, FcmClient,
        PushSender, ServiceAccountKey, SocialEventHandler,
    },
    Config, NotificationService,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
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

    tracing::info!("Starting notification service");

    let config = Config::from_env();

    let db_pool = match create_pool(DbConfig::for_service("notification-service")).await {
        Ok(pool) => {
            tracing::info!("Connected to database");
            pool
        }
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            return Err(io::Error::other("database connection failed"));
        }
    };

    // FCM is optional: without credentials, pushes fall through to APNs or mock
    let fcm_client: Option<Arc<FcmClient>> = match std::env::var("FCM_CREDENTIALS") {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<ServiceAccountKey>(&json) {
                Ok(key) => {
                    let client = FcmClient::new(key);
                    tracing::info!(
                        "FCM client initialized for project {} from {}",
                        client.project_id(),
                        path
                    );
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::warn!("Failed to parse FCM credentials from {}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read FCM credentials file {}: {}", path, e);
                None
            }
        },
        Err(_) => {
            tracing::warn!("FCM_CREDENTIALS not set - FCM push notifications disabled");
            None
        }
    };

    let apns_client: Option<Arc<ApnsClient>> = match std::env::var("APNS_KEY_PATH") {
        Ok(key_path) => {
            let key_id = std::env::var("APNS_KEY_ID").unwrap_or_default();
            let team_id = std::env::var("APNS_TEAM_ID").unwrap_or_default();
            let bundle_id = std::env::var("APNS_BUNDLE_ID")
                .unwrap_or_else(|_| "social.orbe.app".to_string());
            let is_production = std::env::var("APNS_PRODUCTION")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false);

            if key_id.is_empty() || team_id.is_empty() {
                tracing::warn!("APNS_KEY_ID or APNS_TEAM_ID not set - APNs disabled");
                None
            } else {
                match std::fs::read_to_string(&key_path) {
                    Ok(key_pem) => {
                        tracing::info!(
                            "APNs client initialized (production={}) from {}",
                            is_production,
                            key_path
                        );
                        Some(Arc::new(ApnsClient::new(
                            key_pem,
                            key_id,
                            team_id,
                            bundle_id,
                            is_production,
                        )))
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read APNs key file {}: {}", key_path, e);
                        None
                    }
                }
            }
        }
        Err(_) => {
            tracing::warn!("APNS_KEY_PATH not set - APNs push notifications disabled");
            None
        }
    };

    let notification_service = Arc::new(NotificationService::new(
        db_pool.clone(),
        config.comment_aggregation_minutes,
    ));
    let push_sender = Arc::new(PushSender::new(fcm_client, apns_client));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Event-driven notification creation
    let consumer = EventConsumer::new(
        &config.kafka_brokers,
        &config.kafka_consumer_group,
        vec![
            Arc::new(ContentEventHandler::new(
                config.kafka_content_topic.clone(),
                notification_service.clone(),
                push_sender.clone(),
            )),
            Arc::new(SocialEventHandler::new(
                config.kafka_social_topic.clone(),
                notification_service.clone(),
                push_sender.clone(),
            )),
        ],
    );
    match consumer {
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

    // Retention sweep
    tokio::spawn(run_retention_sweep(
        notification_service.clone(),
        config.notification_retention_days,
        Duration::from_secs(config.retention_sweep_secs),
        shutdown_rx.clone(),
    ));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting HTTP server on {}", addr);

    let app_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health))
            .configure(|cfg| {
                register_notifications(cfg);
                register_preferences(cfg);
            })
    })
    .bind(&addr)?
    .run()
    .await;

    let _ = shutdown_tx.send(true);
    server
}

async fn health(service: web::Data<Arc<NotificationService>>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(service.pool()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "service": "notification-service",
            "database": "connected"
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "notification-service",
                "database": "disconnected"
            }))
        }
    }
}
