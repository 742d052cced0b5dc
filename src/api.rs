// Recommendation API binary entry point

mod config;
mod error;
mod repo;
mod router;

#[path = "api/handlers/mod.rs"]
mod handlers;

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use tokio::sync::OnceCell;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::ApiError;
use reforest_engine::{
    EngineConfig, InMemoryDatasetProvider, RandomIdGenerator, RecommendationEngine, SystemClock,
};
use repo::readings::DynamoReadingHistory;
use repo::recommendations::DynamoRecommendationStore;
use repo::species::{ensure_species_loaded, load_species};
use router::{route_request, Services};

/// State built once per cold start and reused by warm invocations
struct App {
    config: Config,
    species: Arc<InMemoryDatasetProvider>,
    engine: RecommendationEngine,
    store: DynamoRecommendationStore,
    history: DynamoReadingHistory,
}

impl App {
    async fn init() -> Result<Self, ApiError> {
        let config = Config::from_env().await.map_err(|e| {
            error!(error = %e, "Failed to load configuration");
            ApiError::Internal(format!("Configuration error: {}", e))
        })?;

        let species = Arc::new(InMemoryDatasetProvider::empty());

        let app = Self {
            engine: RecommendationEngine::new(EngineConfig::default(), species.clone()),
            species,
            store: DynamoRecommendationStore::new(
                config.dynamodb_client.clone(),
                &config.recommendations_table,
            ),
            history: DynamoReadingHistory::new(
                config.dynamodb_client.clone(),
                &config.sensor_readings_table,
            ),
            config,
        };

        // An unreadable species table leaves the dataset empty and does not
        // fail the cold start; recommendation requests retry the load.
        app.ensure_species().await;

        Ok(app)
    }

    async fn ensure_species(&self) -> bool {
        ensure_species_loaded(&self.species, || {
            load_species(&self.config.dynamodb_client, &self.config.species_table)
        })
        .await
    }
}

fn needs_species(event: &Request) -> bool {
    event.method() == lambda_http::http::Method::POST
        && router::normalize_path(event.uri().path()) == "/recommendations"
}

static APP: OnceCell<App> = OnceCell::const_new();

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    let request_id = event.lambda_context().request_id.clone();

    info!(
        request_id = %request_id,
        method = %event.method(),
        path = %event.uri().path(),
        "Recommendation API invoked"
    );

    // Health checks never touch configuration or storage
    if event.method() == lambda_http::http::Method::GET
        && router::normalize_path(event.uri().path()) == "/health"
    {
        return Ok(match router::route_request_health(&request_id) {
            Ok(response) => response,
            Err(api_error) => api_error.to_http_response(&request_id),
        });
    }

    let app = match APP.get_or_try_init(App::init).await {
        Ok(app) => app,
        Err(api_error) => return Ok(api_error.to_http_response(&request_id)),
    };

    if needs_species(&event) && !app.ensure_species().await {
        info!(request_id = %request_id, "Species dataset still unavailable");
    }

    let clock = SystemClock::new();
    let id_generator = RandomIdGenerator::new();
    let services = Services {
        engine: &app.engine,
        store: &app.store,
        history: &app.history,
        clock: &clock,
        id_generator: &id_generator,
    };

    match route_request(event, &request_id, &services).await {
        Ok(response) => {
            info!(
                request_id = %request_id,
                status = %response.status(),
                "Request completed successfully"
            );
            Ok(response)
        }
        Err(api_error) => {
            error!(
                request_id = %request_id,
                error = %api_error,
                "Request failed"
            );
            Ok(api_error.to_http_response(&request_id))
        }
    }
}

/// Log filter from `RUST_LOG`, then `LOG_LEVEL`, defaulting to info
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_target(false)
        .without_time()
        .init();

    info!("Recommendation API starting");

    run(service_fn(function_handler)).await
}
