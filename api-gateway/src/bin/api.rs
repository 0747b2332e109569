//! API Lambda - Serves /api/calendar/events and /api/roadmap/search.

use api_gateway::{api_router, AppState, Router};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{ApiRequest, Config};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

async fn handler(router: Arc<Router>, event: Request) -> Result<Response<Body>, Error> {
    let request = ApiRequest::from_lambda(&event);
    router.dispatch(request).await.into_lambda()
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::from_config(&config).await?);
    let router = Arc::new(api_router(state));

    run(service_fn(move |event| {
        let router = Arc::clone(&router);
        async move { handler(router, event).await }
    }))
    .await
}
