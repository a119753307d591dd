mod config;
mod envelope;
mod error;
mod handlers;
mod local;
mod models;
mod records;
mod routes;
mod validators;

#[cfg(test)]
mod tests;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;

use dungeon_shared::store::dynamo::{DynamoCharacterStore, DynamoSaveStore};

use crate::config::ServiceConfig;
use crate::envelope::GatewayResponse;
use crate::handlers::AppState;

// The Lambda handler function
async fn function_handler(
    state: Arc<AppState>,
    event: LambdaEvent<Value>,
) -> Result<GatewayResponse, Error> {
    let (payload, context) = event.into_parts();
    tracing::debug!("Handling Lambda request {}", context.request_id);
    Ok(routes::dispatch(&state, payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing with enhanced configuration
    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,game_service=debug".into());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_ansi(false) // Disable ANSI colors in Lambda environment
        .with_target(true) // Include the target (module path) in logs
        .init();

    tracing::info!(
        "Logging initialized at level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        "Using tables characters={} saves={}",
        config.characters_table,
        config.saves_table
    );
    if let Some(operation) = config.handler {
        tracing::info!(
            "Serving single operation: {} ({} {})",
            operation,
            operation.method(),
            operation.resource()
        );
    }

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);

    let state = Arc::new(
        AppState::new(
            Arc::new(DynamoCharacterStore::with_client_and_table(
                client.clone(),
                config.characters_table.clone(),
            )),
            Arc::new(DynamoSaveStore::with_client_and_table(
                client,
                config.saves_table.clone(),
            )),
        )
        .pinned_to(config.handler),
    );

    if let Some(addr) = config.local_addr {
        tracing::info!("Starting service in non-Lambda environment");
        local::serve(addr, state).await?;
    } else {
        if let Ok(function_name) = std::env::var("AWS_LAMBDA_FUNCTION_NAME") {
            tracing::info!(
                "Starting AWS Lambda function: {} (version: {})",
                function_name,
                std::env::var("AWS_LAMBDA_FUNCTION_VERSION").unwrap_or_else(|_| "unknown".into())
            );
        }
        lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
            function_handler(Arc::clone(&state), event)
        }))
        .await?;
    }

    tracing::info!("Service finished");
    Ok(())
}
