use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use std::error::Error;
// Use log macros, but ensure test_logging::init_test_logging() is called in test files
use log::{debug, error, info};

/// # DynamoDB test utilities
///
/// These helpers create and clean DynamoDB Local tables shaped like the
/// production `characters` and `game-saves` tables.
///
/// Integration runs are opt-in: set `USE_DYNAMODB=true` and start DynamoDB
/// Local on `DYNAMO_LOCAL_URI`. Otherwise tests fall back to the in-memory
/// mock stores.

// Constants for DynamoDB tests
pub const DYNAMO_LOCAL_URI: &str = "http://localhost:8000";

// Helper to check if DynamoDB integration tests should be used
pub fn use_dynamodb() -> bool {
    std::env::var("USE_DYNAMODB").unwrap_or_default() == "true"
}

// Helper to set up a DynamoDB client for local testing
pub async fn create_dynamo_client() -> Client {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(DYNAMO_LOCAL_URI)
        .load()
        .await;

    Client::new(&config)
}

/// Creates a table with a string hash key and a string range key, dropping
/// any existing table of the same name first.
pub async fn create_composite_key_table(
    client: &Client,
    table_name: &str,
    hash_key: &str,
    range_key: &str,
) -> Result<(), Box<dyn Error>> {
    info!(
        "Creating dynamo table '{}' ({} / {})...",
        table_name, hash_key, range_key
    );

    let tables = client.list_tables().send().await?;
    if tables.table_names().contains(&table_name.to_string()) {
        info!("Table '{}' already exists, deleting it first...", table_name);
        client.delete_table().table_name(table_name).send().await?;
        loop {
            let tables = client.list_tables().send().await?;
            if !tables.table_names().contains(&table_name.to_string()) {
                info!("Table '{}' successfully deleted!", table_name);
                break;
            }
            debug!("Table '{}' still exists, waiting...", table_name);
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }
    }

    let mut create_table_req = client.create_table().table_name(table_name);

    for (attr_name, key_type) in [(hash_key, KeyType::Hash), (range_key, KeyType::Range)] {
        create_table_req = create_table_req
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(attr_name)
                    .key_type(key_type)
                    .build()?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(attr_name)
                    .attribute_type(ScalarAttributeType::S)
                    .build()?,
            );
    }

    create_table_req = create_table_req.provisioned_throughput(
        ProvisionedThroughput::builder()
            .read_capacity_units(5)
            .write_capacity_units(5)
            .build()?,
    );

    info!("Sending create table request...");
    let create_result = create_table_req.send().await;
    if let Err(e) = &create_result {
        error!("Error creating table '{}': {}", table_name, e);
    }
    create_result?;

    // Wait for the table to become ACTIVE before running tests
    loop {
        let resp = client
            .describe_table()
            .table_name(table_name)
            .send()
            .await?;
        if let Some(table_desc) = resp.table() {
            if table_desc.table_status() == Some(&TableStatus::Active) {
                break;
            }
            debug!(
                "Table '{}' status: {:?}",
                table_name,
                table_desc.table_status()
            );
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }

    info!("Table '{}' is ready for testing!", table_name);
    Ok(())
}

// Helper to create the characters table for testing
pub async fn create_characters_table(
    client: &Client,
    table_name: &str,
) -> Result<(), Box<dyn Error>> {
    create_composite_key_table(client, table_name, "userId", "id").await
}

// Helper to create the game saves table for testing
pub async fn create_saves_table(client: &Client, table_name: &str) -> Result<(), Box<dyn Error>> {
    create_composite_key_table(client, table_name, "userId", "characterId").await
}

/// Deletes every item from a table whose key is (`hash_key`, `range_key`).
/// Errors are logged and swallowed so a dirty table never aborts a test run.
pub async fn clear_dynamo_table(client: &Client, table_name: &str, hash_key: &str, range_key: &str) {
    let mut last_key: Option<HashMap<String, AttributeValue>> = None;
    loop {
        let scan_resp = match client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(last_key.take())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Failed to scan table '{}': {}", table_name, e);
                break;
            }
        };

        for item in scan_resp.items() {
            let (Some(hash), Some(range)) = (item.get(hash_key), item.get(range_key)) else {
                continue;
            };
            if let Err(e) = client
                .delete_item()
                .table_name(table_name)
                .key(hash_key, hash.clone())
                .key(range_key, range.clone())
                .send()
                .await
            {
                error!("Failed to delete item from table '{}': {}", table_name, e);
            }
        }

        match scan_resp.last_evaluated_key() {
            Some(key) if !key.is_empty() => last_key = Some(key.clone()),
            _ => break,
        }
    }
}
