//! List Collections Example
//!
//! Connects with credentials from the environment and prints a few documents.
//!
//! Run with:
//!   SHIPTHIS_ORGANISATION=demo SHIPTHIS_API_KEY=... cargo run --example list_collections

use shipthis_rs::{Client, ListQuery, SortOrder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = shipthis_rs::telemetry::init_telemetry("./logs")?;

    let client = Client::from_env()?;
    let connection = client.connect().await?;
    println!(
        "Connected (region: {:?}, location: {:?})\n",
        connection.region_id, connection.location_id
    );

    let client = match (connection.region_id, connection.location_id) {
        (Some(region), Some(location)) => client.with_region_location(region, location),
        _ => client,
    };

    let invoices = client.get_list("invoice", &ListQuery::new()).await?;
    println!("invoice: {} documents on the first page", invoices.len());

    // count is the number of records per page
    let shipments = client
        .get_list(
            "sea_shipment",
            &ListQuery::new()
                .count(2)
                .sort_by("created_at", SortOrder::Desc),
        )
        .await?;
    for shipment in &shipments {
        println!("  {}", shipment.get("_id").unwrap_or(&serde_json::Value::Null));
    }

    Ok(())
}
