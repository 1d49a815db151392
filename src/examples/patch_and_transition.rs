//! Patch and Workflow Example
//!
//! Updates fields on a load, then moves the parent job through its workflow.
//!
//! Run with:
//!   SHIPTHIS_ORGANISATION=demo SHIPTHIS_API_KEY=... \
//!     cargo run --example patch_and_transition -- <fcl_load id> <pickup_delivery id>

use serde_json::json;
use shipthis_rs::{Client, ErrorKind, PrimaryWorkflowAction, SecondaryWorkflowAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = shipthis_rs::telemetry::init_telemetry("./logs")?;

    let mut args = std::env::args().skip(1);
    let (Some(load_id), Some(job_id)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: patch_and_transition <fcl_load id> <pickup_delivery id>");
    };

    let client = Client::from_env()?;

    let load = client
        .collection("fcl_load")
        .patch(&load_id, json!({"container_no": "CONT123", "seal_no": "SEAL456"}))
        .await?;
    println!("Patched load: {}", load);

    let transition = client
        .primary_workflow_action(
            "pickup_delivery",
            &PrimaryWorkflowAction {
                workflow_id: "job_status".to_string(),
                object_id: job_id.clone(),
                action_index: 0,
                intended_state_id: "ops_complete".to_string(),
                start_state_id: None,
            },
        )
        .await;

    match transition {
        Ok(result) => println!("Job status: {}", result),
        Err(e) if e.kind() == ErrorKind::Request => {
            println!("Transition rejected by server: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    let driver = client
        .secondary_workflow_action(
            "pickup_delivery",
            &SecondaryWorkflowAction {
                workflow_id: "driver_status".to_string(),
                object_id: job_id,
                target_state: "to_pick_up".to_string(),
                additional_data: None,
            },
        )
        .await?;
    println!("Driver status: {}", driver);

    Ok(())
}
