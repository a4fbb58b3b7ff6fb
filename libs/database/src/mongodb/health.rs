use mongodb::{bson::doc, Client};

use crate::common::{DatabaseError, DatabaseResult};

/// Check MongoDB connectivity with a `ping` command against the admin database.
pub async fn check_health(client: &Client) -> DatabaseResult<()> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    Ok(())
}
