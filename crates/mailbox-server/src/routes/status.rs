use axum::Json;

/// GET /status — liveness probe.
pub async fn get_status() -> Json<serde_json::Value> {
    tracing::info!("status - OK");
    Json(serde_json::json!({ "status": "OK" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let Json(body) = get_status().await;
        assert_eq!(body["status"], "OK");
    }
}
