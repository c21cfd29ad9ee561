use anyhow::Context;
use chrono::{Duration, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use home_common::{
    endpoints::join_url,
    history::{generate_history, HistoricalReading, DEFAULT_INTERVAL_MINUTES, DEFAULT_SAMPLES},
    BackendConfig, HEADER_API_KEY, HEADER_PREFER, PATH_SENSOR_READINGS, PREFER_RETURN_MINIMAL,
};

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut backend = BackendConfig::default();
    backend.apply_overrides(|key| std::env::var(key).ok());
    backend.sanitize();

    let readings = generate_history(
        Utc::now(),
        DEFAULT_SAMPLES,
        Duration::minutes(DEFAULT_INTERVAL_MINUTES),
        &mut rand::rng(),
    );
    info!("generated {} test readings", readings.len());
    if let Some(first) = readings.first() {
        info!(
            "sample: {} = {} {} at {}",
            first.sensor_type, first.value, first.unit, first.timestamp
        );
    }

    post_history(&reqwest::Client::new(), &backend, &readings).await?;

    info!("test data inserted successfully");
    Ok(())
}

/// Bulk-inserts `readings` in a single request. Any 2xx counts as stored.
pub async fn post_history(
    client: &reqwest::Client,
    backend: &BackendConfig,
    readings: &[HistoricalReading],
) -> anyhow::Result<()> {
    let url = join_url(&backend.url, PATH_SENSOR_READINGS);
    let response = client
        .post(&url)
        .header(HEADER_API_KEY, &backend.key)
        .bearer_auth(&backend.key)
        .header(HEADER_PREFER, PREFER_RETURN_MINIMAL)
        .json(readings)
        .send()
        .await
        .with_context(|| {
            format!("failed to reach {url}; set HOME_BACKEND_URL and HOME_BACKEND_KEY")
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("inserting test data failed with {status}: {body}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::Value;

    use super::*;

    #[derive(Debug, Default, Clone)]
    struct Seen {
        apikey: Option<String>,
        authorization: Option<String>,
        prefer: Option<String>,
        body: Option<Value>,
    }

    type Shared = Arc<Mutex<Seen>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn backend(url: String) -> BackendConfig {
        BackendConfig {
            url,
            key: "k".to_string(),
        }
    }

    fn sample() -> Vec<HistoricalReading> {
        let now = "2026-01-05T12:00:00Z".parse().unwrap();
        generate_history(now, 2, Duration::minutes(5), &mut StdRng::seed_from_u64(5))
    }

    fn header(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn posts_readings_as_one_authenticated_batch() {
        let seen = Shared::default();
        let router = Router::new()
            .route(
                "/rest/v1/sensor_readings",
                post(
                    |State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        *seen.lock().unwrap() = Seen {
                            apikey: header(&headers, "apikey"),
                            authorization: header(&headers, "authorization"),
                            prefer: header(&headers, "prefer"),
                            body: Some(body),
                        };
                        StatusCode::CREATED
                    },
                ),
            )
            .with_state(seen.clone());
        let base = serve(router).await;

        post_history(&reqwest::Client::new(), &backend(base), &sample())
            .await
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.apikey.as_deref(), Some("k"));
        assert_eq!(seen.authorization.as_deref(), Some("Bearer k"));
        assert_eq!(seen.prefer.as_deref(), Some("return=minimal"));
        let body = seen.body.unwrap();
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 18);
        assert_eq!(rows[0]["timestamp"], "2026-01-05T12:00:00Z");
        assert!(rows[0]["sensor_type"].is_string());
        assert!(rows[0]["unit"].is_string());
    }

    #[tokio::test]
    async fn rejected_batch_reports_status_and_body() {
        let router = Router::new().route(
            "/rest/v1/sensor_readings",
            post(|| async { (StatusCode::BAD_REQUEST, "invalid input syntax for type timestamp") }),
        );
        let base = serve(router).await;

        let err = post_history(&reqwest::Client::new(), &backend(base), &sample())
            .await
            .unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("400"));
        assert!(message.contains("invalid input syntax for type timestamp"));
    }

    #[tokio::test]
    async fn unreachable_backend_names_the_url() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = post_history(&reqwest::Client::new(), &backend(base.clone()), &sample())
            .await
            .unwrap_err();

        assert!(err.to_string().contains(&base));
        assert!(err.to_string().contains("HOME_BACKEND_URL"));
    }
}
