use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::channel::StatsSnapshot;
use crate::gateway::GatewayError;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct GatewayStatus {
    pub version: &'static str,
    pub backend: String,
    #[serde(flatten)]
    pub serializer: StatsSnapshot,
}

pub async fn get_status(State(state): State<AppState>) -> Json<GatewayStatus> {
    let serializer = state.gateway.serializer();
    Json(GatewayStatus {
        version: env!("CARGO_PKG_VERSION"),
        backend: serializer.endpoint().to_string(),
        serializer: serializer.stats(),
    })
}

pub async fn reconnect(State(state): State<AppState>) -> Response {
    match state.gateway.serializer().reconnect().await {
        Ok(()) => {
            tracing::info!("Backend reconnected via admin API");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "status": "reconnected" })),
            )
                .into_response()
        }
        Err(e) => GatewayError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::channel::testing::{spawn_serializer, ScriptedChannel};
    use crate::channel::SerializerOptions;
    use crate::config::GatewayConfig;
    use crate::gateway::Gateway;
    use crate::http::HttpServer;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    fn admin_router(channel: ScriptedChannel) -> (Router, crate::lifecycle::Shutdown) {
        let mut config = GatewayConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = "s3cret".into();
        let (handle, shutdown, _task) = spawn_serializer(channel, SerializerOptions::default());
        (HttpServer::new(config, Gateway::new(handle)).router(), shutdown)
    }

    fn authorized(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn status_requires_the_api_key() {
        let (channel, _probe) = ScriptedChannel::new();
        let (router, _shutdown) = admin_router(channel);

        let anonymous = router
            .clone()
            .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let response = router.oneshot(authorized("GET", "/admin/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap())
                .unwrap();
        assert_eq!(body["state"], "connected");
        assert_eq!(body["backend"], "scripted://backend");
        assert_eq!(body["queued"], 0);
    }

    #[tokio::test]
    async fn reconnect_restores_a_failed_channel() {
        let (channel, probe) = ScriptedChannel::new();
        let (router, _shutdown) = admin_router(channel.fail_reply(1));

        let failed = router
            .clone()
            .oneshot(Request::post("/worker-info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);

        let response = router
            .clone()
            .oneshot(authorized("POST", "/admin/reconnect"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(probe.reconnects(), 1);

        let ok = router
            .oneshot(Request::post("/worker-info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
    }
}
