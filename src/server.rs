use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::db::{Connector, XsecConnection};
use crate::energy::Energy;
use crate::handler::{self, XsecError, XsecParams};
use crate::reader;

pub struct AppState<C> {
    pub connector: C,
}

pub fn build_router<C: Connector>(connector: C) -> Router {
    let state = Arc::new(AppState { connector });
    Router::new()
        .route("/", get(xsec::<C>))
        .route("/history", get(history::<C>))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve<C: Connector>(addr: SocketAddr, connector: C) -> std::io::Result<()> {
    let router = build_router(connector);
    info!(%addr, "serving cross sections");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

fn error_status(err: &XsecError) -> StatusCode {
    match err {
        XsecError::InvalidEnergy(_) => StatusCode::BAD_REQUEST,
        XsecError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
        XsecError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn xsec<C: Connector>(
    State(state): State<Arc<AppState<C>>>,
    Query(params): Query<XsecParams>,
) -> Response {
    match handler::handle(&state.connector, params).await {
        Ok(handler::Response::Text(body)) => plain_text(StatusCode::OK, body),
        Ok(handler::Response::Browse(page)) => match page.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                error!(error = %err, "failed to render listing");
                plain_text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Rendering failed: {err}"),
                )
            }
        },
        Err(err) => plain_text(error_status(&err), err.to_string()),
    }
}

#[derive(Debug, Default)]
struct HistoryParams {
    sample: Vec<String>,
    energy: Option<String>,
}

async fn history<C: Connector>(
    State(state): State<Arc<AppState<C>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = history_params(pairs);
    let energy = match params.energy.as_deref().map(str::parse::<Energy>) {
        None => Energy::default(),
        Some(Ok(energy)) => energy,
        Some(Err(err)) => return plain_text(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let mut conn = match state.connector.connect().await {
        Ok(conn) => conn,
        Err(err) => {
            let err = XsecError::from(err);
            return plain_text(error_status(&err), err.to_string());
        }
    };
    let history = reader::dump_history(&mut conn, energy, &params.sample).await;
    conn.close().await;

    match history {
        Ok(history) => Json(history).into_response(),
        Err(err) => {
            let err = XsecError::from(err);
            plain_text(error_status(&err), err.to_string())
        }
    }
}

/// Repeated `sample` keys are collected in order.
fn history_params(pairs: Vec<(String, String)>) -> HistoryParams {
    let mut params = HistoryParams::default();
    for (key, value) in pairs {
        match key.as_str() {
            "sample" => params.sample.push(value),
            "energy" => params.energy = Some(value),
            _ => {}
        }
    }
    params
}

async fn health() -> impl IntoResponse {
    "ok"
}
