// Plain static file serving for the dashboard assets and the generated JSON.

use log::info;

use axum::Router;
use snafu::ResultExt;
use tower_http::services::ServeDir;

use crate::dash::{BDashResult, BindingSnafu, RuntimeSnafu, ServingSnafu};

/// Serves `dir` over HTTP on `port` until interrupted. Fails up front when
/// the port is already bound.
pub fn run_serve(dir: String, port: u16) -> BDashResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context(RuntimeSnafu {})?;
    runtime.block_on(serve(dir, port))
}

async fn serve(dir: String, port: u16) -> BDashResult<()> {
    let app = Router::new().fallback_service(ServeDir::new(dir.clone()));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .context(BindingSnafu { port })?;
    info!("run_serve: listening on {}", addr);

    println!("Serving {} on http://localhost:{}", dir, port);
    println!("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await.context(ServingSnafu {})?;
    Ok(())
}
