mod campaign;
mod config;
mod db;
mod dispatch;
mod error;
mod routes;
mod services;
mod state;
mod store;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let state = state::AppState::connect(&config)
        .await
        .expect("store init failed");

    let _sweeper = services::sweeper::spawn_session_sweeper(state.clone(), config.sessions);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, recording = ?config.outcome_recording, "funnel listening");
    axum::serve(listener, app).await.expect("server failed");
}
