//! Example consumer: CRUD routes for a `widget` table, optionally behind bearer tokens.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Set `JWT_SECRET` to require an `admin` role for writes.

use roadwork::{common_routes, BaseModel, BearerLibrary, PgOrm, Roadwork, Settings};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("roadwork=info,example_consumer=info")),
        )
        .init();

    let settings = Settings::from_env();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;
    let connection = Arc::new(PgOrm::new(pool));

    let mut api = Roadwork::builder()
        .server(axum::Router::new())
        .connection(connection.clone())
        .settings(&settings)
        .build()?;

    match BearerLibrary::from_settings(&settings) {
        Some(library) => api.add_authentication(Some(library)).await?,
        None => tracing::warn!("JWT_SECRET not set, generated routes are public"),
    }

    let admin_only = json!({ "allowedRoles": ["admin"] });
    api.generate(
        &BaseModel::new("widget").with_timestamps(),
        Some(&json!({
            "routes": {
                "create": admin_only,
                "update": admin_only,
                "delete": admin_only
            }
        })),
    )?;

    let app = api.router().merge(common_routes(connection));
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
