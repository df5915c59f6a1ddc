// Verse Graph Server - social-graph API for the verses publishing app

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use verse_graph::{api::create_graph_router, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    // Build application router
    let app = Router::new()
        .nest("/api/v1", create_graph_router(app_state))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    println!("🚀 Verse Graph Server starting on http://{}", addr);
    println!("📋 API:");
    println!("  POST   /api/v1/users                 - Create profile");
    println!("  GET    /api/v1/users/{{uid}}           - Profile with visible posts");
    println!("  PUT    /api/v1/users/{{uid}}/bio       - Update bio (owner)");
    println!("  POST   /api/v1/users/{{uid}}/follow    - Toggle follow");
    println!("  GET    /api/v1/users/search?q=       - Username prefix search");
    println!("  POST   /api/v1/posts                 - Publish a verse");
    println!("  GET    /api/v1/posts/{{id}}            - View verse (guarded, reconciled)");
    println!("  PUT    /api/v1/posts/{{id}}            - Edit verse (author)");
    println!("  DELETE /api/v1/posts/{{id}}            - Delete verse + likes + comments");
    println!("  POST   /api/v1/posts/{{id}}/like       - Toggle like");
    println!("  POST   /api/v1/posts/{{id}}/comments   - Add comment");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
