use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use berryray_site::config::SiteConfig;
use berryray_site::gateway::{DataGateway, MemoryGateway, SupabaseGateway};
use berryray_site::routes;
use berryray_site::state::AppState;

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "berryray_site=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = SiteConfig::load().expect("Failed to load configuration");

  let gateway: Arc<dyn DataGateway> = match &config.supabase {
    Some(settings) => {
      tracing::info!("Using Supabase backend at {}", settings.url);
      Arc::new(SupabaseGateway::from_settings(settings).expect("Failed to create Supabase client"))
    }
    None => {
      tracing::warn!("Supabase not configured; serving the demo catalog from memory");
      Arc::new(MemoryGateway::demo())
    }
  };

  let bind_addr = config.bind_addr();
  let port = config.server_port;
  let app = routes::router(AppState::new(config, gateway));

  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
