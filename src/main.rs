use std::sync::Arc;

use anyhow::Context;
use broker_portal::analytics::PortfolioSummary;
use broker_portal::store::FileStateStore;
use broker_portal::{HttpPropertyApi, PropertyListCoordinator, Settings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("Failed to load settings")?;
    info!("Broker portal client for {}", settings.api_base_url);

    let api = HttpPropertyApi::with_timeout(&settings.api_base_url, settings.request_timeout())?;
    let coordinator = PropertyListCoordinator::with_cache_policy(Arc::new(api), settings.cache);

    let store = FileStateStore::new(&settings.state_dir);
    if coordinator.restore_from(&store).await? {
        info!("Restored saved filters and favorites");
    }

    let broker = settings.broker();
    if broker.is_none() {
        warn!("No broker configured; set BROKER_PORTAL__BROKER_ID");
    }

    coordinator.fetch_with_smart_pagination(broker.as_ref()).await;

    let state = coordinator.snapshot();
    if let Some(error) = &state.error {
        warn!("{}", error);
    }

    // Legacy responses carry the whole portfolio, so filter it here
    let visible = match state.pagination {
        Some(_) => state.properties.clone(),
        None => state.filters.apply(&state.properties),
    };

    if let Some(pagination) = state.pagination {
        println!(
            "Page {} of {} ({} properties)",
            pagination.current_page, pagination.total_pages, pagination.total_count
        );
    }

    for (i, property) in visible.iter().enumerate() {
        let star = if state.favorites.contains(&property.id) { "*" } else { " " };
        println!(
            "{}{}. {} ({} INR) [{}]",
            star,
            i + 1,
            property.location.address,
            property.price,
            property.status.as_str()
        );
        println!("   {} {}, {} sq ft", property.rooms, property.property_type, property.area);
        println!("   ID: {}", property.id);
    }

    let summary = PortfolioSummary::from_properties(&visible);
    println!();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    coordinator.save_to(&store).await?;
    info!("Saved filters and favorites to {}", settings.state_dir.display());

    Ok(())
}
