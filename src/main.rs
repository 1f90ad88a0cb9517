use anyhow::Result;
use dotenv::dotenv;
use log::info;

use wheelbot::commands::start;
use wheelbot::config::WheelConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = WheelConfig::load().await?;
    info!(
        "spins last {}ms, ads hold for {}ms, frames every {}ms",
        config.spin_duration_ms, config.ad_delay_ms, config.frame_interval_ms
    );
    start(config).await
}
