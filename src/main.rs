pub mod commands;
pub mod config;
pub mod entropy;
pub mod error;
pub mod render;
pub mod session;
pub mod spin;
pub mod wheel;

use commands::start;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    start().await
}
