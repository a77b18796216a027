use crate::config::AppConfig;
use crate::error::Result;
use crate::server;

pub async fn run(port: Option<u16>) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }

    println!("🚀 Starting coincorr server on port {}", config.port);
    server::serve(config).await
}
