//! Standalone Studiolink coordinator.
//!
//! Configuration comes from the environment:
//! - `STUDIOLINK_ADDR`       bind address, default `0.0.0.0:8080`
//! - `STUDIOLINK_AUTH_MODE`  `trusted` for development, anything else
//!   (including unset) runs the verified gate
//! - `RUST_LOG`              tracing filter, default `info`

use studiolink::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("STUDIOLINK_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let gate_config = GateConfig::from_env();

    if gate_config.mode == AuthMode::Verified {
        // No identity service is wired into this binary; the verified
        // gate will refuse every connection until one is.
        tracing::warn!(
            "verified mode with no identity provider: all tokens will \
             be rejected (set STUDIOLINK_AUTH_MODE=trusted for local use)"
        );
    }

    let server = StudioServerBuilder::new()
        .bind(&addr)
        .gate_config(gate_config)
        .build(RejectAllProvider)
        .await?;

    tracing::info!(
        addr = %server.local_addr()?,
        mode = gate_config.mode.as_str(),
        "studio coordinator listening"
    );

    server.run().await?;
    Ok(())
}
