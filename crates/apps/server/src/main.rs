use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod static_data;

use app::{build_router, AppState};
use config::{ProcessEnv, TOKEN_VAR};

#[derive(Parser, Debug)]
#[command(author, version, about = "Map client server: public config relay and static data")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "GIS_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Directory served under /data (locations.json and boundary GeoJSON)
    #[arg(long, env = "GIS_DATA_ROOT", default_value = "public/data")]
    data_root: PathBuf,

    /// Directory holding the built web client; unknown paths fall back to its index.html
    #[arg(long, env = "GIS_WEB_ROOT", default_value = "web")]
    web_root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if tokio::fs::metadata(&args.data_root).await.is_err() {
        warn!("data root {:?} does not exist; /data requests will 404", args.data_root);
    }
    match config::public_config(&ProcessEnv) {
        Ok(cfg) if cfg.access_token().is_none() => {
            warn!("{TOKEN_VAR} is not set; the map view will not initialize");
        }
        Ok(_) => {}
        Err(err) => warn!("public config is unreadable: {err}"),
    }

    let state = AppState::from_process_env(args.data_root, args.web_root);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!("server listening on http://{}", args.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn args_have_local_defaults() {
        let args = Args::try_parse_from(["server"]).unwrap();
        assert_eq!(args.addr.port(), 3000);
        assert!(args.data_root.ends_with("data"));
    }

    #[test]
    fn args_accept_overrides() {
        let args =
            Args::try_parse_from(["server", "--addr", "0.0.0.0:8080", "--data-root", "/srv/data"]).unwrap();
        assert_eq!(args.addr.to_string(), "0.0.0.0:8080");
        assert_eq!(args.data_root.to_str(), Some("/srv/data"));
    }
}
