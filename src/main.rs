//! Horus demo server.
//!
//! ```text
//!   Request ──▶ HttpServer (request ID, trace, timeout)
//!                  │
//!                  ▼
//!              Horus::new ──▶ layers.bind(...)      (x-powered-by, access log)
//!                  │
//!                  ├──▶ router.vhost("admin\..+")   admin console
//!                  ├──▶ router.on("GET /")          welcome page
//!                  └──▶ router.group("api")
//!                           ├── on("GET users/(\d+)")
//!                           └── on("POST echo")
//!                  │
//!                  ▼
//!              run(app) ──▶ drain body ──▶ app (echo / 404) ──▶ Response
//! ```

use std::path::PathBuf;

use axum::{http::StatusCode, response::Response};
use clap::Parser;
use tokio::net::TcpListener;

use horus::config::load_config;
use horus::lifecycle::signals;
use horus::observability::{logging, metrics};
use horus::{Context, Horus, HorusConfig, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "horus")]
#[command(about = "Demo server for the horus request router", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

/// Set by any route that produced a reply.
#[derive(Clone, Copy)]
struct Handled;

/// Set by routes asking the app to echo the request body.
#[derive(Clone, Copy)]
struct Echo;

fn handled(ctx: &Context) -> bool {
    ctx.locals().get::<Handled>().is_some()
}

async fn demo(mut horus: Horus<'static>, shutdown: Shutdown) -> horus::Result<Response> {
    horus
        .layers()
        .bind(|ctx| {
            ctx.reply().header("x-powered-by", "horus")?;
            Ok(())
        })
        .bind(|ctx| {
            tracing::info!(
                method = %ctx.method(),
                host = %ctx.hostname(),
                path = %ctx.path(),
                request_id = ctx.request_id().unwrap_or("unknown"),
                "Request"
            );
            Ok(())
        });

    horus
        .router()
        .vhost("admin\\..+", |admin, _| {
            admin.on("GET /", |ctx, _| {
                ctx.locals_mut().insert(Handled);
                ctx.reply().write_str("admin console\n");
                Ok(())
            })?;
            Ok(())
        })?
        .on("GET /", |ctx, _| {
            // Every match fires, so skip if a vhost already answered.
            if !handled(ctx) {
                ctx.locals_mut().insert(Handled);
                ctx.reply().write_str("welcome to horus\n");
            }
            Ok(())
        })?
        .group("api", |api, _| {
            api.on("GET users/(\\d+)", |ctx, caps| {
                ctx.locals_mut().insert(Handled);
                ctx.reply()
                    .json(&serde_json::json!({ "id": caps.get(0).unwrap_or_default() }))?;
                Ok(())
            })?
            .on("POST echo", |ctx, _| {
                ctx.locals_mut().insert(Handled);
                ctx.locals_mut().insert(Echo);
                Ok(())
            })?;
            Ok(())
        })?;

    horus
        .run_until(
            |ctx| {
                if ctx.locals().get::<Echo>().is_some() {
                    let body = ctx.body().cloned().unwrap_or_default();
                    ctx.reply().write(&body);
                }
                if !handled(ctx) {
                    ctx.reply()
                        .status(StatusCode::NOT_FOUND)
                        .write_str("not found\n");
                }
                Ok(())
            },
            shutdown.signal(),
        )
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HorusConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;

    tracing::info!("horus v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        method_match = ?config.routing.method_match,
        body_limit_bytes = config.routing.body_limit_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let request_shutdown = shutdown.clone();
    let server = HttpServer::new(config, move |horus| demo(horus, request_shutdown.clone()));
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
