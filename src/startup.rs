//! Application Startup
//!
//! Wires the relay pipeline and runs it with an ordered shutdown:
//! the listener stops first, then the dispatch pool drains, then the
//! admin server exits.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::services::{DispatchPool, Listener, RelayController, RelayService};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::fellow::HttpFellowGateway;
use crate::infrastructure::repositories::PgGroupRepository;
use crate::infrastructure::telegram::TelegramTransport;
use crate::presentation::http::{handlers, routes};

/// Application state shared across admin handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub relay: Arc<dyn RelayService>,
    pub dispatch: Arc<DispatchPool>,
}

/// Application instance
pub struct Application {
    listener: Listener<TelegramTransport>,
    dispatch: Arc<DispatchPool>,
    admin_listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        handlers::health::init_server_start();

        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        let transport = Arc::new(TelegramTransport::new(&settings.telegram)?);
        let bot = transport.get_me().await?;
        tracing::info!(bot = %bot, "Bot connected");

        let gateway = Arc::new(HttpFellowGateway::new(&settings.fellow)?);
        let group_repo = Arc::new(PgGroupRepository::new(db.clone()));

        let controller = Arc::new(RelayController::new(
            group_repo,
            gateway,
            settings.fellow.members.clone(),
        ));
        controller.warm_cache().await?;
        let relay: Arc<dyn RelayService> = controller;

        let dispatch = Arc::new(DispatchPool::new(&settings.dispatch, relay.clone()));
        let listener = Listener::new(
            transport,
            dispatch.clone(),
            settings.relay.source_group_id,
        );

        let state = AppState {
            db,
            relay,
            dispatch: dispatch.clone(),
        };
        let router = routes::create_router(state);

        let admin_listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Admin API listening on {}", admin_listener.local_addr()?);

        Ok(Self {
            listener,
            dispatch,
            admin_listener,
            router,
        })
    }

    /// Run until a shutdown signal arrives or the event stream ends
    pub async fn run_until_stopped(self) -> Result<()> {
        let Self {
            listener,
            dispatch,
            admin_listener,
            router,
        } = self;

        let cancel = CancellationToken::new();
        tokio::spawn(cancel_on_signal(cancel.clone()));

        let admin_stop = CancellationToken::new();
        let admin = {
            let stopped = admin_stop.clone().cancelled_owned();
            tokio::spawn(async move {
                axum::serve(admin_listener, router)
                    .with_graceful_shutdown(stopped)
                    .await
            })
        };

        let workers = {
            let dispatch = dispatch.clone();
            tokio::spawn(async move { dispatch.run().await })
        };

        let listened = listener.run(cancel).await;

        // The listener no longer submits, so nothing races the shutdown.
        dispatch.shutdown();
        workers.await?;

        admin_stop.cancel();
        admin.await??;

        listened?;
        tracing::info!("Relay stopped");
        Ok(())
    }

    /// Get the bound admin address
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.admin_listener.local_addr()
    }
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
    token.cancel();
}
