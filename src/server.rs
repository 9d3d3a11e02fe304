use crate::account::controller::AccountController;
use crate::auth::controller::AuthController;
use crate::constants::{BAD_REQUEST, NOT_FOUND};
use crate::error::CustomError;
use crate::event::controller::EventController;
use crate::req::Method::{DELETE, GET, POST, PUT};
use crate::req::Request;
use crate::utils::error_response;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot::Receiver;
use tracing::{debug, error, info};

pub struct Controllers {
    pub auth: AuthController,
    pub accounts: AccountController,
    pub events: EventController,
}

pub struct Server {
    controllers: Arc<Controllers>,
}

impl Server {
    pub fn new(controllers: Arc<Controllers>) -> Self {
        Self { controllers }
    }

    pub async fn start(&self, bind_addr: &str, mut shutdown_rx: Receiver<()>) -> Result<()> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind {bind_addr}"))?;
        info!("Server running on http://{}", bind_addr);

        loop {
            tokio::select! {
                conn = listener.accept() => {
                    let (mut stream, peer) = conn?;

                    let controllers = Arc::clone(&self.controllers);

                    tokio::spawn(async move {
                        let (reader, writer) = stream.split();
                        if let Err(e) = Self::handle_client(reader, writer, &controllers).await {
                            error!(%peer, "Connection error: {:#}", e);
                        }
                    });
                }
                // Shutdown signal check
                _ = &mut shutdown_rx => {
                    info!("Shutting down server...");
                    break;
                }
            }
        }
        Ok(())
    }

    pub async fn handle_client<Reader, Writer>(
        reader: Reader,
        mut writer: Writer,
        controllers: &Controllers,
    ) -> Result<()>
    where
        Reader: AsyncRead + Unpin,
        Writer: AsyncWrite + Unpin,
    {
        let (status_line, content) = match Request::new(reader).await {
            Ok(request) => {
                debug!(method = ?request.method, path = %request.path, "request");
                Self::route(&request, controllers).await
            }
            Err(e) => {
                debug!("Failed to read request: {:#}", e);
                match e.downcast_ref::<CustomError>() {
                    Some(err) => error_response(err),
                    None => error_response(&CustomError::Validation("malformed request".to_string())),
                }
            }
        };

        let response = format!(
            "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            content.len(),
            content
        );
        writer
            .write_all(response.as_bytes())
            .await
            .context("Failed to write")?;
        writer.flush().await.context("Failed to flush")
    }

    pub async fn route(request: &Request, controllers: &Controllers) -> (String, String) {
        let path = request.path.as_str();

        // Public
        match (&request.method, path) {
            (POST, "/login") => return controllers.auth.login(&request.body).await,
            (POST, "/register") => return controllers.auth.register(&request.body).await,
            (GET, "/validate") => return controllers.auth.validate(&request.headers),
            _ => {}
        }

        let protected = matches!(
            (&request.method, path),
            (GET | POST | PUT | DELETE, "/accounts")
                | (POST, "/accounts/update-balance")
                | (POST, "/salary")
                | (GET, "/analytics")
                | (GET, "/events")
                | (DELETE, "/user/wipe")
        );
        if !protected {
            return (
                NOT_FOUND.to_string(),
                r#"{"error":"404 Not Found"}"#.to_string(),
            );
        }

        let session = match controllers.auth.session(&request.headers) {
            Ok(session) => session,
            Err(unauthorized) => return unauthorized,
        };

        match (&request.method, path) {
            (GET, "/accounts") => controllers.accounts.list(&session).await,
            (POST, "/accounts") => controllers.accounts.create(&session, &request.body).await,
            (PUT, "/accounts") => controllers.accounts.edit_by_label(&session, &request.body).await,
            (DELETE, "/accounts") => controllers.accounts.delete(&session, &request.body).await,
            (POST, "/accounts/update-balance") => {
                controllers.accounts.update_balance(&session, &request.body).await
            }
            (POST, "/salary") => controllers.accounts.salary(&session, &request.body).await,
            (GET, "/analytics") => controllers.events.analytics(&session).await,
            (GET, "/events") => controllers.events.events(&session, &request.query).await,
            (DELETE, "/user/wipe") => controllers.accounts.wipe(&session).await,
            _ => (BAD_REQUEST.to_string(), r#"{"error":"unsupported route"}"#.to_string()),
        }
    }
}
