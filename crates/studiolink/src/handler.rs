//! Per-connection handler: authentication, then event pumping.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Receive the auth payload (first frame, bounded wait)
//!   2. Run the identity gate → trusted UserInfo, or opaque rejection
//!   3. Register with the presence router
//!   4. Loop: decode client events → forward to the router
//!
//! A writer task runs alongside the loop, pumping router broadcasts from
//! the connection's outbound channel onto the socket.

use std::sync::Arc;
use std::time::Duration;

use studiolink_auth::IdentityProvider;
use studiolink_protocol::{
    AuthPayload, ClientEvent, Codec, ProtocolError, ServerEvent,
};
use studiolink_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::router::RouterHandle;
use crate::server::ServerState;
use crate::StudiolinkError;

/// How long a fresh connection gets to present its auth payload.
const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Drop guard that tells the router a connection is gone when the
/// handler exits. Cleanup happens even if the handler panics; `Drop` is
/// synchronous, so the async send runs in a fire-and-forget task.
struct DisconnectGuard {
    conn_id: studiolink_transport::ConnectionId,
    router: RouterHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let router = self.router.clone();
        tokio::spawn(async move {
            let _ = router.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<P, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<P, C>>,
) -> Result<(), StudiolinkError>
where
    P: IdentityProvider,
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: identity gate, exactly once, before anything else ---
    let payload = receive_auth_payload(&conn, &state).await?;

    let user = match state.gate.authenticate(&payload).await {
        Ok(user) => user,
        Err(e) => {
            // The client sees only the opaque message.
            send_event(
                &conn,
                &state.codec,
                &ServerEvent::Error {
                    message: e.to_string(),
                },
            )
            .await?;
            let _ = conn.close().await;
            return Err(e.into());
        }
    };

    tracing::info!(
        %conn_id,
        user_id = %user.user_id,
        "connection authenticated"
    );

    // --- Step 2: register with the router, start the writer ---
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    state.router.register(conn_id, user.clone(), tx).await?;
    let _guard = DisconnectGuard {
        conn_id,
        router: state.router.clone(),
    };

    let writer_conn = Arc::clone(&conn);
    let writer_codec = state.codec.clone();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match writer_codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
        // Channel closed: the router has dropped this connection.
        let _ = writer_conn.close().await;
    });

    // --- Step 3: event loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                // Malformed frames are dropped without feedback; one
                // bad frame must not kill the connection.
                tracing::debug!(
                    %conn_id, error = %e, "dropping undecodable frame"
                );
                continue;
            }
        };

        state.router.event(conn_id, event).await?;
    }

    // _guard drops here → router disconnect fires → writer drains out.
    Ok(())
}

/// Waits for the connection's first frame and decodes it as the auth
/// payload. Bounded wait: a connection that never authenticates must not
/// hold resources forever.
async fn receive_auth_payload<P, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<P, C>>,
) -> Result<AuthPayload, StudiolinkError>
where
    P: IdentityProvider,
    C: Codec + Clone,
{
    let data = match tokio::time::timeout(AUTH_TIMEOUT, conn.recv()).await
    {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before auth".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage(
                "auth payload timed out".into(),
            )
            .into());
        }
    };

    match state.codec.decode(&data) {
        Ok(payload) => Ok(payload),
        Err(e) => {
            // An unreadable first frame gets the same opaque rejection
            // as a failed verification.
            send_event(
                conn,
                &state.codec,
                &ServerEvent::Error {
                    message: "Authentication error".into(),
                },
            )
            .await?;
            let _ = conn.close().await;
            Err(e.into())
        }
    }
}

/// Encodes and sends a single event on the connection.
async fn send_event(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    event: &ServerEvent,
) -> Result<(), StudiolinkError> {
    let bytes = codec.encode(event)?;
    conn.send(&bytes).await.map_err(StudiolinkError::Transport)
}
