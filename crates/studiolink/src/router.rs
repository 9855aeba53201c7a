//! Presence router: one Tokio task that owns all room state.
//!
//! Every room mutation in the server flows through this single actor via
//! an mpsc channel. No shared mutable state, no locks around the
//! registry: commands are applied strictly in arrival order, which is
//! what makes roster broadcasts consistent. A client that sends
//! join_session and then send_message will never have its message
//! processed against a roster that doesn't contain it yet.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use studiolink_protocol::{
    ChatMessage, ClientEvent, Member, MessageKind, ServerEvent, SessionId,
    UserInfo,
};
use studiolink_registry::RoomRegistry;
use studiolink_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::StudiolinkError;

/// How many commands may queue before senders are backpressured.
const COMMAND_BUFFER: usize = 256;

/// Channel sender for delivering outbound events to one connection.
///
/// The connection handler owns the receiving end and pumps events onto
/// the socket. Unbounded: the router must never block on a slow client,
/// and a client slow enough to matter gets disconnected by its own
/// transport first.
pub type ConnectionSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to the presence router through its channel.
pub(crate) enum RouterCommand {
    /// Attach an authenticated connection to the router.
    Register {
        conn_id: ConnectionId,
        user: UserInfo,
        sender: ConnectionSender,
    },

    /// A decoded event from a registered connection.
    Event {
        conn_id: ConnectionId,
        event: ClientEvent,
    },

    /// The connection is gone; clean the user out of every room.
    Disconnect { conn_id: ConnectionId },

    /// Request a roster snapshot (monitoring / tests).
    Roster {
        session_id: SessionId,
        reply: oneshot::Sender<Vec<Member>>,
    },
}

/// Handle to the running presence router. Cheap to clone — it's just an
/// `mpsc::Sender` wrapper; every connection handler holds one.
#[derive(Clone)]
pub struct RouterHandle {
    sender: mpsc::Sender<RouterCommand>,
}

impl RouterHandle {
    /// Spawns the router task and returns a handle to it.
    ///
    /// The task runs until every handle is dropped.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let router = PresenceRouter {
            registry: RoomRegistry::new(),
            connections: HashMap::new(),
            receiver: rx,
        };
        tokio::spawn(router.run());
        Self { sender: tx }
    }

    /// Registers an authenticated connection with the router.
    ///
    /// # Errors
    /// Returns [`StudiolinkError::RouterClosed`] if the router task has
    /// stopped.
    pub async fn register(
        &self,
        conn_id: ConnectionId,
        user: UserInfo,
        sender: ConnectionSender,
    ) -> Result<(), StudiolinkError> {
        self.sender
            .send(RouterCommand::Register {
                conn_id,
                user,
                sender,
            })
            .await
            .map_err(|_| StudiolinkError::RouterClosed)
    }

    /// Forwards a client event to the router.
    ///
    /// # Errors
    /// Returns [`StudiolinkError::RouterClosed`] if the router task has
    /// stopped.
    pub async fn event(
        &self,
        conn_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), StudiolinkError> {
        self.sender
            .send(RouterCommand::Event { conn_id, event })
            .await
            .map_err(|_| StudiolinkError::RouterClosed)
    }

    /// Tells the router a connection is gone.
    ///
    /// # Errors
    /// Returns [`StudiolinkError::RouterClosed`] if the router task has
    /// stopped.
    pub async fn disconnect(
        &self,
        conn_id: ConnectionId,
    ) -> Result<(), StudiolinkError> {
        self.sender
            .send(RouterCommand::Disconnect { conn_id })
            .await
            .map_err(|_| StudiolinkError::RouterClosed)
    }

    /// Requests a snapshot of a room's roster.
    ///
    /// # Errors
    /// Returns [`StudiolinkError::RouterClosed`] if the router task has
    /// stopped.
    pub async fn roster(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<Member>, StudiolinkError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RouterCommand::Roster {
                session_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StudiolinkError::RouterClosed)?;
        reply_rx.await.map_err(|_| StudiolinkError::RouterClosed)
    }
}

// ---------------------------------------------------------------------------
// The actor
// ---------------------------------------------------------------------------

/// A registered connection's identity and outbound channel.
struct RegisteredConnection {
    user: UserInfo,
    sender: ConnectionSender,
}

/// The router's internal state. Runs inside a single Tokio task; only
/// that task ever touches the registry.
struct PresenceRouter {
    registry: RoomRegistry,
    connections: HashMap<ConnectionId, RegisteredConnection>,
    receiver: mpsc::Receiver<RouterCommand>,
}

impl PresenceRouter {
    /// Runs the actor loop, processing commands until all handles drop.
    async fn run(mut self) {
        tracing::info!("presence router started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RouterCommand::Register {
                    conn_id,
                    user,
                    sender,
                } => {
                    tracing::debug!(
                        %conn_id,
                        user_id = %user.user_id,
                        "connection registered"
                    );
                    self.connections
                        .insert(conn_id, RegisteredConnection { user, sender });
                }
                RouterCommand::Event { conn_id, event } => {
                    self.handle_event(conn_id, event);
                }
                RouterCommand::Disconnect { conn_id } => {
                    self.handle_disconnect(conn_id);
                }
                RouterCommand::Roster { session_id, reply } => {
                    let _ = reply.send(self.registry.roster(&session_id));
                }
            }
        }

        tracing::info!("presence router stopped");
    }

    fn handle_event(&mut self, conn_id: ConnectionId, event: ClientEvent) {
        // Only registered connections reach this point; the handler
        // registers before pumping events. An unknown id means the
        // connection already disconnected — drop the stragglers.
        let Some(entry) = self.connections.get(&conn_id) else {
            tracing::debug!(%conn_id, "event from unregistered connection");
            return;
        };
        let user = entry.user.clone();

        match event {
            ClientEvent::JoinSession { session_id } => {
                self.handle_join(conn_id, user, session_id);
            }
            ClientEvent::LeaveSession { session_id } => {
                self.handle_leave(user, session_id);
            }
            ClientEvent::SendMessage {
                session_id,
                message,
            } => {
                self.handle_send_message(user, session_id, message);
            }
            ClientEvent::FileUpdated {
                session_id,
                file_name,
                file_url,
            } => {
                self.handle_file_updated(
                    conn_id, user, session_id, file_name, file_url,
                );
            }
        }
    }

    fn handle_join(
        &mut self,
        conn_id: ConnectionId,
        user: UserInfo,
        session_id: SessionId,
    ) {
        let member = Member {
            user_id: user.user_id.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            connection_id: conn_id,
        };
        let roster = self.registry.join(session_id.clone(), member);

        // Everyone (joiner included) gets the fresh roster; everyone
        // else additionally gets the join notification.
        self.send_to_roster(
            &roster,
            &ServerEvent::SessionUsersUpdated {
                session_id: session_id.clone(),
                users: roster.clone(),
            },
            None,
        );
        self.send_to_roster(
            &roster,
            &ServerEvent::UserJoined { session_id, user },
            Some(conn_id),
        );
    }

    fn handle_leave(&mut self, user: UserInfo, session_id: SessionId) {
        let Some(roster) =
            self.registry.leave(&session_id, &user.user_id)
        else {
            // No such room. Nothing to tell anyone.
            return;
        };

        self.send_to_roster(
            &roster,
            &ServerEvent::SessionUsersUpdated {
                session_id: session_id.clone(),
                users: roster.clone(),
            },
            None,
        );
        self.send_to_roster(
            &roster,
            &ServerEvent::UserLeft { session_id, user },
            None,
        );
    }

    fn handle_send_message(
        &mut self,
        user: UserInfo,
        session_id: SessionId,
        message: String,
    ) {
        let now = now_millis();
        let chat = ChatMessage {
            id: now.to_string(),
            session_id: session_id.clone(),
            user_id: user.user_id,
            user_name: user.display_name,
            user_avatar: user.photo_url,
            message,
            timestamp: now,
            kind: MessageKind::Text,
        };

        // Delivered to the whole room including the sender; the sender's
        // UI syncs through the same event rather than a local echo. A
        // sender who never joined the room reaches nobody, themselves
        // included.
        let roster = self.registry.roster(&session_id);
        self.send_to_roster(&roster, &ServerEvent::NewMessage(chat), None);
    }

    fn handle_file_updated(
        &mut self,
        conn_id: ConnectionId,
        user: UserInfo,
        session_id: SessionId,
        file_name: String,
        file_url: String,
    ) {
        let roster = self.registry.roster(&session_id);
        self.send_to_roster(
            &roster,
            &ServerEvent::FileUpdated {
                session_id,
                file_name,
                file_url,
                updated_by: user,
            },
            Some(conn_id),
        );
    }

    fn handle_disconnect(&mut self, conn_id: ConnectionId) {
        let Some(entry) = self.connections.remove(&conn_id) else {
            return;
        };
        let user = entry.user;
        tracing::debug!(
            %conn_id,
            user_id = %user.user_id,
            "connection disconnected"
        );

        for (session_id, roster) in
            self.registry.disconnect(&user.user_id)
        {
            self.send_to_roster(
                &roster,
                &ServerEvent::SessionUsersUpdated {
                    session_id: session_id.clone(),
                    users: roster.clone(),
                },
                None,
            );
            self.send_to_roster(
                &roster,
                &ServerEvent::UserLeft {
                    session_id,
                    user: user.clone(),
                },
                None,
            );
        }
    }

    /// Sends an event to every roster member's connection, optionally
    /// excluding one connection. Silently drops members whose outbound
    /// channel is gone — their disconnect is already in the queue.
    fn send_to_roster(
        &self,
        roster: &[Member],
        event: &ServerEvent,
        exclude: Option<ConnectionId>,
    ) {
        for member in roster {
            if Some(member.connection_id) == exclude {
                continue;
            }
            if let Some(entry) =
                self.connections.get(&member.connection_id)
            {
                let _ = entry.sender.send(event.clone());
            }
        }
    }
}

/// Unix time in milliseconds. Also the source of chat message ids.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
