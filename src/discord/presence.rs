//! Discord Rich Presence backend using discord-sdk

use std::num::NonZeroU32;
use std::time::{Duration, SystemTime};

use discord_sdk::{
    activity::{ActivityBuilder, Assets, PartyPrivacy},
    wheel::{UserState, Wheel},
    Discord, Subscriptions,
};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::error::PresenceError;
use crate::presence::{EventSink, PresenceBackend, PresenceRecord};

/// Discord Application ID owning the asset catalog (`li_*`, `class_*`, `away`)
pub const DISCORD_APP_ID: i64 = 478143453536976896;

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

enum Command {
    Set(PresenceRecord),
    Clear,
}

/// Dropping this closes the update channel and cancels the task
struct Connection {
    update_tx: mpsc::UnboundedSender<Command>,
    _cancel: oneshot::Sender<()>,
}

/// Talks to the local Discord client from a background task.
///
/// Calls only queue work for that task, so none of them wait on Discord.
pub struct DiscordBackend {
    app_id: i64,
    runtime: Handle,
    connection: Option<Connection>,
}

impl DiscordBackend {
    pub fn new(runtime: Handle) -> Self {
        Self::with_app_id(DISCORD_APP_ID, runtime)
    }

    pub fn with_app_id(app_id: i64, runtime: Handle) -> Self {
        Self {
            app_id,
            runtime,
            connection: None,
        }
    }

    fn send(&self, command: Command) -> Result<(), PresenceError> {
        self.connection
            .as_ref()
            .ok_or(PresenceError::ChannelClosed)?
            .update_tx
            .send(command)
            .map_err(|_| PresenceError::ChannelClosed)
    }

    /// Background task that maintains the Discord connection and processes presence updates
    async fn run_discord_task(
        app_id: i64,
        mut update_rx: mpsc::UnboundedReceiver<Command>,
        mut cancel: oneshot::Receiver<()>,
        events: EventSink,
    ) {
        let error_events = events.clone();
        let (wheel, handler) = Wheel::new(Box::new(move |err| {
            tracing::warn!("Discord error: {:?}", err);
            error_events.error(format!("{:?}", err));
        }));

        let mut user_spoke = wheel.user();

        let discord = match Discord::new(app_id, Subscriptions::ACTIVITY, Box::new(handler)) {
            Ok(d) => d,
            Err(e) => {
                events.disconnected(format!("Discord not available: {:?}", e));
                return;
            }
        };

        tracing::info!("Discord connecting...");

        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_spoke.0.changed().await.is_err() {
                Err("Discord connection closed".to_string())
            } else {
                match &*user_spoke.0.borrow() {
                    UserState::Connected(user) => Ok(user.clone()),
                    UserState::Disconnected(err) => Err(format!("Discord disconnected: {:?}", err)),
                }
            }
        });

        let user = tokio::select! {
            _ = &mut cancel => {
                discord.disconnect().await;
                return;
            }
            result = handshake => match result {
                Ok(Ok(user)) => user,
                Ok(Err(e)) => {
                    events.disconnected(e);
                    discord.disconnect().await;
                    return;
                }
                Err(_) => {
                    events.disconnected("Discord handshake timed out");
                    discord.disconnect().await;
                    return;
                }
            },
        };

        tracing::info!(
            "Discord Rich Presence connected as {}#{}",
            user.username,
            user.discriminator.unwrap_or(0)
        );
        events.ready();

        loop {
            tokio::select! {
                biased;

                _ = &mut cancel => {
                    // The session may queue a final clear right before disconnecting
                    if let Some(command) = latest_command(&mut update_rx) {
                        if let Err(e) = apply_command(&discord, command).await {
                            tracing::debug!("Failed to flush Discord activity: {:?}", e);
                        }
                    }
                    break;
                }

                changed = user_spoke.0.changed() => {
                    if changed.is_err() {
                        events.disconnected("Discord connection closed");
                        break;
                    }
                    if let UserState::Disconnected(err) = &*user_spoke.0.borrow() {
                        events.disconnected(format!("Discord disconnected: {:?}", err));
                        break;
                    }
                }

                command = update_rx.recv() => {
                    let Some(command) = command else {
                        break;
                    };

                    match apply_command(&discord, command).await {
                        Ok(()) => events.message("activity updated"),
                        Err(e) => {
                            tracing::debug!("Failed to update Discord activity: {:?}", e);
                            events.error(format!("{:?}", e));
                        }
                    }
                }
            }
        }

        discord.disconnect().await;
        tracing::info!("Discord Rich Presence disconnected");
    }
}

impl PresenceBackend for DiscordBackend {
    fn name(&self) -> &'static str {
        "Discord"
    }

    fn connect(&mut self, events: EventSink) -> Result<(), PresenceError> {
        // Replacing the connection cancels any task still running
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        self.runtime.spawn(Self::run_discord_task(
            self.app_id,
            update_rx,
            cancel_rx,
            events,
        ));

        self.connection = Some(Connection {
            update_tx,
            _cancel: cancel_tx,
        });
        Ok(())
    }

    fn set_activity(&mut self, record: &PresenceRecord) -> Result<(), PresenceError> {
        self.send(Command::Set(record.clone()))
    }

    fn clear_activity(&mut self) -> Result<(), PresenceError> {
        self.send(Command::Clear)
    }

    fn disconnect(&mut self) {
        self.connection = None;
    }
}

async fn apply_command(discord: &Discord, command: Command) -> Result<(), discord_sdk::Error> {
    match command {
        Command::Set(record) => discord.update_activity(activity(&record)).await.map(|_| ()),
        Command::Clear => discord.clear_activity().await.map(|_| ()),
    }
}

/// Each command replaces the whole activity, so only the newest queued one matters
fn latest_command(update_rx: &mut mpsc::UnboundedReceiver<Command>) -> Option<Command> {
    let mut latest = None;
    while let Ok(command) = update_rx.try_recv() {
        latest = Some(command);
    }
    latest
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}

fn activity(record: &PresenceRecord) -> ActivityBuilder {
    let mut activity = ActivityBuilder::new();

    if let Some(details) = non_empty(record.details()) {
        activity = activity.details(details);
    }
    if let Some(state) = non_empty(record.state()) {
        activity = activity.state(state);
    }

    let mut assets = Assets::default();
    let large = record.large_image();
    if !large.key().is_empty() {
        assets = assets.large(large.key(), non_empty(large.text()));
    }
    let small = record.small_image();
    if !small.key().is_empty() {
        assets = assets.small(small.key(), non_empty(small.text()));
    }
    activity = activity.assets(assets);

    if let Some(timestamps) = record.timestamps() {
        activity = activity.start_timestamp(SystemTime::from(timestamps.start));
    }

    if let Some(party) = record.party() {
        activity = activity.party(
            party.id(),
            NonZeroU32::new(party.size()),
            NonZeroU32::new(party.max()),
            PartyPrivacy::Private,
        );
    }

    activity
}
