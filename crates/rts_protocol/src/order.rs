//! The order record and its named constructors.
//!
//! An [`Order`] is one player or control action. It is built on the
//! issuing side, encoded by [`crate::codec`], sent to every peer and
//! decoded into a fresh record that the simulation's per-frame queue
//! takes ownership of.

use std::fmt;

use crate::actor::{ActorRef, PlayerId};
use crate::coords::CPos;
use crate::target::Target;

/// A single encodable player or control action.
///
/// Everything except the payload is fixed at construction. Whether the
/// order travels as an immediate or a full frame is decided by the codec
/// from [`Order::is_immediate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Order {
    name: String,
    issuer: Option<ActorRef>,
    target: Target,
    payload: Option<String>,
    aux_cell: CPos,
    aux_value: u32,
    queued: bool,
    immediate: bool,
}

impl Order {
    /// A simulation order with no target.
    #[must_use]
    pub fn new(name: impl Into<String>, issuer: Option<ActorRef>, queued: bool) -> Self {
        Self::targeted(name, issuer, Target::Invalid, queued)
    }

    /// A simulation order aimed at `target`.
    #[must_use]
    pub fn targeted(
        name: impl Into<String>,
        issuer: Option<ActorRef>,
        target: Target,
        queued: bool,
    ) -> Self {
        Self {
            name: name.into(),
            issuer,
            target,
            queued,
            ..Self::default()
        }
    }

    /// A control-channel order, not tied to any actor.
    #[must_use]
    pub fn immediate(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            immediate: true,
            ..Self::default()
        }
    }

    /// Attach a payload string.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Attach an auxiliary cell.
    #[must_use]
    pub fn with_aux_cell(mut self, cell: CPos) -> Self {
        self.aux_cell = cell;
        self
    }

    /// Attach an auxiliary value.
    #[must_use]
    pub fn with_aux_value(mut self, value: u32) -> Self {
        self.aux_value = value;
        self
    }

    /// Order name, e.g. `"Move"` or `"Chat"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Actor the order is issued to.
    #[must_use]
    pub const fn issuer(&self) -> Option<&ActorRef> {
        self.issuer.as_ref()
    }

    /// What the order acts upon.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Free-text payload.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Replace the payload before sending.
    pub fn set_payload(&mut self, payload: Option<String>) {
        self.payload = payload;
    }

    /// Auxiliary cell; [`CPos::ZERO`] when unused.
    #[must_use]
    pub const fn aux_cell(&self) -> CPos {
        self.aux_cell
    }

    /// Auxiliary value; zero when unused.
    #[must_use]
    pub const fn aux_value(&self) -> u32 {
        self.aux_value
    }

    /// Whether the order queues behind the issuer's current activity.
    #[must_use]
    pub const fn is_queued(&self) -> bool {
        self.queued
    }

    /// Whether this is a control-channel order.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        self.immediate
    }

    /// Owner of the issuing actor.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        self.issuer.map(|a| a.owner)
    }

    // Named constructors for the fixed control vocabulary.

    /// Chat message to all players.
    #[must_use]
    pub fn chat(text: impl Into<String>) -> Self {
        Self::immediate("Chat").with_payload(text)
    }

    /// Chat message to one team.
    #[must_use]
    pub fn team_chat(text: impl Into<String>, team: u32) -> Self {
        Self::immediate("TeamChat")
            .with_payload(text)
            .with_aux_value(team)
    }

    /// Reply to the server's connection handshake.
    #[must_use]
    pub fn handshake_response(text: impl Into<String>) -> Self {
        Self::immediate("HandshakeResponse").with_payload(text)
    }

    /// Keepalive reply echoing the ping time.
    #[must_use]
    pub fn pong(ping_time: impl Into<String>) -> Self {
        Self::immediate("Pong").with_payload(ping_time)
    }

    /// Pause or unpause the game.
    ///
    /// Travels as a full frame so every peer pauses on the same frame.
    #[must_use]
    pub fn pause_game(paused: bool) -> Self {
        Self::new("PauseGame", None, false).with_payload(if paused { "Pause" } else { "UnPause" })
    }

    /// Free-form console command.
    #[must_use]
    pub fn command(text: impl Into<String>) -> Self {
        Self::immediate("Command").with_payload(text)
    }

    /// Queue `count` of `item` at a production structure.
    #[must_use]
    pub fn start_production(subject: ActorRef, item: impl Into<String>, count: u32, queued: bool) -> Self {
        Self::new("StartProduction", Some(subject), queued)
            .with_payload(item)
            .with_aux_value(count)
    }

    /// Pause or resume production of `item`.
    #[must_use]
    pub fn pause_production(subject: ActorRef, item: impl Into<String>, pause: bool) -> Self {
        Self::new("PauseProduction", Some(subject), false)
            .with_payload(item)
            .with_aux_value(u32::from(pause))
    }

    /// Remove `count` of `item` from a production queue.
    #[must_use]
    pub fn cancel_production(subject: ActorRef, item: impl Into<String>, count: u32) -> Self {
        Self::new("CancelProduction", Some(subject), false)
            .with_payload(item)
            .with_aux_value(count)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.name)?;
        match &self.issuer {
            Some(issuer) => write!(f, " issuer={issuer}")?,
            None => f.write_str(" issuer=none")?,
        }
        write!(f, " target={}", self.target)?;
        if let Some(payload) = &self.payload {
            write!(f, " payload={payload:?}")?;
        }
        if self.aux_cell != CPos::ZERO {
            write!(f, " cell={}", self.aux_cell)?;
        }
        if self.aux_value != 0 {
            write!(f, " data={}", self.aux_value)?;
        }
        if self.queued {
            f.write_str(" queued")?;
        }
        if self.immediate {
            f.write_str(" immediate")?;
        }
        if let Some(player) = self.player() {
            write!(f, " ({player})")?;
        }
        Ok(())
    }
}
