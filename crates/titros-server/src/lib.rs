//! `titros-server` – The WebSocket Gateway
//!
//! Boots a lightweight TCP + WebSocket server (default port `3000`) that:
//!
//! 1. **Admits** every WebSocket upgrade as a new session: mints a
//!    [`SessionId`][titros_types::SessionId], hands its outbound channel to
//!    the coordinator, and joins it to the access queue.
//!
//! 2. **Streams** coordinator output to the client: `queue_status` after
//!    every membership change, `sensor_data` once per telemetry tick.
//!
//! 3. **Forwards** inbound `command` messages to the coordinator for
//!    authorization; malformed or unknown messages are logged and ignored.
//!
//! 4. **Releases** the session on any close or transport error — the one
//!    code path that gives up a head position.
//!
//! Plain HTTP requests to the same port receive a one-line status response;
//! the dashboard itself is an external client and is not served from here.

pub mod server;

pub use server::{DEFAULT_PORT, GatewayServer};
