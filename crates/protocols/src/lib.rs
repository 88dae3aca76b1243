//! Reference protocols built on the meshsim node runtime.
//!
//! Each protocol is a [`Behavior`](meshsim_core::Behavior) that only uses
//! the public node primitives; none of them touch the engine directly.
//! Observable protocol state (counters, delivered-message sets, detected
//! crashes) is shared through `Arc` handles so a test can keep a handle,
//! move the behavior into a node, and assert after the run.

mod broadcast;
mod detector;
mod echo;
mod election;
mod faulty;
mod link;
mod ping;

pub use broadcast::{
    BebRelay, BroadcastRequest, Greeting, HelloSender, BEB_BROADCAST, HELLO, HELLO_DELAY,
};
pub use detector::{
    CrashNotice, FailureDetector, CRASH, HEARTBEAT_REPLY, HEARTBEAT_REQUEST, PFD_POLL,
};
pub use echo::{EchoClient, EchoServer, ECHO, ECHO_TICK};
pub use election::{LeaderNotice, MonarchicalElection, LEADER};
pub use faulty::{FaultyProcess, LIFETIME};
pub use link::{Delivery, Forward, PlRelay, PL_DELIVER, PL_SEND};
pub use ping::{PingClient, PingServer, PING, PING_INTERVAL, PONG};
