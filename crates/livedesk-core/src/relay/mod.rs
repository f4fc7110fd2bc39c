//! The relay: orchestrates the three message flows between the site, the
//! operator channel, and the automation peer.

pub mod channel;
pub mod command;
pub mod service;

pub use channel::{AutomationNotifier, OperatorChannel};
pub use command::{parse_reply_command, ParsedReply, REPLY_PREFIX};
pub use service::RelayService;
