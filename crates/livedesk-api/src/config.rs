//! Process configuration.
//!
//! Every setting is a flag with an environment fallback; the env names
//! match what existing deployments already export. The bot credential and
//! admin chat id are required -- clap aborts startup with a clear error
//! when both the flag and the env var are missing. The webhook URL and
//! secret are optional feature switches: no URL disables outbound
//! notification, no secret disables signature enforcement.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "livedesk", about = "Live-chat relay between a website and a Telegram operator")]
pub struct Config {
    /// Telegram bot credential.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Chat id the operator notifications go to.
    #[arg(long, env = "ADMIN_CHAT_ID")]
    pub admin_chat_id: String,

    /// Automation peer URL; omit to disable outbound notifications.
    #[arg(long, env = "MAKE_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Shared secret for the automation channel; omit to run it
    /// unauthenticated.
    #[arg(long, env = "MAKE_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// HTTP listen port.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Path of the persisted counter state file.
    #[arg(long, default_value = "counter-state.json")]
    pub counter_state: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}
