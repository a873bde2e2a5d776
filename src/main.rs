//! Console demo: drives a [`DispatchSystem`] with a recording transport.
//!
//! Each stdin line is one inbound event:
//!
//! ```text
//! rider <id> <text...>          rider message
//! loc <id> <lat> <lon>          rider location share
//! accept <order_id> <driver...> driver presses Accept
//! ```
//!
//! Outbound messages show up in the log.

use anyhow::{bail, Context, Result};
use resource_actor::tracing::setup_tracing;
use std::sync::Arc;
use taxi_dispatch::config::DispatchConfig;
use taxi_dispatch::lifecycle::DispatchSystem;
use taxi_dispatch::model::{ChatId, GeoPoint, OrderId, RiderId};
use taxi_dispatch::transport::{
    CallbackPayload, DriverCallback, NoopGeocoder, RecordingTransport, RiderProfile, RiderUpdate,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Private chat used for replies to console drivers.
const CONSOLE_DRIVER_CHAT: ChatId = ChatId(1);

#[derive(Debug, PartialEq)]
enum ConsoleEvent {
    Rider(RiderUpdate),
    Driver(DriverCallback),
}

fn parse_line(line: &str) -> Result<ConsoleEvent> {
    let mut words = line.split_whitespace();
    let kind = words.next().context("empty line")?;
    match kind {
        "rider" => {
            let id = parse_rider(words.next())?;
            let text = words.collect::<Vec<_>>().join(" ");
            Ok(ConsoleEvent::Rider(RiderUpdate::text(profile(id), text)))
        }
        "loc" => {
            let id = parse_rider(words.next())?;
            let latitude = words.next().context("missing latitude")?.parse()?;
            let longitude = words.next().context("missing longitude")?.parse()?;
            Ok(ConsoleEvent::Rider(RiderUpdate::location(
                profile(id),
                GeoPoint {
                    latitude,
                    longitude,
                },
            )))
        }
        "accept" => {
            let order_id = words.next().context("missing order id")?.parse()?;
            let driver_name = words.collect::<Vec<_>>().join(" ");
            Ok(ConsoleEvent::Driver(DriverCallback {
                driver_name,
                driver_chat: CONSOLE_DRIVER_CHAT,
                payload: CallbackPayload::Accept {
                    order_id: OrderId(order_id),
                },
                message_ref: None,
            }))
        }
        other => bail!("unknown event {other:?}, expected rider, loc or accept"),
    }
}

fn parse_rider(word: Option<&str>) -> Result<RiderId> {
    let id = word.context("missing rider id")?.parse()?;
    Ok(RiderId(id))
}

fn profile(rider_id: RiderId) -> RiderProfile {
    RiderProfile {
        rider_id,
        display_name: format!("Rider {}", rider_id.0),
        profile_link: None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => DispatchConfig::load_from_yaml(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => {
            info!("No config file given, using demo channels");
            DispatchConfig::new(ChatId(-100), ChatId(-200))
        }
    };

    let transport = Arc::new(RecordingTransport::new());
    let system = DispatchSystem::start(&config, transport, Arc::new(NoopGeocoder))?;
    info!("Type events, one per line. Ctrl-D or Ctrl-C to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Ok(ConsoleEvent::Rider(update)) => system.rider_inbox.send(update).await?,
            Ok(ConsoleEvent::Driver(callback)) => system.driver_inbox.send(callback).await?,
            Err(e) => warn!(error = %e, "Ignoring line"),
        }
    }

    let report = system.shutdown().await?;
    info!(?report, "Bye");
    Ok(())
}
