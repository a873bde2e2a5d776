use crate::claim::ClaimResolver;
use crate::clients::{OrderClient, SessionClient};
use crate::config::DispatchConfig;
use crate::conversation::ConversationMachine;
use crate::error::DispatchError;
use crate::model::{Order, Session};
use crate::sync::{IntervalTicker, ScanReport, Synchronizer, Ticker};
use crate::transport::{ChatTransport, DriverCallback, Geocoder, RiderUpdate};
use crate::{order_actor, session_actor};
use resource_actor::{ResourceActor, SledStorage, StorageError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The running dispatcher: both stores, both listeners and the synchronizer.
///
/// # Wiring
///
/// - **Order actor** and **Session actor** are spawned first; everything else holds their clients.
/// - The **rider listener** runs a [`ConversationMachine`] over `rider_inbox`.
/// - The **driver listener** runs a [`ClaimResolver`] over `driver_inbox`.
/// - The **synchronizer** scans on every tick of its [`Ticker`].
///
/// A transport adapter pushes parsed updates into the two inbox senders.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use taxi_dispatch::config::DispatchConfig;
/// use taxi_dispatch::lifecycle::DispatchSystem;
/// use taxi_dispatch::model::ChatId;
/// use taxi_dispatch::transport::{NoopGeocoder, RecordingTransport};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DispatchConfig::new(ChatId(-100), ChatId(-200));
///     let transport = Arc::new(RecordingTransport::new());
///     let system = DispatchSystem::start(&config, transport, Arc::new(NoopGeocoder))?;
///     system.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct DispatchSystem {
    pub order_client: OrderClient,
    pub session_client: SessionClient,
    pub rider_inbox: mpsc::Sender<RiderUpdate>,
    pub driver_inbox: mpsc::Sender<DriverCallback>,
    shutdown: CancellationToken,
    listeners: Vec<JoinHandle<()>>,
    synchronizer: JoinHandle<ScanReport>,
    actors: Vec<JoinHandle<()>>,
}

impl DispatchSystem {
    /// Starts the system with a synchronizer ticking every `poll_interval_secs`.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn start(
        config: &DispatchConfig,
        transport: Arc<dyn ChatTransport>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Result<Self, DispatchError> {
        let ticker = IntervalTicker::new(config.poll_interval());
        Self::start_with_ticker(config, transport, geocoder, ticker)
    }

    pub fn start_with_ticker<K>(
        config: &DispatchConfig,
        transport: Arc<dyn ChatTransport>,
        geocoder: Arc<dyn Geocoder>,
        ticker: K,
    ) -> Result<Self, DispatchError>
    where
        K: Ticker + 'static,
    {
        let (order_actor, order_client, session_actor, session_client) = open_stores(config)?;

        // 1. Stores
        let actors = vec![
            tokio::spawn(order_actor.run(())),
            tokio::spawn(session_actor.run(())),
        ];

        // 2. Inbound listeners
        let (rider_inbox, rider_updates) = mpsc::channel(config.channel_buffer);
        let (driver_inbox, driver_callbacks) = mpsc::channel(config.channel_buffer);

        let conversation = ConversationMachine::new(
            order_client.clone(),
            session_client.clone(),
            geocoder,
            config.admin_channel,
            config.default_locale,
        );
        let claims = ClaimResolver::new(order_client.clone(), transport.clone(), config.default_locale);
        let listeners = vec![
            tokio::spawn(conversation.listen(transport.clone(), rider_updates)),
            tokio::spawn(claims.listen(driver_callbacks)),
        ];

        // 3. Synchronizer
        let shutdown = CancellationToken::new();
        let synchronizer = Synchronizer::new(
            order_client.clone(),
            transport,
            config.driver_channel,
            config.default_locale,
        );
        let synchronizer = tokio::spawn(synchronizer.run(ticker, shutdown.clone()));

        info!(
            driver_channel = %config.driver_channel,
            admin_channel = %config.admin_channel,
            persistent = config.storage_path.is_some(),
            "Dispatch system started"
        );
        Ok(Self {
            order_client,
            session_client,
            rider_inbox,
            driver_inbox,
            shutdown,
            listeners,
            synchronizer,
            actors,
        })
    }

    /// Stops the synchronizer, drains both inboxes, then stops the stores.
    ///
    /// Returns what the synchronizer delivered over the system's lifetime.
    pub async fn shutdown(self) -> Result<ScanReport, DispatchError> {
        info!("Shutting down dispatch system...");

        // Closing the inboxes ends each listener once its queue is drained.
        self.shutdown.cancel();
        drop(self.rider_inbox);
        drop(self.driver_inbox);
        for handle in self.listeners {
            handle.await.inspect_err(|e| error!("Listener task failed: {e:?}"))?;
        }
        let report = self
            .synchronizer
            .await
            .inspect_err(|e| error!("Synchronizer task failed: {e:?}"))?;

        // Every other client clone is gone now; dropping ours ends the actors.
        drop(self.order_client);
        drop(self.session_client);
        for handle in self.actors {
            handle.await.inspect_err(|e| error!("Actor task failed: {e:?}"))?;
        }

        info!(?report, "Dispatch system stopped");
        Ok(report)
    }
}

type Stores = (
    ResourceActor<Order>,
    OrderClient,
    ResourceActor<Session>,
    SessionClient,
);

/// Opens both stores on sled when `storage_path` is set, in memory otherwise.
fn open_stores(config: &DispatchConfig) -> Result<Stores, DispatchError> {
    let buffer = config.channel_buffer;
    match &config.storage_path {
        Some(path) => {
            let db = sled::open(path).map_err(StorageError::from)?;
            info!(path = %path.display(), "Using sled storage");
            let (order_actor, order_client) =
                order_actor::with_storage(buffer, SledStorage::open(&db, "orders")?)?;
            let (session_actor, session_client) =
                session_actor::with_storage(buffer, SledStorage::open(&db, "sessions")?)?;
            Ok((order_actor, order_client, session_actor, session_client))
        }
        None => {
            let (order_actor, order_client) = order_actor::new(buffer);
            let (session_actor, session_client) = session_actor::new(buffer);
            Ok((order_actor, order_client, session_actor, session_client))
        }
    }
}
