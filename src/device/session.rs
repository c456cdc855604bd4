use std::convert::Infallible;
use iced::subscription::{self, Subscription};
use futures::{StreamExt, SinkExt};
use futures::channel::mpsc::{channel, Receiver, Sender};
use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use log::{debug, info, warn};
use tokio::time::{sleep, timeout, Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::device::constants::{
    make_disto_service_uuid, make_disto_distance_uuid, CONNECTED_POLL_DELAY,
    DEVICE_NAME_PREFIX, IS_CONNECTED_DEADLINE, SCAN_DEADLINE, SCAN_POLL_DELAY,
};
use crate::device::frame::decode_distance;
use crate::device::types::{SessionCommand, SessionEvent, SessionState};
use crate::error::SessionError;

/**
 * The handles of one established connection. A fresh session is built for
 * every connect attempt; nothing is carried over from a previous one.
 */
struct DeviceSession {
    peripheral: Peripheral,
    distance_char: Characteristic,
}

impl DeviceSession {
    async fn teardown(self) {
        if let Err(err) = self.peripheral.unsubscribe(&self.distance_char).await {
            warn!("Failed to unsubscribe from characteristic: {:?}", err);
        }
        if let Err(err) = self.peripheral.disconnect().await {
            warn!("Failed to disconnect from peripheral: {:?}", err);
        }
    }
}

/** Why a connected session ended. */
enum Teardown {
    // the device closed the link, went out of range, or the link died
    Remote,
    // the application is shutting down
    Closed,
}

async fn start_scanning(manager: &Manager) -> Result<Vec<Adapter>, SessionError> {
    let adapters = manager.adapters().await?;
    if adapters.is_empty() {
        return Err(SessionError::NoAdapter);
    }

    let filter = ScanFilter {
        services: vec![make_disto_service_uuid()],
    };

    for adapter in &adapters {
        info!("Scanning using adapter {}...", adapter.adapter_info().await.unwrap_or("UNKNOWN".to_string()));
        adapter.start_scan(filter.clone()).await?;
    }

    Ok(adapters)
}

async fn stop_scanning(adapters: &[Adapter]) {
    for adapter in adapters {
        if let Err(err) = adapter.stop_scan().await {
            warn!("Failed to stop scanning: {:?}", err);
        }
    }
}

async fn find_device(adapters: &[Adapter]) -> Option<Peripheral> {
    for adapter in adapters {
        let peripherals = match adapter.peripherals().await {
            Ok(v) => v,
            Err(err) => {
                warn!("Failed to query BLE adapter for peripherals: {}", err);
                continue;
            },
        };

        for peripheral in peripherals {
            let properties = peripheral.properties().await;

            match properties {
                Err(err) => {
                    warn!("Could not query peripheral for properties: {:?}", err);
                },
                Ok(None) => {
                    warn!("Peripheral has no properties");
                },
                Ok(Some(properties)) => {
                    // Some environments ignore the scan filter, so match on
                    // the advertised name ourselves
                    let name = properties.local_name.unwrap_or_default();
                    if name.starts_with(DEVICE_NAME_PREFIX) {
                        info!(
                            "Using peripheral {} {:?} {} {:?}",
                            properties.address,
                            properties.address_type,
                            name,
                            properties.services,
                        );
                        return Some(peripheral);
                    }
                },
            }
        }
    }

    None
}

async fn wait_for_device(adapters: &[Adapter]) -> Result<Peripheral, SessionError> {
    let deadline = Instant::now() + Duration::from_millis(SCAN_DEADLINE);

    loop {
        if let Some(peripheral) = find_device(adapters).await {
            return Ok(peripheral);
        }

        if Instant::now() >= deadline {
            return Err(SessionError::DeviceNotFound);
        }

        sleep(Duration::from_millis(SCAN_POLL_DELAY)).await;
    }
}

async fn open_session(peripheral: Peripheral) -> Result<DeviceSession, SessionError> {
    let disto_service_uuid = make_disto_service_uuid();
    let disto_distance_uuid = make_disto_distance_uuid();

    info!("Connecting to peripheral...");
    peripheral.connect().await?;

    info!("Connected; Discovering services...");
    peripheral.discover_services().await?;

    let service = peripheral.services()
        .into_iter()
        .find(|service| service.uuid.eq(&disto_service_uuid))
        .ok_or(SessionError::MissingService)?;

    let distance_char = service.characteristics
        .iter()
        .find(|characteristic| characteristic.uuid.eq(&disto_distance_uuid))
        .cloned()
        .ok_or(SessionError::MissingCharacteristic)?;

    info!("Subscribing to characteristic {:?} {:?}", service.uuid, distance_char.uuid);
    peripheral.subscribe(&distance_char).await?;

    Ok(DeviceSession { peripheral, distance_char })
}

/**
 * One full connect attempt: scan, pick the first matching peripheral,
 * connect, resolve the fixed service/characteristic pair and subscribe.
 * A failure at any step fails the attempt as a whole.
 */
async fn establish(manager: &Manager) -> Result<DeviceSession, SessionError> {
    let adapters = start_scanning(manager).await?;
    let found = wait_for_device(&adapters).await;
    stop_scanning(&adapters).await;

    open_session(found?).await
}

async fn run_connected(
    cancel: &CancellationToken,
    commands: &mut Receiver<SessionCommand>,
    events: &mut Sender<SessionEvent>,
    session: &DeviceSession,
) -> Result<Teardown, SessionError> {
    let disto_distance_uuid = make_disto_distance_uuid();
    let mut notification_stream = session.peripheral.notifications().await?;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Shutting down, closing session");
                return Ok(Teardown::Closed);
            },
            Some(SessionCommand::Connect) = commands.next() => {
                debug!("Ignoring connect request: a session is already active");
            },
            _ = sleep(Duration::from_millis(CONNECTED_POLL_DELAY)) => {
                match timeout(Duration::from_millis(IS_CONNECTED_DEADLINE), session.peripheral.is_connected()).await {
                    Err(_) => {
                        // macOS
                        warn!("Checking for connection status took too long");
                        return Ok(Teardown::Remote);
                    },
                    Ok(Err(err)) => {
                        warn!("Error checking for connection state: {:?}", err);
                        return Ok(Teardown::Remote);
                    },
                    Ok(Ok(false)) => {
                        info!("Device closed the connection");
                        return Ok(Teardown::Remote);
                    },
                    Ok(Ok(true)) => {},
                }
            },
            data = notification_stream.next() => match data {
                None => {
                    info!("Notification stream ended");
                    return Ok(Teardown::Remote);
                },
                Some(data) => {
                    if data.uuid.eq(&disto_distance_uuid) {
                        match decode_distance(&data.value) {
                            Some(meters) => {
                                events.send(SessionEvent::Measurement(meters)).await
                                    .expect("Failed to send SessionEvent");
                            },
                            None => {
                                warn!("Received measurement frame with unexpected length: {}", data.value.len());
                            },
                        }
                    }
                },
            },
        }
    }
}

async fn run_session(cancel: CancellationToken, mut events: Sender<SessionEvent>) -> Infallible {
    let (command_sender, mut commands) = channel::<SessionCommand>(8);
    events.send(SessionEvent::Ready(command_sender)).await
        .expect("Failed to send SessionEvent");

    let manager = Manager::new().await
        .expect("Failed to initialize bluetooth manager");

    // note: subscription::channel expects the future to never resolve
    // (Infallible), so this loop never breaks.
    loop {
        // Requests that queued up while a previous attempt was still in
        // flight are stale double-clicks; drop them instead of replaying.
        while let Ok(Some(_)) = commands.try_next() {}

        match commands.next().await {
            Some(SessionCommand::Connect) => {},
            None => return futures::future::pending().await,
        }

        events.send(SessionEvent::StateChange(SessionState::Connecting)).await
            .expect("Failed to send SessionEvent");

        let session = match establish(&manager).await {
            Ok(session) => session,
            Err(err) => {
                warn!("Connect attempt failed: {:?}", err);
                events.send(SessionEvent::StateChange(SessionState::Disconnected)).await
                    .expect("Failed to send SessionEvent");
                events.send(SessionEvent::ConnectFailed(err.to_string())).await
                    .expect("Failed to send SessionEvent");
                continue;
            },
        };

        info!("Session established");
        events.send(SessionEvent::StateChange(SessionState::Connected)).await
            .expect("Failed to send SessionEvent");

        let teardown = run_connected(&cancel, &mut commands, &mut events, &session).await;

        match teardown {
            Ok(Teardown::Closed) => {
                session.teardown().await;
            },
            Ok(Teardown::Remote) => {
                info!("Session ended");
            },
            Err(err) => {
                warn!("Session failed: {:?}", err);
            },
        }

        events.send(SessionEvent::StateChange(SessionState::Disconnected)).await
            .expect("Failed to send SessionEvent");
    }
}

pub fn session_subscription(cancel: CancellationToken) -> Subscription<SessionEvent> {
    struct Session;

    subscription::channel(
        std::any::TypeId::of::<Session>(),
        64,
        move |subscription_sender| {
            let cancel2 = cancel.clone();

            async move {
                run_session(cancel2, subscription_sender).await
            }
        },
    )
}
