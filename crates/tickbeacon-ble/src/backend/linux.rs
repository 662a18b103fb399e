//! Linux peripheral backend using bluer (BlueZ)

use futures::{FutureExt, StreamExt};
use tracing::{debug, info, warn};

use tickbeacon_core::{
    PeripheralError, RadioControl, RadioEvent, RadioEventSender, RadioState, Result,
    ServiceIdentity, WriteRequest,
};

use bluer::adv::Advertisement;
use bluer::gatt::local::{
    Application, ApplicationHandle, Characteristic, CharacteristicWrite, CharacteristicWriteMethod,
    ReqError, Service,
};

// ----------------------------------------------------------------------------
// BlueZ Radio
// ----------------------------------------------------------------------------

/// BlueZ-backed radio.
///
/// Publish/advertise confirmations are reported through the event channel,
/// matching the externally-driven shape of the other radio stacks. Dropping
/// the advertisement and application handles stops advertising and
/// unregisters the GATT service.
pub struct BluezRadio {
    events: RadioEventSender,
    session: Option<bluer::Session>,
    adapter: Option<bluer::Adapter>,
    app_handle: Option<ApplicationHandle>,
    adv_handle: Option<bluer::adv::AdvertisementHandle>,
}

impl BluezRadio {
    pub fn new(events: RadioEventSender) -> Self {
        Self {
            events,
            session: None,
            adapter: None,
            app_handle: None,
            adv_handle: None,
        }
    }

    /// Connect to BlueZ, report the initial power state, and monitor power
    /// transitions.
    pub async fn start(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let session = bluer::Session::new()
            .await
            .map_err(|e| PeripheralError::AdapterUnavailable(format!("BlueZ session: {}", e)))?;
        let adapter = session
            .default_adapter()
            .await
            .map_err(|e| PeripheralError::AdapterUnavailable(format!("BLE adapter: {}", e)))?;

        if !adapter.is_powered().await.unwrap_or(false) {
            adapter.set_powered(true).await.map_err(|e| {
                PeripheralError::AdapterUnavailable(format!("failed to power on adapter: {}", e))
            })?;
        }
        info!("Linux BLE adapter {} initialized", adapter.name());

        let powered = adapter.is_powered().await.unwrap_or(false);
        let initial = if powered {
            RadioState::PoweredOn
        } else {
            RadioState::PoweredOff
        };
        let _ = self.events.send(RadioEvent::StateChanged(initial));

        let mut changes = adapter
            .events()
            .await
            .map_err(|e| PeripheralError::AdapterUnavailable(format!("adapter events: {}", e)))?;
        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(event) = changes.next().await {
                if let bluer::AdapterEvent::PropertyChanged(bluer::AdapterProperty::Powered(
                    powered,
                )) = event
                {
                    let state = if powered {
                        RadioState::PoweredOn
                    } else {
                        RadioState::PoweredOff
                    };
                    if events.send(RadioEvent::StateChanged(state)).is_err() {
                        break;
                    }
                }
            }
        });

        self.session = Some(session);
        self.adapter = Some(adapter);
        Ok(())
    }

    fn adapter(&self) -> Result<&bluer::Adapter> {
        self.adapter
            .as_ref()
            .ok_or_else(|| PeripheralError::AdapterUnavailable("radio not started".to_string()))
    }
}

#[async_trait::async_trait]
impl RadioControl for BluezRadio {
    async fn reset_services(&mut self) -> Result<()> {
        if let Some(handle) = self.adv_handle.take() {
            drop(handle); // Dropping the handle stops advertising
            info!("stopped prior advertising");
        }
        if let Some(handle) = self.app_handle.take() {
            drop(handle); // Dropping the handle unregisters the GATT application
            info!("removed previously published services");
        }
        Ok(())
    }

    async fn publish_service(&mut self, identity: &ServiceIdentity) -> Result<()> {
        let adapter = self.adapter()?.clone();
        let events = self.events.clone();

        // Write-only: no read, no notify. Each ATT write is forwarded as a
        // one-element batch and completed once the core acknowledges it.
        let app = Application {
            services: vec![Service {
                uuid: identity.service,
                primary: true,
                characteristics: vec![Characteristic {
                    uuid: identity.characteristic,
                    write: Some(CharacteristicWrite {
                        write: true,
                        method: CharacteristicWriteMethod::Fun(Box::new(move |value, req| {
                            let events = events.clone();
                            async move {
                                debug!("write request {:?} with {} bytes", req, value.len());
                                let (request, outcome) = WriteRequest::new(value);
                                if events
                                    .send(RadioEvent::WriteRequestsReceived {
                                        requests: vec![request],
                                    })
                                    .is_err()
                                {
                                    return Err(ReqError::Failed);
                                }
                                match outcome.await {
                                    Ok(_) => Ok(()),
                                    Err(_) => Err(ReqError::Failed),
                                }
                            }
                            .boxed()
                        })),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        match adapter.serve_gatt_application(app).await {
            Ok(handle) => {
                self.app_handle = Some(handle);
                let _ = self.events.send(RadioEvent::ServiceAdded { error: None });
            }
            Err(e) => {
                warn!("GATT service registration failed: {}", e);
                let _ = self.events.send(RadioEvent::ServiceAdded {
                    error: Some(e.to_string()),
                });
            }
        }
        Ok(())
    }

    async fn start_advertising(&mut self, identity: &ServiceIdentity) -> Result<()> {
        let adapter = self.adapter()?.clone();

        // Payload carries only the service UUID, no local name.
        let advertisement = Advertisement {
            advertisement_type: bluer::adv::Type::Peripheral,
            service_uuids: vec![identity.service].into_iter().collect(),
            discoverable: Some(true),
            ..Default::default()
        };

        match adapter.advertise(advertisement).await {
            Ok(handle) => {
                self.adv_handle = Some(handle);
                let _ = self
                    .events
                    .send(RadioEvent::AdvertisingStarted { error: None });
            }
            Err(e) => {
                warn!("failed to start advertising: {}", e);
                let _ = self.events.send(RadioEvent::AdvertisingStarted {
                    error: Some(e.to_string()),
                });
            }
        }
        Ok(())
    }
}
