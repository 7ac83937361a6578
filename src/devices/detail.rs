use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::Abortable;
use tokio::sync::{broadcast, RwLock};

use crate::alerts::{Alert, AlertHub};
use crate::api::{ApiClient, Device, DeviceStatus};
use crate::error::Result;
use crate::list::InFlight;
use crate::storage::{Database, Session};

/// One device's detail view. Each load aborts the previous one; lifecycle
/// transitions replace the held device with the server's copy.
pub struct DeviceDetail {
    api: ApiClient,
    db: Arc<Database>,
    device: RwLock<Option<Device>>,
    latest_request: AtomicU64,
    in_flight: InFlight,
    alerts: AlertHub,
}

impl DeviceDetail {
    pub fn new(api: ApiClient, db: Arc<Database>) -> Self {
        Self {
            api,
            db,
            device: RwLock::new(None),
            latest_request: AtomicU64::new(0),
            in_flight: InFlight::new(),
            alerts: AlertHub::new(),
        }
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }

    pub async fn device(&self) -> Option<Device> {
        self.device.read().await.clone()
    }

    /// Load `device_id`. Returns `Ok(None)` when a newer load superseded
    /// this one.
    pub async fn load(&self, device_id: &str) -> Result<Option<Device>> {
        let token = self.token()?;
        let request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let registration = self.in_flight.begin(request_id);

        let result =
            match Abortable::new(self.api.get_device(&token, device_id), registration).await {
                Ok(result) => result,
                Err(_) => {
                    log::debug!("Device load {} aborted", request_id);
                    return Ok(None);
                }
            };
        self.in_flight.finish(request_id);

        let mut held = self.device.write().await;
        if self.latest_request.load(Ordering::SeqCst) != request_id {
            return Ok(None);
        }
        match result {
            Ok(device) => {
                *held = Some(device.clone());
                Ok(Some(device))
            }
            Err(e) => {
                drop(held);
                self.alerts.publish(Alert::from_error("Device", &e));
                Err(e)
            }
        }
    }

    pub async fn assign(&self, device_id: &str, user_ids: &[String]) -> Result<Device> {
        let token = self.token()?;
        let result = self.api.assign_device(&token, device_id, user_ids).await;
        self.apply_transition("Assign device", result).await
    }

    pub async fn revoke(&self, device_id: &str) -> Result<Device> {
        let token = self.token()?;
        let result = self.api.revoke_device(&token, device_id).await;
        self.apply_transition("Revoke device", result).await
    }

    pub async fn set_status(&self, device_id: &str, status: DeviceStatus) -> Result<Device> {
        let token = self.token()?;
        let result = self
            .api
            .update_device_status(&token, device_id, status)
            .await;
        self.apply_transition("Update status", result).await
    }

    /// Component unmount.
    pub fn shutdown(&self) {
        self.in_flight.abort();
        self.latest_request.fetch_add(1, Ordering::SeqCst);
    }

    fn token(&self) -> Result<String> {
        match Session::load(&self.db) {
            Ok(session) => Ok(session.token),
            Err(e) => {
                self.alerts.publish(Alert::from_error("Device", &e));
                Err(e)
            }
        }
    }

    async fn apply_transition(&self, action: &str, result: Result<Device>) -> Result<Device> {
        match result {
            Ok(device) => {
                if !device.has_consistent_history() {
                    log::warn!("{}: device {} has several open assignments", action, device.id);
                }
                let mut held = self.device.write().await;
                if held.as_ref().map_or(true, |d| d.id == device.id) {
                    *held = Some(device.clone());
                }
                log::info!("{}: {} is now {}", action, device.id, device.status.as_str());
                Ok(device)
            }
            Err(e) => {
                self.alerts.publish(Alert::from_error(action, &e));
                Err(e)
            }
        }
    }
}
