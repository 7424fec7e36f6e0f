use tokio::sync::RwLock;

use crate::{
    camera::service::SnapshotCoordinator,
    config::{AppConfig, SnapshotSettings},
};

pub struct AppState {
    pub config: AppConfig,
    pub snapshots: SnapshotCoordinator,
    settings: RwLock<SnapshotSettings>,
}

impl AppState {
    pub fn new(config: AppConfig, snapshots: SnapshotCoordinator) -> Self {
        let settings = RwLock::new(config.snapshot.clone());
        Self {
            config,
            snapshots,
            settings,
        }
    }

    pub async fn settings(&self) -> SnapshotSettings {
        self.settings.read().await.clone()
    }

    pub async fn update_settings(
        &self,
        update: impl FnOnce(&mut SnapshotSettings),
    ) -> SnapshotSettings {
        let mut settings = self.settings.write().await;
        update(&mut settings);
        settings.clone()
    }
}
