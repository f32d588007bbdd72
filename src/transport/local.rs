use super::{ProgressFn, Transport};
use crate::config::LocalConfig;
use crate::error::TransportError;
use crate::upload::ManagedFile;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

const STEPS: u32 = 5;

/// Pretends to upload: five equal progress steps over the simulated delay, no network.
pub struct LocalTransport {
    config: LocalConfig,
}

impl LocalTransport {
    pub fn new(config: LocalConfig) -> Self {
        Self { config }
    }

    fn total_delay(&self) -> Duration {
        self.config.simulation_delay.unwrap_or_else(|| {
            Duration::from_millis(rand::thread_rng().gen_range(500..1000))
        })
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn upload(
        &self,
        file: &ManagedFile,
        on_progress: ProgressFn,
    ) -> Result<String, TransportError> {
        let step = self.total_delay() / STEPS;
        tracing::debug!("Simulating upload of {} in steps of {:?}", file.name, step);

        for i in 1..=STEPS {
            sleep(step).await;
            on_progress((i * 100 / STEPS) as u8);
        }

        Ok(file.name.clone())
    }
}
