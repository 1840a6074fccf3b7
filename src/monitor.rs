// monitor.rs

use log::*;
use tokio::time::{sleep, Duration, Instant};

use crate::*;

/// Everything the main loop owns. Components only ever see `&mut` borrows of it.
pub struct Monitor<L, C, S> {
    pub config: MyConfig,
    pub network: NetworkManager<L, C>,
    pub sensor: SensorReader<S>,
    pub reporter: Reporter,
}

impl<L, C, S> Monitor<L, C, S>
where
    L: Link,
    C: Session,
    S: ClimateSensor,
{
    pub fn new(config: MyConfig, link: L, session: C, sensor: S) -> anyhow::Result<Self> {
        config.check()?;
        let network = NetworkManager::new(link, session, NetSettings::from_config(&config));
        let reporter = Reporter::from_config(&config, Instant::now());
        info!(
            "Reporting to {} topic {} every {}s",
            config.mqtt_url(),
            reporter.topic(),
            config.poll_interval().as_secs()
        );

        Ok(Monitor {
            config,
            network,
            sensor: SensorReader::new(sensor),
            reporter,
        })
    }

    /// One pass of the main loop. Blocks for as long as reconnecting takes.
    pub async fn tick(&mut self) -> Option<Payload> {
        self.network.ensure_link().await;
        self.network.ensure_session().await;
        self.network.service();

        let now = Instant::now();
        self.reporter
            .maybe_report(now, &mut self.sensor, &mut self.network)
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let pause = Duration::from_millis(self.config.tick_ms);
        info!("Entering main loop...");
        loop {
            self.tick().await;
            sleep(pause).await;
        }
    }
}


// EOF
