// report.rs

use std::fmt;

use log::*;
use tokio::time::{Duration, Instant};

use crate::*;

pub const SENSOR_FAULT_PAYLOAD: &str = "error|1";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComfortLimits {
    pub temp_high: f32,
    pub hum_low: f32,
}

impl ComfortLimits {
    pub fn is_uncomfortable(&self, temperature: f32, humidity: f32) -> bool {
        temperature > self.temp_high || humidity < self.hum_low
    }
}

/// What goes on the wire, in UltraLight 2.0 attribute syntax.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    Climate {
        temperature: f32,
        humidity: f32,
        discomfort: bool,
    },
    SensorFault,
}

impl Payload {
    /// Invalid readings never reach the threshold check.
    pub fn from_reading(reading: &Reading, limits: &ComfortLimits) -> Self {
        if !reading.valid {
            return Payload::SensorFault;
        }
        Payload::Climate {
            temperature: reading.temperature,
            humidity: reading.humidity,
            discomfort: limits.is_uncomfortable(reading.temperature, reading.humidity),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Climate {
                temperature,
                humidity,
                discomfort,
            } => write!(f, "t|{temperature:.1}|h|{humidity:.1}|a|{discomfort}"),
            Payload::SensorFault => f.write_str(SENSOR_FAULT_PAYLOAD),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub reports: u32,
    pub sensor_faults: u32,
    pub dropped: u32,
}

pub struct Reporter {
    topic: String,
    interval: Duration,
    limits: ComfortLimits,
    last_report: Instant,
    pub stats: ReportStats,
}

impl Reporter {
    pub fn new(topic: String, interval: Duration, limits: ComfortLimits, start: Instant) -> Self {
        Reporter {
            topic,
            interval,
            limits,
            last_report: start,
            stats: ReportStats::default(),
        }
    }

    pub fn from_config(config: &MyConfig, start: Instant) -> Self {
        Self::new(
            config.topic(),
            config.poll_interval(),
            config.comfort_limits(),
            start,
        )
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn last_report(&self) -> Instant {
        self.last_report
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_report) > self.interval
    }

    /// Read, evaluate and publish once the interval has passed. Returns the payload
    /// that was produced, whether or not the session accepted it.
    pub fn maybe_report<S, L, C>(
        &mut self,
        now: Instant,
        sensor: &mut SensorReader<S>,
        network: &mut NetworkManager<L, C>,
    ) -> Option<Payload>
    where
        S: ClimateSensor,
        L: Link,
        C: Session,
    {
        if !self.is_due(now) {
            return None;
        }
        // a failed read still counts as a cycle
        self.last_report = now;
        self.stats.reports += 1;

        let reading = sensor.read();
        let payload = Payload::from_reading(&reading, &self.limits);
        let wire = payload.to_string();

        if network.publish(&self.topic, &wire) {
            info!("Published #{n} to {t}: {wire}", n = self.stats.reports, t = self.topic);
        } else {
            self.stats.dropped += 1;
            warn!("Dropped #{n}, session down: {wire}", n = self.stats.reports);
        }

        match payload {
            Payload::Climate { discomfort, .. } => {
                info!(
                    "Status: discomfort detected? {}",
                    if discomfort { "YES" } else { "NO" }
                );
            }
            Payload::SensorFault => {
                self.stats.sensor_faults += 1;
                error!("Sensor fault #{n}, alert sent.", n = self.stats.sensor_faults);
            }
        }

        Some(payload)
    }
}


// EOF
