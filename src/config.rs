// config.rs

use anyhow::bail;
use tokio::time::Duration;

use crate::*;

const DEFAULT_MQTT_PORT: u16 = 1883;

/// Time between two reports.
const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;
/// Pause after a failed broker handshake.
const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;
const DEFAULT_LINK_POLL_MS: u64 = 500;
const DEFAULT_LINK_TIMEOUT_MS: u64 = 20_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_KEEPALIVE_S: u64 = 15;
const DEFAULT_TICK_MS: u64 = 100;

const DEFAULT_TEMP_HIGH: f32 = 28.0;
const DEFAULT_HUM_LOW: f32 = 35.0;

/// Everything the firmware needs to know, fixed at build time and loaded once at startup.
///
/// Network settings come from the `WIFI_SSID`, `WIFI_PASS`, `MQTT_HOST`, `MQTT_PORT`,
/// `DEVICE_ID` and `API_KEY` environment variables seen by `build.rs`.
#[derive(Clone, Debug, PartialEq)]
pub struct MyConfig {
    pub wifi_ssid: String,
    pub wifi_pass: String,

    pub mqtt_host: String,
    pub mqtt_port: u16,
    /// Also used as the MQTT client id.
    pub device_id: String,
    pub api_key: String,
    pub keepalive_s: u64,

    pub poll_interval_ms: u64,
    pub reconnect_delay_ms: u64,
    pub link_poll_ms: u64,
    pub link_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub tick_ms: u64,

    /// Discomfort above this temperature (°C).
    pub temp_high: f32,
    /// Discomfort below this relative humidity (%).
    pub hum_low: f32,
}

impl Default for MyConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: option_env!("WIFI_SSID").unwrap_or("Wokwi-GUEST").into(),
            wifi_pass: option_env!("WIFI_PASS").unwrap_or("").into(),

            mqtt_host: option_env!("MQTT_HOST").unwrap_or("20.150.218.100").into(),
            mqtt_port: option_env!("MQTT_PORT")
                .unwrap_or("-")
                .parse()
                .unwrap_or(DEFAULT_MQTT_PORT),
            device_id: option_env!("DEVICE_ID").unwrap_or("ambience001").into(),
            api_key: option_env!("API_KEY").unwrap_or("TEF").into(),
            keepalive_s: DEFAULT_KEEPALIVE_S,

            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            link_poll_ms: DEFAULT_LINK_POLL_MS,
            link_timeout_ms: DEFAULT_LINK_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            tick_ms: DEFAULT_TICK_MS,

            temp_high: DEFAULT_TEMP_HIGH,
            hum_low: DEFAULT_HUM_LOW,
        }
    }
}

impl MyConfig {
    /// UltraLight attribute topic, `/<api_key>/<device_id>/attrs`.
    pub fn topic(&self) -> String {
        format!("/{}/{}/attrs", self.api_key, self.device_id)
    }

    pub fn mqtt_url(&self) -> String {
        format!("mqtt://{}:{}", self.mqtt_host, self.mqtt_port)
    }

    pub fn comfort_limits(&self) -> ComfortLimits {
        ComfortLimits {
            temp_high: self.temp_high,
            hum_low: self.hum_low,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if self.wifi_ssid.is_empty() {
            bail!("wifi_ssid is empty");
        }
        if self.mqtt_host.is_empty() {
            bail!("mqtt_host is empty");
        }
        if self.mqtt_port == 0 {
            bail!("mqtt_port must be non-zero");
        }
        if self.device_id.is_empty() {
            bail!("device_id is empty");
        }
        if self.api_key.is_empty() {
            bail!("api_key is empty");
        }
        if self.topic().contains(['+', '#']) {
            bail!("topic {:?} contains MQTT wildcards", self.topic());
        }

        let timings = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("reconnect_delay_ms", self.reconnect_delay_ms),
            ("link_poll_ms", self.link_poll_ms),
            ("link_timeout_ms", self.link_timeout_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("tick_ms", self.tick_ms),
        ];
        if let Some((name, _)) = timings.iter().find(|(_, v)| *v == 0) {
            bail!("{name} must be non-zero");
        }

        if !self.temp_high.is_finite() || !self.hum_low.is_finite() {
            bail!("comfort limits must be finite");
        }
        Ok(())
    }
}


// EOF
