// mqtt.rs

use std::sync::mpsc;

use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
use log::*;
use tokio::time::Duration;

use crate::*;

// what the esp-mqtt task tells the main loop
enum Notice {
    Connected,
    Disconnected,
    Received { topic: String, len: usize },
    Error(String),
}

/// esp-mqtt client. Events arrive on the esp-mqtt task and are only looked at
/// in `poll()`, on the main loop.
pub struct EspSession {
    url: String,
    keep_alive: Duration,
    client: Option<EspMqttClient<'static>>,
    notices: Option<mpsc::Receiver<Notice>>,
    up: bool,
}

impl EspSession {
    pub fn new(config: &MyConfig) -> Self {
        EspSession {
            url: config.mqtt_url(),
            keep_alive: Duration::from_secs(config.keepalive_s),
            client: None,
            notices: None,
            up: false,
        }
    }
}

impl Session for EspSession {
    fn is_connected(&self) -> bool {
        self.up && self.client.is_some()
    }

    fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        // drop the old client, it would keep reconnecting on its own
        self.client = None;
        self.notices = None;
        self.up = false;

        let (tx, rx) = mpsc::channel();
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            keep_alive_interval: Some(self.keep_alive),
            ..Default::default()
        };

        let client = EspMqttClient::new_cb(&self.url, &conf, move |event| {
            let notice = match event.payload() {
                EventPayload::Connected(_) => Notice::Connected,
                EventPayload::Disconnected => Notice::Disconnected,
                EventPayload::Received { topic, data, .. } => Notice::Received {
                    topic: topic.unwrap_or("-").to_string(),
                    len: data.len(),
                },
                EventPayload::Error(e) => Notice::Error(format!("{e:?}")),
                _ => return,
            };
            // receiver is gone once the loop has moved on to a new client
            tx.send(notice).ok();
        })
        .map_err(|e| SessionError::Client(format!("{e:?}")))?;

        self.client = Some(client);
        self.notices = Some(rx);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        let client = self.client.as_mut().ok_or(SessionError::NotConnected)?;
        client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|e| SessionError::Client(format!("{e:?}")))
    }

    fn poll(&mut self) {
        let Some(notices) = self.notices.as_ref() else {
            return;
        };
        while let Ok(notice) = notices.try_recv() {
            match notice {
                Notice::Connected => self.up = true,
                Notice::Disconnected => {
                    if self.up {
                        error!("MQTT connection closed.");
                    }
                    self.up = false;
                }
                Notice::Received { topic, len } => info!("MQTT received {len} bytes on {topic}"),
                Notice::Error(e) => error!("MQTT error: {e}"),
            }
        }
    }
}

// EOF
