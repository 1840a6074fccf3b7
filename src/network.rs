// network.rs

use std::net::Ipv4Addr;

use log::*;
use thiserror::Error;
use tokio::time::{sleep, Duration, Instant};

use crate::*;

const HANDSHAKE_POLL: Duration = Duration::from_millis(100);

/// Link layer, i.e. the Wi-Fi station interface.
pub trait Link {
    /// Associated and holding an address.
    fn is_connected(&mut self) -> bool;

    /// Kick off a fresh association without waiting for it to complete.
    fn associate(&mut self) -> anyhow::Result<()>;

    fn ip_addr(&mut self) -> Option<Ipv4Addr> {
        None
    }
}

/// Session layer, i.e. a publish-only MQTT client.
pub trait Session {
    fn is_connected(&self) -> bool;

    /// Start a handshake with the broker. Completion is observed through `poll()`
    /// and `is_connected()`.
    fn connect(&mut self, client_id: &str) -> Result<(), SessionError>;

    /// Fire-and-forget publish at QoS 0.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError>;

    /// Keepalive and inbound dispatch. Must be called every loop tick.
    fn poll(&mut self);
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not connected")]
    NotConnected,
    #[error("broker refused the connection: {0}")]
    Refused(String),
    #[error("client error: {0}")]
    Client(String),
}

#[derive(Clone, Debug)]
pub struct NetSettings {
    pub client_id: String,
    pub broker: String,
    pub link_poll: Duration,
    pub link_timeout: Duration,
    pub connect_timeout: Duration,
    pub reconnect_delay: Duration,
}

impl NetSettings {
    pub fn from_config(config: &MyConfig) -> Self {
        NetSettings {
            client_id: config.device_id.clone(),
            broker: config.mqtt_url(),
            link_poll: Duration::from_millis(config.link_poll_ms),
            link_timeout: Duration::from_millis(config.link_timeout_ms),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            reconnect_delay: config.reconnect_delay(),
        }
    }
}

/// Keeps the link and the broker session up, and is the only way out to the broker.
pub struct NetworkManager<L, C> {
    link: L,
    session: C,
    settings: NetSettings,
    pub state: ConnectionState,
}

impl<L: Link, C: Session> NetworkManager<L, C> {
    pub fn new(link: L, session: C, settings: NetSettings) -> Self {
        NetworkManager {
            link,
            session,
            settings,
            state: ConnectionState::new(),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn session(&self) -> &C {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut C {
        &mut self.session
    }

    /// Returns at once if the link is up, otherwise waits until it is. Never gives up.
    pub async fn ensure_link(&mut self) {
        let up = self.link.is_connected();
        self.state.link.observe(up);
        if up {
            return;
        }
        // no link, no session
        self.state.session.lost();

        loop {
            self.state.link.attempt();
            info!("WiFi connecting...");
            if let Err(e) = self.link.associate() {
                error!("WiFi connect error: {e:#}");
            }

            let deadline = Instant::now() + self.settings.link_timeout;
            while Instant::now() < deadline {
                sleep(self.settings.link_poll).await;
                if self.link.is_connected() {
                    self.state.link.connected();
                    match self.link.ip_addr() {
                        Some(ip) => info!("WiFi connected, IP address: {ip}"),
                        None => info!("WiFi connected."),
                    }
                    return;
                }
                debug!("WiFi waiting for association...");
            }
            warn!(
                "WiFi not up after {}s, starting over",
                self.settings.link_timeout.as_secs()
            );
        }
    }

    /// Returns at once if the session is up, otherwise retries the handshake every
    /// `reconnect_delay` until the broker accepts us. Never gives up.
    pub async fn ensure_session(&mut self) {
        let up = self.session.is_connected();
        self.state.session.observe(up);
        if up {
            return;
        }

        loop {
            if !self.link.is_connected() {
                self.ensure_link().await;
            }

            self.state.session.attempt();
            info!(
                "MQTT connecting to {} as {}...",
                self.settings.broker, self.settings.client_id
            );
            let failure = match self.session.connect(&self.settings.client_id) {
                Ok(()) => {
                    if self.await_handshake().await {
                        self.state.session.connected();
                        info!("MQTT connected.");
                        return;
                    }
                    "handshake timed out".to_string()
                }
                Err(e) => e.to_string(),
            };

            error!(
                "MQTT connection failed: {failure}, try again in {}s",
                self.settings.reconnect_delay.as_secs()
            );
            sleep(self.settings.reconnect_delay).await;
        }
    }

    async fn await_handshake(&mut self) -> bool {
        let deadline = Instant::now() + self.settings.connect_timeout;
        loop {
            self.session.poll();
            if self.session.is_connected() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(HANDSHAKE_POLL).await;
        }
    }

    /// Best effort. Returns whether the payload was handed to the transport.
    pub fn publish(&mut self, topic: &str, payload: &str) -> bool {
        if !self.session.is_connected() {
            debug!("MQTT down, not sending to {topic}");
            return false;
        }
        match self.session.publish(topic, payload.as_bytes()) {
            Ok(()) => true,
            Err(e) => {
                error!("MQTT send error: {e}");
                false
            }
        }
    }

    pub fn service(&mut self) {
        self.session.poll();
        let up = self.session.is_connected();
        self.state.session.observe(up);
    }
}


// EOF
