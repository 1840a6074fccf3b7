// state.rs

use std::fmt;

/// Lifecycle of one connectivity facet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
    Disconnected,
    Reconnecting,
    Connected,
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Connectivity::Disconnected => "disconnected",
            Connectivity::Reconnecting => "reconnecting",
            Connectivity::Connected => "connected",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct Facet {
    pub name: &'static str,
    pub status: Connectivity,
    /// Successful connects, the first one included.
    pub connects: u32,
    pub attempts: u32,
}

impl Facet {
    pub fn new(name: &'static str) -> Self {
        Facet {
            name,
            status: Connectivity::Disconnected,
            connects: 0,
            attempts: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == Connectivity::Connected
    }

    /// Record a polled status. Returns true when a drop was detected.
    pub fn observe(&mut self, up: bool) -> bool {
        match (self.status, up) {
            (Connectivity::Connected, false) => {
                self.status = Connectivity::Disconnected;
                log::warn!("{} lost", self.name);
                true
            }
            (Connectivity::Disconnected | Connectivity::Reconnecting, true) => {
                self.connected();
                false
            }
            _ => false,
        }
    }

    pub fn attempt(&mut self) {
        self.attempts += 1;
        if self.status != Connectivity::Reconnecting {
            log::debug!("{}: {} -> reconnecting", self.name, self.status);
            self.status = Connectivity::Reconnecting;
        }
    }

    pub fn connected(&mut self) {
        if self.status != Connectivity::Connected {
            self.connects += 1;
            log::info!(
                "{}: {} -> connected (#{} after {} attempts)",
                self.name,
                self.status,
                self.connects,
                self.attempts
            );
            self.status = Connectivity::Connected;
            self.attempts = 0;
        }
    }

    pub fn lost(&mut self) {
        if self.status != Connectivity::Disconnected {
            log::warn!("{}: {} -> disconnected", self.name, self.status);
            self.status = Connectivity::Disconnected;
        }
    }
}

/// Both facets of the device's connectivity. A session is only meaningful while the
/// link is up.
#[derive(Clone, Debug)]
pub struct ConnectionState {
    pub link: Facet,
    pub session: Facet,
}

impl ConnectionState {
    pub fn new() -> Self {
        ConnectionState {
            link: Facet::new("WiFi"),
            session: Facet::new("MQTT"),
        }
    }

    pub fn online(&self) -> bool {
        self.link.is_connected() && self.session.is_connected()
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}


// EOF
