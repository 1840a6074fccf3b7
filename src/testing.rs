// testing.rs
//
// Fake hardware for the unit tests.

use std::{collections::VecDeque, convert::Infallible};

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, InputPin, OutputPin},
};

use crate::*;

pub struct FakeSensor {
    script: VecDeque<Result<(f32, f32), ()>>,
    steady: Option<(f32, f32)>,
    pub reads: u32,
}

impl FakeSensor {
    /// Plays the script back, then fails forever.
    pub fn with(script: Vec<Result<(f32, f32), ()>>) -> Self {
        FakeSensor {
            script: script.into(),
            steady: None,
            reads: 0,
        }
    }

    pub fn steady(temperature: f32, humidity: f32) -> Self {
        FakeSensor {
            script: VecDeque::new(),
            steady: Some((temperature, humidity)),
            reads: 0,
        }
    }
}

impl ClimateSensor for FakeSensor {
    type Error = ();

    fn measure(&mut self) -> Result<Measurement, ()> {
        self.reads += 1;
        let sample = match self.script.pop_front() {
            Some(s) => s,
            None => self.steady.ok_or(()),
        };
        sample.map(|(temperature, humidity)| Measurement {
            temperature,
            humidity,
        })
    }
}

#[derive(Default)]
pub struct FakeLink {
    pub up: bool,
    pub associations: u32,
    /// Polls needed after an association before the link reports up.
    pub up_after_polls: u32,
    /// Leading associations that never complete.
    pub dead_associations: u32,
    pending: Option<u32>,
}

impl Link for FakeLink {
    fn is_connected(&mut self) -> bool {
        if let Some(n) = self.pending {
            if n == 0 {
                self.up = true;
                self.pending = None;
            } else {
                self.pending = Some(n - 1);
            }
        }
        self.up
    }

    fn associate(&mut self) -> anyhow::Result<()> {
        self.associations += 1;
        self.pending = if self.associations <= self.dead_associations {
            None
        } else {
            Some(self.up_after_polls)
        };
        Ok(())
    }

    fn ip_addr(&mut self) -> Option<std::net::Ipv4Addr> {
        self.up.then(|| std::net::Ipv4Addr::new(10, 0, 0, 42))
    }
}

#[derive(Default)]
pub struct FakeSession {
    pub up: bool,
    pub client_ids: Vec<String>,
    /// Leading connects that fail outright.
    pub refusals: u32,
    /// Leading successful connects whose handshake never completes.
    pub stalls: u32,
    pub fail_publish: bool,
    pub transport_calls: u32,
    pub published: Vec<(String, String)>,
    pub polls: u32,
    handshaking: bool,
}

impl Session for FakeSession {
    fn is_connected(&self) -> bool {
        self.up
    }

    fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        self.client_ids.push(client_id.to_string());
        if self.refusals > 0 {
            self.refusals -= 1;
            return Err(SessionError::Refused("rc=-2".into()));
        }
        if self.stalls > 0 {
            self.stalls -= 1;
            self.handshaking = false;
        } else {
            self.handshaking = true;
        }
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        self.transport_calls += 1;
        if self.fail_publish {
            return Err(SessionError::Client("outbox full".into()));
        }
        self.published.push((
            topic.to_string(),
            String::from_utf8_lossy(payload).into_owned(),
        ));
        Ok(())
    }

    fn poll(&mut self) {
        self.polls += 1;
        if self.handshaking {
            self.handshaking = false;
            self.up = true;
        }
    }
}

pub fn offline_manager() -> NetworkManager<FakeLink, FakeSession> {
    NetworkManager::new(
        FakeLink::default(),
        FakeSession::default(),
        NetSettings::from_config(&MyConfig {
            device_id: "ambience001".into(),
            ..MyConfig::default()
        }),
    )
}

pub fn online_manager() -> NetworkManager<FakeLink, FakeSession> {
    let mut net = offline_manager();
    net.link_mut().up = true;
    net.session_mut().up = true;
    net.state.link.connected();
    net.state.session.connected();
    net
}

pub struct StuckPin {
    level: bool,
    pub driven_high: Option<bool>,
}

impl StuckPin {
    pub fn high() -> Self {
        StuckPin {
            level: true,
            driven_high: None,
        }
    }

    pub fn low() -> Self {
        StuckPin {
            level: false,
            driven_high: None,
        }
    }
}

impl ErrorType for StuckPin {
    type Error = Infallible;
}

impl InputPin for StuckPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.level)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.level)
    }
}

impl OutputPin for StuckPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.driven_high = Some(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.driven_high = Some(true);
        Ok(())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// EOF
