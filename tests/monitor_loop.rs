// tests/monitor_loop.rs
//
// The whole poll-and-publish loop against scripted fakes, on tokio's paused clock.

use esp32ambient::*;
use tokio::time::{sleep, Duration, Instant};

#[derive(Default)]
struct Wifi {
    up: bool,
    associations: u32,
}

impl Link for Wifi {
    fn is_connected(&mut self) -> bool {
        self.up
    }

    fn associate(&mut self) -> anyhow::Result<()> {
        self.associations += 1;
        self.up = true;
        Ok(())
    }
}

#[derive(Default)]
struct Broker {
    up: bool,
    handshaking: bool,
    connects: u32,
    refuse_next: u32,
    sent: Vec<(String, String)>,
}

impl Session for Broker {
    fn is_connected(&self) -> bool {
        self.up
    }

    fn connect(&mut self, _client_id: &str) -> Result<(), SessionError> {
        self.connects += 1;
        if self.refuse_next > 0 {
            self.refuse_next -= 1;
            return Err(SessionError::Refused("server unavailable".into()));
        }
        self.handshaking = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        self.sent
            .push((topic.into(), String::from_utf8(payload.to_vec()).unwrap()));
        Ok(())
    }

    fn poll(&mut self) {
        if self.handshaking {
            self.handshaking = false;
            self.up = true;
        }
    }
}

struct Dht {
    samples: Vec<Option<(f32, f32)>>,
}

impl ClimateSensor for Dht {
    type Error = &'static str;

    fn measure(&mut self) -> Result<Measurement, Self::Error> {
        match self.samples.pop() {
            Some(Some((temperature, humidity))) => Ok(Measurement {
                temperature,
                humidity,
            }),
            _ => Err("checksum"),
        }
    }
}

fn config() -> MyConfig {
    MyConfig {
        api_key: "TEF".into(),
        device_id: "ambience001".into(),
        ..MyConfig::default()
    }
}

fn monitor(samples: Vec<Option<(f32, f32)>>) -> Monitor<Wifi, Broker, Dht> {
    // samples are popped from the back
    let samples = samples.into_iter().rev().collect();
    Monitor::new(config(), Wifi::default(), Broker::default(), Dht { samples }).unwrap()
}

/// Tick once per second until `secs` have passed since `start`.
async fn run_for(m: &mut Monitor<Wifi, Broker, Dht>, start: Instant, secs: u64) -> Vec<Payload> {
    let mut out = Vec::new();
    while start.elapsed() < Duration::from_secs(secs) {
        if let Some(p) = m.tick().await {
            out.push(p);
        }
        sleep(Duration::from_secs(1)).await;
    }
    out
}

#[tokio::test(start_paused = true)]
async fn reports_every_thirty_seconds() {
    let start = Instant::now();
    let mut m = monitor(vec![Some((29.3, 40.2)), None, Some((20.0, 60.0))]);

    let payloads = run_for(&mut m, start, 95).await;
    assert_eq!(payloads.len(), 3);

    let sent: Vec<&str> = m
        .network
        .session()
        .sent
        .iter()
        .map(|(topic, body)| {
            assert_eq!(topic, "/TEF/ambience001/attrs");
            body.as_str()
        })
        .collect();
    assert_eq!(
        sent,
        ["t|29.3|h|40.2|a|true", "error|1", "t|20.0|h|60.0|a|false"]
    );
    assert_eq!(m.reporter.stats.sensor_faults, 1);
    assert_eq!(m.network.link().associations, 1);
}

#[tokio::test(start_paused = true)]
async fn recovers_from_link_and_broker_loss() {
    let start = Instant::now();
    let mut m = monitor(vec![Some((22.0, 50.0)); 4]);

    let first = run_for(&mut m, start, 40).await;
    assert_eq!(first.len(), 1);

    // access point goes away, the broker is gone with it
    m.network.link_mut().up = false;
    m.network.session_mut().up = false;
    m.network.session_mut().refuse_next = 2;

    let before = m.network.session().connects;
    m.tick().await;
    assert!(m.network.state.online());
    assert_eq!(m.network.link().associations, 2);
    assert_eq!(m.network.session().connects, before + 3);
    assert_eq!(m.network.state.link.connects, 2);
    assert_eq!(m.network.state.session.connects, 2);

    let later = run_for(&mut m, start, 100).await;
    assert!(!later.is_empty());
    assert_eq!(m.reporter.stats.dropped, 0);
}

#[tokio::test(start_paused = true)]
async fn nothing_is_published_before_the_first_interval() {
    let start = Instant::now();
    let mut m = monitor(vec![Some((22.0, 50.0))]);

    let payloads = run_for(&mut m, start, 30).await;
    assert!(payloads.is_empty());
    assert!(m.network.session().sent.is_empty());
    assert!(m.network.state.online());
}
