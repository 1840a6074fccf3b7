// dht.rs

use std::time::{Duration, Instant};

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use thiserror::Error;

use crate::*;

// the sensor wants at least 1ms low to wake up
const START_LOW_US: u32 = 1_200;
const RESPONSE_TIMEOUT_US: u32 = 200;
const BIT_TIMEOUT_US: u32 = 120;
// 0-bits are 26-28us high, 1-bits 70us
const BIT_SAMPLE_US: u32 = 35;
const MIN_SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum DhtError<E> {
    #[error("pin error: {0:?}")]
    Pin(E),
    #[error("timeout waiting for the sensor")]
    Timeout,
    #[error("checksum mismatch: frame says {expected:#04x}, computed {computed:#04x}")]
    Checksum { expected: u8, computed: u8 },
}

/// Bit-banged DHT22 (AM2302) on a single open-drain pin with a pull-up.
pub struct Dht22<P, D> {
    pin: P,
    delay: D,
    last: Option<(Instant, Measurement)>,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(mut pin: P, delay: D) -> Result<Self, DhtError<P::Error>> {
        // idle state is released (high)
        pin.set_high().map_err(DhtError::Pin)?;
        Ok(Dht22 {
            pin,
            delay,
            last: None,
        })
    }

    pub fn release(self) -> P {
        self.pin
    }

    pub fn read(&mut self) -> Result<Measurement, DhtError<P::Error>> {
        if let Some((at, m)) = self.last {
            if at.elapsed() < MIN_SAMPLE_INTERVAL {
                return Ok(m);
            }
        }

        let frame = self.sample();
        // always leave the bus released, whatever happened
        self.pin.set_high().map_err(DhtError::Pin)?;
        let m = decode_frame(&frame?)?;
        self.last = Some((Instant::now(), m));
        Ok(m)
    }

    fn sample(&mut self) -> Result<[u8; 5], DhtError<P::Error>> {
        self.pin.set_low().map_err(DhtError::Pin)?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high().map_err(DhtError::Pin)?;

        // response: 80us low, 80us high, then the first bit starts low
        self.wait_for(false, RESPONSE_TIMEOUT_US)?;
        self.wait_for(true, RESPONSE_TIMEOUT_US)?;
        self.wait_for(false, RESPONSE_TIMEOUT_US)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_for(true, BIT_TIMEOUT_US)?;
            self.delay.delay_us(BIT_SAMPLE_US);
            if self.pin.is_high().map_err(DhtError::Pin)? {
                frame[bit / 8] |= 1 << (7 - bit % 8);
            }
            self.wait_for(false, BIT_TIMEOUT_US)?;
        }
        Ok(frame)
    }

    fn wait_for(&mut self, high: bool, timeout_us: u32) -> Result<(), DhtError<P::Error>> {
        for _ in 0..timeout_us {
            if self.pin.is_high().map_err(DhtError::Pin)? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(DhtError::Timeout)
    }
}

impl<P, D> ClimateSensor for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    type Error = DhtError<P::Error>;

    fn measure(&mut self) -> Result<Measurement, Self::Error> {
        self.read()
    }
}

/// Decode a raw 5-byte frame: humidity and temperature in tenths, big endian,
/// temperature sign in the top bit, then an 8-bit sum.
pub fn decode_frame<E>(frame: &[u8; 5]) -> Result<Measurement, DhtError<E>> {
    let computed = frame[..4]
        .iter()
        .fold(0u8, |sum, b| sum.wrapping_add(*b));
    if computed != frame[4] {
        return Err(DhtError::Checksum {
            expected: frame[4],
            computed,
        });
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]) as f32 / 10.0;
    let magnitude = u16::from_be_bytes([frame[2] & 0x7f, frame[3]]) as f32 / 10.0;
    let temperature = if frame[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    Ok(Measurement {
        temperature,
        humidity,
    })
}


// EOF
