// measure.rs

use std::fmt::Debug;

use log::*;

/// One raw sample from a climate sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub temperature: f32,
    pub humidity: f32,
}

/// A sensor that yields temperature (°C) and relative humidity (%).
pub trait ClimateSensor {
    type Error: Debug;

    fn measure(&mut self) -> Result<Measurement, Self::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub temperature: f32,
    pub humidity: f32,
    pub valid: bool,
}

impl Reading {
    pub fn invalid() -> Self {
        Reading {
            temperature: f32::NAN,
            humidity: f32::NAN,
            valid: false,
        }
    }
}

impl From<Measurement> for Reading {
    fn from(m: Measurement) -> Self {
        Reading {
            temperature: m.temperature,
            humidity: m.humidity,
            valid: m.temperature.is_finite() && m.humidity.is_finite(),
        }
    }
}

/// Single-sample reader: no retries, no averaging.
pub struct SensorReader<S> {
    sensor: S,
}

impl<S: ClimateSensor> SensorReader<S> {
    pub fn new(sensor: S) -> Self {
        SensorReader { sensor }
    }

    pub fn read(&mut self) -> Reading {
        match self.sensor.measure() {
            Ok(m) => {
                let r = Reading::from(m);
                if !r.valid {
                    error!("Sensor returned garbage: {m:?}");
                }
                r
            }
            Err(e) => {
                error!("Sensor read failed: {e:?}");
                Reading::invalid()
            }
        }
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}


// EOF
