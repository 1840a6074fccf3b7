// bin/esp32ambient.rs

#[cfg(target_os = "espidf")]
esp_idf_sys::esp_app_desc!();

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp32ambient::*;
    use esp_idf_hal::{
        delay::{Ets, FreeRtos},
        gpio::{IOPin, PinDriver, Pull},
        prelude::Peripherals,
    };
    use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs};
    use log::*;

    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("Hello.");
    info!("Starting up, firmware v{FW_VERSION}");

    let config = MyConfig::default();
    info!("My config:\n{config:#?}");

    let sysloop = EspSystemEventLoop::take()?;
    let nvs_default_partition = nvs::EspDefaultNvsPartition::take()?;
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    #[cfg(feature = "esp32c3")]
    let dht_pin = pins.gpio4.downgrade();
    #[cfg(not(feature = "esp32c3"))]
    let dht_pin = pins.gpio15.downgrade();

    let mut dht_drv = PinDriver::input_output_od(dht_pin)?;
    dht_drv.set_pull(Pull::Up)?;
    let sensor = Dht22::new(dht_drv, Ets)?;
    info!("DHT22 ready.");

    let link = EspLink::new(
        peripherals.modem,
        sysloop,
        Some(nvs_default_partition),
        &config,
    )?;
    let session = EspSession::new(&config);
    let monitor = Monitor::new(config, link, session, sensor)?;

    let res = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(Box::pin(monitor.run()));

    // not actually returning from main() but we reboot instead
    error!("Main loop ended: {res:?}, reboot.");
    FreeRtos::delay_ms(3000);
    esp_idf_hal::reset::restart();
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "{} is firmware, build it for an ESP-IDF target (e.g. xtensa-esp32-espidf).",
        env!("CARGO_BIN_NAME")
    );
    std::process::exit(1);
}

// EOF
