// build.rs

use std::env;

fn main() -> anyhow::Result<()> {
    // Necessary because of this issue: https://github.com/rust-lang/cargo/issues/9641
    // see also https://github.com/rust-lang/cargo/issues/9554
    // Only the espidf target has ESP-IDF cfg/link args to propagate.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::build::CfgArgs::output_propagated("ESP_IDF")?;
        embuild::build::LinkArgs::output_propagated("ESP_IDF")?;
    }

    let settings = [
        ("WIFI_SSID", "Wokwi-GUEST"),
        ("WIFI_PASS", ""),
        ("MQTT_HOST", "20.150.218.100"),
        ("MQTT_PORT", "1883"),
        ("DEVICE_ID", "ambience001"),
        ("API_KEY", "TEF"),
    ];

    for (name, default) in settings {
        let value = env::var(name).unwrap_or_else(|_| default.into());
        println!("cargo:rerun-if-env-changed={name}");
        println!("cargo:rustc-env={name}={value}");
    }

    Ok(())
}

// EOF
