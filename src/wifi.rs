// wifi.rs

use std::net::Ipv4Addr;

use anyhow::anyhow;
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition, wifi::EspWifi};
use log::*;

use crate::*;

/// Station-mode Wi-Fi. Association is started here and polled by `NetworkManager`.
pub struct EspLink<'a> {
    wifi: EspWifi<'a>,
}

impl<'a> EspLink<'a> {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &MyConfig,
    ) -> anyhow::Result<Self> {
        info!("Initializing Wi-Fi...");
        let mut wifi = EspWifi::new(modem, sysloop, nvs)?;

        let mac = wifi.sta_netif().get_mac()?;
        info!(
            "WiFi MAC {:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            mac[0], mac[1], mac[2], mac[3], mac[4], mac[5],
        );

        // an empty password means an open network
        let auth_method = if config.wifi_pass.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        info!("WiFi setting credentials for {:?}...", config.wifi_ssid);
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config
                .wifi_ssid
                .as_str()
                .try_into()
                .map_err(|_| anyhow!("wifi_ssid too long"))?,
            password: config
                .wifi_pass
                .as_str()
                .try_into()
                .map_err(|_| anyhow!("wifi_pass too long"))?,
            auth_method,
            ..Default::default()
        }))?;

        info!("WiFi driver starting...");
        wifi.start()?;
        Ok(EspLink { wifi })
    }
}

impl Link for EspLink<'_> {
    fn is_connected(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    fn associate(&mut self) -> anyhow::Result<()> {
        if !self.wifi.is_started()? {
            self.wifi.start()?;
        }
        // associated but without an address counts as down, start clean
        if self.wifi.is_connected()? {
            self.wifi.disconnect()?;
        }
        self.wifi.connect()?;
        Ok(())
    }

    fn ip_addr(&mut self) -> Option<Ipv4Addr> {
        self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }
}

// EOF
