//! Argumentos de linha de comando.
//!
//! Cada flag informada sobrescreve o campo correspondente do `config.toml`.

use clap::Parser;
use cooler_core::AppConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "cooler_sender",
    version,
    about = "Envia temperatura/uso de CPU ou RAM para o display USB HID do water cooler"
)]
pub struct Cli {
    /// Vendor ID USB em hex (padrão: aa88)
    #[arg(long, value_name = "HEX")]
    pub vendor_id: Option<String>,

    /// Product ID USB em hex (padrão: 8666)
    #[arg(long, value_name = "HEX")]
    pub product_id: Option<String>,

    /// Métrica enviada ao display (padrão: temp)
    #[arg(long, value_parser = ["temp", "cpu", "ram"], ignore_case = true)]
    pub mode: Option<String>,

    /// Intervalo de envio em segundos (padrão: 1.0)
    #[arg(long, value_name = "SECS")]
    pub interval: Option<f64>,

    /// Caminho do config.toml (padrão: ao lado do executável)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Lista os dispositivos HID conectados e sai
    #[arg(long)]
    pub list_devices: bool,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(AppConfig::default_path)
    }

    /// Aplica as flags informadas sobre a configuração carregada.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(vendor_id) = &self.vendor_id {
            config.device.vendor_id = vendor_id.clone();
        }
        if let Some(product_id) = &self.product_id {
            config.device.product_id = product_id.clone();
        }
        if let Some(mode) = &self.mode {
            config.sender.mode = mode.clone();
        }
        if let Some(interval) = self.interval {
            config.sender.interval_secs = interval;
        }
        config
    }
}
