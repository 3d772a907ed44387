//! Configuração unificada via TOML.
//!
//! O `config.toml` fornece os valores base; flags da linha de comando
//! sobrescrevem campo a campo antes de [`AppConfig::resolve`].

use crate::error::ConfigError;
use crate::types::{DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID, DeviceIdentity, Mode, parse_hex_id};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Limite superior do intervalo de envio (segundos).
const MAX_INTERVAL_SECS: f64 = 3600.0;

/// Identificação USB do display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Vendor ID em hex (ex: "aa88")
    pub vendor_id: String,
    /// Product ID em hex (ex: "8666")
    pub product_id: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: format!("{DEFAULT_VENDOR_ID:04x}"),
            product_id: format!("{DEFAULT_PRODUCT_ID:04x}"),
        }
    }
}

/// Configuração do envio periódico.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Métrica enviada: "temp", "cpu" ou "ram"
    pub mode: String,
    /// Intervalo de envio em segundos
    pub interval_secs: f64,
    /// Grupo de sensores de temperatura preferido (chip hwmon)
    pub preferred_sensor: String,
    /// Janela de amostragem do uso de CPU (ms)
    pub cpu_sample_window_ms: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            mode: "temp".into(),
            interval_secs: 1.0,
            preferred_sensor: "k10temp".into(),
            cpu_sample_window_ms: 200,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub sender: SenderConfig,
}

/// Configuração já validada, pronta para o loop de transmissão.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub identity: DeviceIdentity,
    pub mode: Mode,
    pub interval: Duration,
    pub preferred_sensor: String,
    pub cpu_sample_window: Duration,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(e) = parse_hex_id("vendor_id", &self.device.vendor_id) {
            errors.push(e.to_string());
        }
        if let Err(e) = parse_hex_id("product_id", &self.device.product_id) {
            errors.push(e.to_string());
        }
        if let Err(e) = self.sender.mode.parse::<Mode>() {
            errors.push(e.to_string());
        }

        let interval = self.sender.interval_secs;
        if !interval.is_finite() || interval <= 0.0 || interval > MAX_INTERVAL_SECS {
            errors.push(format!(
                "Intervalo do sender inválido: {interval} (esperado > 0 e ≤ {MAX_INTERVAL_SECS}s)"
            ));
        }
        if self.sender.preferred_sensor.trim().is_empty() {
            errors.push("Sensor preferido não pode ser vazio".into());
        }

        errors
    }

    /// Valida e converte para [`Settings`].
    ///
    /// Um único problema de hex ou modo é reportado com o erro específico;
    /// múltiplos problemas viram [`ConfigError::Invalid`].
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let errors = self.validate();
        if errors.len() > 1 {
            return Err(ConfigError::Invalid(errors));
        }

        let vendor_id = parse_hex_id("vendor_id", &self.device.vendor_id)?;
        let product_id = parse_hex_id("product_id", &self.device.product_id)?;
        let mode = self.sender.mode.parse::<Mode>()?;
        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        Ok(Settings {
            identity: DeviceIdentity::new(vendor_id, product_id),
            mode,
            interval: Duration::from_secs_f64(self.sender.interval_secs),
            preferred_sensor: self.sender.preferred_sensor.trim().to_string(),
            cpu_sample_window: Duration::from_millis(self.sender.cpu_sample_window_ms),
        })
    }
}
