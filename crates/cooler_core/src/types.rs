//! Tipos compartilhados: identidade do dispositivo, modo de métrica e amostra.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

// ──────────────────────────────────────────────
// Dispositivo
// ──────────────────────────────────────────────

/// Vendor ID padrão do display do water cooler.
pub const DEFAULT_VENDOR_ID: u16 = 0xaa88;
/// Product ID padrão do display do water cooler.
pub const DEFAULT_PRODUCT_ID: u16 = 0x8666;

/// Par vendor/product usado apenas na descoberta do dispositivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    /// Verifica se um dispositivo enumerado corresponde a esta identidade.
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_VENDOR_ID, DEFAULT_PRODUCT_ID)
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Converte um ID USB em hex ("aa88", "0xAA88") para `u16`.
pub fn parse_hex_id(field: &'static str, value: &str) -> Result<u16, ConfigError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 4 {
        return Err(ConfigError::InvalidHex {
            field,
            value: value.to_string(),
        });
    }

    u16::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidHex {
        field,
        value: value.to_string(),
    })
}

/// Caminho de sistema resolvido na descoberta (ex: `/dev/hidraw3`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePath(pub String);

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ──────────────────────────────────────────────
// Métrica
// ──────────────────────────────────────────────

/// Valor amostrado. A faixa semântica é 0–255, mas a fonte não limita:
/// o encoder mascara para 8 bits.
pub type Sample = i64;

/// Qual métrica é enviada ao display. Fixo durante a vida do processo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Temperature,
    CpuUtilization,
    RamUtilization,
}

impl Mode {
    /// Nome curto usado na CLI e no config.toml.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Temperature => "temp",
            Mode::CpuUtilization => "cpu",
            Mode::RamUtilization => "ram",
        }
    }

    /// Unidade exibida nos logs.
    pub fn unit(&self) -> &'static str {
        match self {
            Mode::Temperature => "°C",
            Mode::CpuUtilization | Mode::RamUtilization => "%",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temp" => Ok(Mode::Temperature),
            "cpu" => Ok(Mode::CpuUtilization),
            "ram" => Ok(Mode::RamUtilization),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_prefix() {
        assert_eq!(parse_hex_id("vendor_id", "aa88").unwrap(), 0xaa88);
        assert_eq!(parse_hex_id("vendor_id", "0xAA88").unwrap(), 0xaa88);
        assert_eq!(parse_hex_id("product_id", " 8666 ").unwrap(), 0x8666);
        assert_eq!(parse_hex_id("product_id", "1").unwrap(), 0x0001);
    }

    #[test]
    fn rejects_bad_hex() {
        for bad in ["", "0x", "zz88", "1aa88", "-1", "aa 88"] {
            assert!(
                matches!(
                    parse_hex_id("vendor_id", bad),
                    Err(ConfigError::InvalidHex { field: "vendor_id", .. })
                ),
                "deveria rejeitar '{bad}'"
            );
        }
    }

    #[test]
    fn identity_display_is_lower_hex() {
        assert_eq!(DeviceIdentity::default().to_string(), "aa88:8666");
        assert_eq!(DeviceIdentity::new(0x1, 0xBEEF).to_string(), "0001:beef");
    }

    #[test]
    fn mode_parse_and_display() {
        assert_eq!("temp".parse::<Mode>().unwrap(), Mode::Temperature);
        assert_eq!("CPU".parse::<Mode>().unwrap(), Mode::CpuUtilization);
        assert_eq!("ram".parse::<Mode>().unwrap(), Mode::RamUtilization);
        assert!(matches!("gpu".parse::<Mode>(), Err(ConfigError::InvalidMode(_))));
        assert_eq!(Mode::CpuUtilization.to_string(), "cpu");
        assert_eq!(Mode::default(), Mode::Temperature);
    }
}
