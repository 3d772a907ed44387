//! # Cooler Core
//!
//! Crate compartilhada com os tipos, o protocolo HID de 64 bytes, a
//! configuração TOML e os erros do Cooler Display Sender.
//!
//! ## Módulos
//! - [`types`] – Identidade do dispositivo, modo e amostra
//! - [`protocol`] – Encoder do report HID
//! - [`config`] – Configuração unificada via TOML
//! - [`error`] – Taxonomia de erros

pub mod types;
pub mod protocol;
pub mod config;
pub mod error;

// Re-exports convenientes
pub use types::{DeviceIdentity, DevicePath, Mode, Sample};
pub use protocol::{encode_payload, Payload, PAYLOAD_SIZE};
pub use config::{AppConfig, Settings};
pub use error::{ConfigError, CycleError, DeviceError, SensorError};
