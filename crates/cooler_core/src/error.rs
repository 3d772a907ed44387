//! Taxonomia de erros do sender.
//!
//! Só [`ConfigError`] é fatal. Os demais são recuperáveis e tratados dentro
//! do ciclo do transmissor.

use thiserror::Error;

/// Falha ao ler uma métrica do host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("Nenhum sensor disponível: {0}")]
    Unavailable(String),
}

/// Falhas de descoberta, abertura ou escrita no dispositivo HID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("Dispositivo HID {identity} não encontrado")]
    NotFound { identity: String },

    #[error("Falha ao abrir {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Falha na escrita HID: {0}")]
    WriteFailed(String),
}

impl DeviceError {
    /// Nome curto do tipo de erro, usado nos logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceError::NotFound { .. } => "DeviceNotFound",
            DeviceError::OpenFailed { .. } => "OpenFailed",
            DeviceError::WriteFailed(_) => "WriteFailed",
        }
    }
}

/// Erro de um ciclo de transmissão já conectado.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl CycleError {
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Sensor(_) => "SensorUnavailable",
            CycleError::Device(e) => e.kind(),
        }
    }
}

/// Configuração inválida na inicialização (fatal).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ID hexadecimal inválido para {field}: '{value}' (esperado 16 bits, ex: aa88)")]
    InvalidHex { field: &'static str, value: String },

    #[error("Modo inválido: '{0}' (use temp, cpu ou ram)")]
    InvalidMode(String),

    #[error("Configuração inválida: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
