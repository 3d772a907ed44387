//! Contrato de acesso ao dispositivo HID.
//!
//! A biblioteca HID concreta fica escondida atrás de [`DeviceBackend`] e
//! [`DeviceHandle`]; o transmissor só conhece descoberta, abertura, escrita
//! e fechamento.

use cooler_core::{DeviceError, DeviceIdentity, DevicePath, Payload};

/// Descoberta e abertura de dispositivos.
pub trait DeviceBackend {
    type Handle: DeviceHandle;

    /// Enumera os dispositivos conectados e retorna o caminho do primeiro
    /// que corresponde à identidade. Sempre enumera de novo: o caminho pode
    /// mudar depois de um replug.
    fn discover(&mut self, identity: DeviceIdentity) -> Result<DevicePath, DeviceError>;

    /// Abre uma conexão exclusiva com o caminho informado.
    fn open(&mut self, path: &DevicePath) -> Result<Self::Handle, DeviceError>;
}

/// Conexão aberta com um único dispositivo.
pub trait DeviceHandle {
    /// Escreve o frame de 64 bytes de forma síncrona.
    fn write(&mut self, payload: &Payload) -> Result<(), DeviceError>;

    /// Libera a conexão. Idempotente e nunca falha.
    fn close(&mut self);
}
