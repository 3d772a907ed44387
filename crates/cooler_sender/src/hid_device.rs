//! Implementação de [`DeviceBackend`] sobre `hidapi`.
//!
//! O contexto `HidApi` é criado sob demanda na thread do transmissor e
//! recriado se a inicialização falhar. Antes de cada descoberta a lista de
//! dispositivos é atualizada, então um display plugado depois do start é
//! encontrado no ciclo seguinte.

use crate::device::{DeviceBackend, DeviceHandle};
use cooler_core::{DeviceError, DeviceIdentity, DevicePath, PAYLOAD_SIZE, Payload};
use hidapi::{HidApi, HidDevice};
use std::ffi::CString;
use tracing::{debug, warn};

/// Informações de um dispositivo HID enumerado (para `--list-devices`).
#[derive(Debug, Clone)]
pub struct HidDeviceSummary {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: String,
    pub product: String,
    pub manufacturer: String,
}

/// Backend HID real.
#[derive(Default)]
pub struct HidBackend {
    api: Option<HidApi>,
}

impl HidBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retorna o contexto `HidApi` com a lista de dispositivos atualizada.
    fn api(&mut self) -> Result<&mut HidApi, String> {
        if let Some(api) = self.api.as_mut() {
            if let Err(e) = api.refresh_devices() {
                warn!("Falha ao atualizar lista HID: {e}");
            }
        } else {
            let api = HidApi::new().map_err(|e| format!("falha ao inicializar hidapi: {e}"))?;
            self.api = Some(api);
        }

        self.api
            .as_mut()
            .ok_or_else(|| "contexto hidapi indisponível".to_string())
    }

    /// Lista todos os dispositivos HID visíveis.
    pub fn list_devices(&mut self) -> Result<Vec<HidDeviceSummary>, String> {
        let api = self.api()?;
        Ok(api
            .device_list()
            .map(|info| HidDeviceSummary {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                path: info.path().to_string_lossy().into_owned(),
                product: info.product_string().unwrap_or_default().to_string(),
                manufacturer: info.manufacturer_string().unwrap_or_default().to_string(),
            })
            .collect())
    }
}

impl DeviceBackend for HidBackend {
    type Handle = HidHandle;

    fn discover(&mut self, identity: DeviceIdentity) -> Result<DevicePath, DeviceError> {
        let api = match self.api() {
            Ok(api) => api,
            Err(e) => return Err(init_failed(identity, &e)),
        };

        api.device_list()
            .find(|info| identity.matches(info.vendor_id(), info.product_id()))
            .map(|info| DevicePath(info.path().to_string_lossy().into_owned()))
            .ok_or_else(|| DeviceError::NotFound {
                identity: identity.to_string(),
            })
    }

    fn open(&mut self, path: &DevicePath) -> Result<HidHandle, DeviceError> {
        let open_failed = |reason: String| DeviceError::OpenFailed {
            path: path.to_string(),
            reason,
        };

        let c_path = CString::new(path.0.as_str()).map_err(|e| open_failed(e.to_string()))?;
        let api = self.api().map_err(open_failed)?;
        let device = api
            .open_path(&c_path)
            .map_err(|e| open_failed(e.to_string()))?;

        Ok(HidHandle {
            device: Some(device),
        })
    }
}

/// Sem contexto hidapi nenhum dispositivo é visível. A causa vai para o log
/// em `warn`, já que o erro devolvido só diz "não encontrado".
fn init_failed(identity: DeviceIdentity, reason: &str) -> DeviceError {
    warn!("⚠️ HID indisponível ao procurar {identity}: {reason}");
    DeviceError::NotFound {
        identity: identity.to_string(),
    }
}

/// Conexão HID aberta. O `HidDevice` é liberado no `close` (ou no drop).
pub struct HidHandle {
    device: Option<HidDevice>,
}

impl DeviceHandle for HidHandle {
    fn write(&mut self, payload: &Payload) -> Result<(), DeviceError> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| DeviceError::WriteFailed("handle já fechado".into()))?;

        match device.write(payload.as_bytes()) {
            Ok(0) => Err(DeviceError::WriteFailed("nenhum byte escrito".into())),
            Ok(written) => {
                if written < PAYLOAD_SIZE {
                    // Alguns backends descontam o report ID 0x00 da contagem
                    debug!("HID write parcial: {written}/{PAYLOAD_SIZE} bytes");
                }
                Ok(())
            }
            Err(e) => Err(DeviceError::WriteFailed(e.to_string())),
        }
    }

    fn close(&mut self) {
        // Drop do HidDevice fecha o descritor
        self.device.take();
    }
}
