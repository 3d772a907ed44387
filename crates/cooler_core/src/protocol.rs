//! Protocolo HID do display.
//!
//! Formato do report de saída (fixo pelo firmware do dispositivo):
//!
//! ```text
//! ┌────────────┬───────────┬──────────────────────┐
//! │ Cmd(1)=0x00│ Valor(1)  │ Padding (62) = 0x00  │
//! └────────────┴───────────┴──────────────────────┘
//! ```
//!
//! - Byte 0: report ID / seletor de comando, sempre `0x00`
//! - Byte 1: valor amostrado mascarado para 8 bits
//! - Bytes 2–63: zeros exigidos pelo tamanho do report HID

use crate::types::Sample;

/// Tamanho fixo do report HID.
pub const PAYLOAD_SIZE: usize = 64;

/// Seletor de comando / report ID.
pub const COMMAND_SELECTOR: u8 = 0x00;

/// Posição do valor dentro do frame.
const VALUE_OFFSET: usize = 1;

/// Frame de 64 bytes pronto para escrita no dispositivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload([u8; PAYLOAD_SIZE]);

impl Payload {
    pub fn as_bytes(&self) -> &[u8; PAYLOAD_SIZE] {
        &self.0
    }

    /// Valor codificado no byte 1.
    pub fn value(&self) -> u8 {
        self.0[VALUE_OFFSET]
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Codifica uma amostra no frame HID.
///
/// Valores fora de 0–255 são truncados para os 8 bits menos significativos
/// (300 vira 44, -1 vira 255). É o comportamento esperado pelo firmware,
/// não um erro.
pub fn encode_payload(value: Sample) -> Payload {
    let mut frame = [0u8; PAYLOAD_SIZE];
    frame[0] = COMMAND_SELECTOR;
    frame[VALUE_OFFSET] = (value & 0xFF) as u8;
    Payload(frame)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
