//! Transmissor com reconexão automática.
//!
//! Máquina de estados de dois estados:
//!
//! ```text
//!                 discover + open OK
//!  Disconnected ─────────────────────────▶ Connected ──┐ sample + write OK
//!       ▲                                      │  ◀────┘
//!       └──── falha de sensor/escrita ─────────┘ (close antes da transição)
//! ```
//!
//! Nenhuma falha de dispositivo ou sensor é fatal: tudo vira log + transição
//! de estado, e o próximo ciclo tenta de novo.

use crate::device::{DeviceBackend, DeviceHandle};
use crate::monitor::MetricSource;
use cooler_core::{CycleError, DeviceError, DeviceIdentity, Mode, Payload, encode_payload};
use tracing::{debug, info, warn};

/// Estado da conexão. O handle só existe dentro de `Connected`.
enum LinkState<H> {
    Disconnected,
    Connected(H),
}

/// Resultado de um ciclo de transmissão.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Frame escrito com sucesso.
    Sent(Payload),
    /// Dispositivo ausente ou não abriu; ciclo encerrado sem amostra.
    DeviceUnavailable(DeviceError),
    /// Falha de sensor ou escrita com o dispositivo conectado.
    Failed(CycleError),
}

/// Dono exclusivo do handle do dispositivo.
pub struct Transmitter<B: DeviceBackend, S: MetricSource> {
    backend: B,
    source: S,
    identity: DeviceIdentity,
    mode: Mode,
    link: LinkState<B::Handle>,
    /// Descobertas falhas seguidas desde a última conexão
    misses: u64,
}

impl<B: DeviceBackend, S: MetricSource> Transmitter<B, S> {
    pub fn new(backend: B, source: S, identity: DeviceIdentity, mode: Mode) -> Self {
        Self {
            backend,
            source,
            identity,
            mode,
            link: LinkState::Disconnected,
            misses: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, LinkState::Connected(_))
    }

    /// Executa um ciclo: garante conexão, amostra, codifica e escreve.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        if let Err(e) = self.ensure_connected() {
            return CycleOutcome::DeviceUnavailable(e);
        }

        let identity = self.identity;
        let result = match &mut self.link {
            LinkState::Connected(handle) => transmit(&mut self.source, self.mode, handle),
            LinkState::Disconnected => {
                return CycleOutcome::DeviceUnavailable(DeviceError::NotFound {
                    identity: identity.to_string(),
                });
            }
        };

        match result {
            Ok(payload) => {
                debug!(
                    "📤 {} enviado: {}{}",
                    self.mode,
                    payload.value(),
                    self.mode.unit()
                );
                CycleOutcome::Sent(payload)
            }
            Err(e) => {
                warn!("⚠️ Erro no ciclo ({}): {e}", e.kind());
                self.disconnect();
                CycleOutcome::Failed(e)
            }
        }
    }

    /// Encerramento ordenado: fecha o handle se estiver conectado.
    pub fn shutdown(&mut self) {
        if self.is_connected() {
            self.disconnect();
        }
    }

    fn ensure_connected(&mut self) -> Result<(), DeviceError> {
        if self.is_connected() {
            return Ok(());
        }

        let opened = self
            .backend
            .discover(self.identity)
            .and_then(|path| self.backend.open(&path).map(|handle| (path, handle)));

        match opened {
            Ok((path, handle)) => {
                info!("✅ HID {} conectado via {path}", self.identity);
                self.link = LinkState::Connected(handle);
                self.misses = 0;
                Ok(())
            }
            Err(e) => {
                self.misses += 1;
                // Dispositivo ausente por muito tempo: só o primeiro aviso em warn
                if self.misses == 1 || !matches!(e, DeviceError::NotFound { .. }) {
                    warn!("❌ {} ({}) – nova tentativa no próximo ciclo", e, e.kind());
                } else {
                    debug!("{e} (tentativa {})", self.misses);
                }
                Err(e)
            }
        }
    }

    /// Fecha o handle (best-effort) e volta para `Disconnected`.
    fn disconnect(&mut self) {
        if let LinkState::Connected(mut handle) =
            std::mem::replace(&mut self.link, LinkState::Disconnected)
        {
            handle.close();
            info!("🔌 HID {} desconectado", self.identity);
        }
    }
}

fn transmit<S: MetricSource, H: DeviceHandle>(
    source: &mut S,
    mode: Mode,
    handle: &mut H,
) -> Result<Payload, CycleError> {
    let value = source.sample(mode)?;
    let payload = encode_payload(value);
    handle.write(&payload)?;
    Ok(payload)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod mock {
    //! Dispositivo e fonte de métricas falsos, compartilhados com os testes
    //! do scheduler.

    use super::*;
    use crate::scheduler::CancelHandle;
    use cooler_core::{DevicePath, Sample, SensorError};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Default)]
    pub struct DeviceLog {
        /// Dispositivo presente na enumeração
        pub present: bool,
        /// Próximas aberturas falham
        pub open_fails: bool,
        /// Próxima escrita falha (consumido)
        pub fail_next_write: bool,
        pub discover_calls: usize,
        pub open_calls: usize,
        pub close_calls: usize,
        pub writes: Vec<Payload>,
        /// Cancela depois de N escritas
        pub cancel_after: Option<(usize, CancelHandle)>,
    }

    pub type SharedLog = Rc<RefCell<DeviceLog>>;

    pub struct MockBackend {
        pub log: SharedLog,
    }

    pub struct MockHandle {
        log: SharedLog,
    }

    impl DeviceBackend for MockBackend {
        type Handle = MockHandle;

        fn discover(&mut self, identity: DeviceIdentity) -> Result<DevicePath, DeviceError> {
            let mut log = self.log.borrow_mut();
            log.discover_calls += 1;
            if log.present {
                Ok(DevicePath(format!("/dev/hidraw{}", log.discover_calls)))
            } else {
                Err(DeviceError::NotFound {
                    identity: identity.to_string(),
                })
            }
        }

        fn open(&mut self, path: &DevicePath) -> Result<MockHandle, DeviceError> {
            let mut log = self.log.borrow_mut();
            log.open_calls += 1;
            if log.open_fails {
                return Err(DeviceError::OpenFailed {
                    path: path.to_string(),
                    reason: "Permission denied".into(),
                });
            }
            Ok(MockHandle {
                log: Rc::clone(&self.log),
            })
        }
    }

    impl DeviceHandle for MockHandle {
        fn write(&mut self, payload: &Payload) -> Result<(), DeviceError> {
            let mut log = self.log.borrow_mut();
            if log.fail_next_write {
                log.fail_next_write = false;
                return Err(DeviceError::WriteFailed("No such device".into()));
            }
            log.writes.push(*payload);
            if let Some((after, cancel)) = &log.cancel_after {
                if log.writes.len() >= *after {
                    cancel.cancel();
                }
            }
            Ok(())
        }

        fn close(&mut self) {
            self.log.borrow_mut().close_calls += 1;
        }
    }

    /// Fonte com valores roteirizados; repete o último quando acaba.
    pub struct ScriptedSource {
        pub values: VecDeque<Result<Sample, SensorError>>,
        last: Result<Sample, SensorError>,
    }

    impl ScriptedSource {
        pub fn new(values: impl IntoIterator<Item = Result<Sample, SensorError>>) -> Self {
            Self {
                values: values.into_iter().collect(),
                last: Ok(0),
            }
        }

        pub fn constant(value: Sample) -> Self {
            Self::new([Ok(value)])
        }

        fn next(&mut self) -> Result<Sample, SensorError> {
            if let Some(v) = self.values.pop_front() {
                self.last = v;
            }
            self.last.clone()
        }
    }

    impl MetricSource for ScriptedSource {
        fn read_temperature(&mut self) -> Result<Sample, SensorError> {
            self.next()
        }
        fn read_cpu_utilization(&mut self) -> Sample {
            self.next().unwrap_or_default()
        }
        fn read_ram_utilization(&mut self) -> Sample {
            self.next().unwrap_or_default()
        }
    }

    pub fn device(present: bool) -> (MockBackend, SharedLog) {
        let log = Rc::new(RefCell::new(DeviceLog {
            present,
            ..Default::default()
        }));
        (
            MockBackend {
                log: Rc::clone(&log),
            },
            log,
        )
    }
}
