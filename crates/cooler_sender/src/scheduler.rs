//! Execução periódica do transmissor com cancelamento cooperativo.
//!
//! O intervalo é medido entre inícios de ciclo. Um ciclo que estoura o
//! intervalo faz o próximo começar imediatamente, sem sobreposição. O
//! cancelamento é verificado entre ciclos, nunca no meio de uma escrita.

use crate::device::DeviceBackend;
use crate::monitor::MetricSource;
use crate::transmitter::{CycleOutcome, Transmitter};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::info;

/// Lado que solicita o cancelamento. Dropar todos os handles também cancela.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    /// Solicita o encerramento. Chamadas repetidas são ignoradas.
    pub fn cancel(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Lado observado pelo scheduler. Uma vez cancelado, continua cancelado.
#[derive(Debug)]
pub struct CancelToken {
    rx: Receiver<()>,
    cancelled: Cell<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.get() {
            return true;
        }
        match self.rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => self.latch(),
            Err(TryRecvError::Empty) => false,
        }
    }

    /// Espera até `timeout` ou até o cancelamento. Retorna `true` se cancelado.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.cancelled.get() {
            return true;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => self.latch(),
            Err(RecvTimeoutError::Timeout) => false,
        }
    }

    // O sinal do canal é consumido na leitura; o estado fica guardado aqui.
    fn latch(&self) -> bool {
        self.cancelled.set(true);
        true
    }
}

/// Cria o par handle/token de cancelamento.
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = bounded(1);
    (
        CancelHandle { tx },
        CancelToken {
            rx,
            cancelled: Cell::new(false),
        },
    )
}

/// Estatísticas de uma execução, logadas no encerramento.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub sent: u64,
    pub unavailable: u64,
    pub failed: u64,
    /// Último valor escrito no display
    pub last_value: Option<u8>,
    /// Tipo do último erro observado
    pub last_error: Option<&'static str>,
}

impl RunSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Sent(payload) => {
                self.sent += 1;
                self.last_value = Some(payload.value());
            }
            CycleOutcome::DeviceUnavailable(e) => {
                self.unavailable += 1;
                self.last_error = Some(e.kind());
            }
            CycleOutcome::Failed(e) => {
                self.failed += 1;
                self.last_error = Some(e.kind());
            }
        }
    }
}

pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Roda ciclos até o cancelamento e então encerra o transmissor.
    pub fn run<B, S>(&self, transmitter: &mut Transmitter<B, S>, cancel: &CancelToken) -> RunSummary
    where
        B: DeviceBackend,
        S: MetricSource,
    {
        let mut summary = RunSummary::default();

        while !cancel.is_cancelled() {
            let cycle_start = Instant::now();

            let outcome = transmitter.run_cycle();
            summary.record(&outcome);

            // Dormir pelo tempo restante do intervalo
            let remaining = self.interval.saturating_sub(cycle_start.elapsed());
            if cancel.wait(remaining) {
                break;
            }
        }

        transmitter.shutdown();
        info!(
            "Scheduler encerrado: {} ciclos, {} enviados, {} sem dispositivo, {} falhas (último erro: {})",
            summary.cycles,
            summary.sent,
            summary.unavailable,
            summary.failed,
            summary.last_error.unwrap_or("nenhum")
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transmitter::mock::*;
    use cooler_core::{DeviceIdentity, Mode};

    const TICK: Duration = Duration::from_millis(5);

    fn transmitter(
        backend: MockBackend,
        value: i64,
    ) -> Transmitter<MockBackend, ScriptedSource> {
        Transmitter::new(
            backend,
            ScriptedSource::constant(value),
            DeviceIdentity::default(),
            Mode::CpuUtilization,
        )
    }

    #[test]
    fn cancel_before_start_runs_no_cycle() {
        let (backend, log) = device(true);
        let mut tx = transmitter(backend, 10);
        let (handle, token) = cancellation();
        handle.cancel();

        let summary = Scheduler::new(TICK).run(&mut tx, &token);
        assert_eq!(summary.cycles, 0);
        assert_eq!(log.borrow().discover_calls, 0);
    }

    #[test]
    fn cancel_while_connected_closes_once_and_stops_writing() {
        let (backend, log) = device(true);
        let (handle, token) = cancellation();
        log.borrow_mut().cancel_after = Some((3, handle.clone()));
        let mut tx = transmitter(backend, 87);

        let summary = Scheduler::new(TICK).run(&mut tx, &token);

        let log = log.borrow();
        assert_eq!(log.writes.len(), 3, "nenhuma escrita após o cancelamento");
        assert_eq!(log.close_calls, 1);
        assert!(!tx.is_connected());
        assert_eq!(summary.sent, 3);
        assert!(log.writes.iter().all(|p| p.value() == 87));
        assert_eq!(summary.last_value, Some(87));
        assert_eq!(summary.last_error, None);
        drop(handle);
    }

    #[test]
    fn dropping_every_handle_cancels() {
        let (backend, log) = device(false);
        let mut tx = transmitter(backend, 1);
        let (handle, token) = cancellation();
        drop(handle);

        let summary = Scheduler::new(TICK).run(&mut tx, &token);
        assert_eq!(summary.cycles, 0);
        assert_eq!(log.borrow().close_calls, 0);
    }

    #[test]
    fn cancel_interrupts_long_wait() {
        let (backend, _log) = device(false);
        let mut tx = transmitter(backend, 1);
        let (handle, token) = cancellation();

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            handle.cancel();
        });

        let start = Instant::now();
        let summary = Scheduler::new(Duration::from_secs(30)).run(&mut tx, &token);
        canceller.join().unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.unavailable, 1);
        assert_eq!(summary.last_error, Some("DeviceNotFound"));
    }

    #[test]
    fn keeps_retrying_while_device_is_missing() {
        let (backend, log) = device(false);
        let (handle, token) = cancellation();
        let mut tx = transmitter(backend, 1);

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(60));
            handle.cancel();
        });

        let summary = Scheduler::new(TICK).run(&mut tx, &token);
        canceller.join().unwrap();

        assert!(summary.cycles >= 2, "ciclos: {}", summary.cycles);
        assert_eq!(summary.unavailable, summary.cycles);
        assert_eq!(log.borrow().discover_calls as u64, summary.cycles);
        assert_eq!(log.borrow().writes.len(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let (handle, token) = cancellation();
        handle.cancel();
        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancellation_stays_observed_while_handle_is_alive() {
        let (handle, token) = cancellation();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
        assert!(token.is_cancelled(), "cancelamento não pode ser perdido");

        handle.cancel();
        handle.cancel();
        assert!(token.is_cancelled());
        let start = Instant::now();
        assert!(token.wait(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(5));
        drop(handle);
    }

    #[test]
    fn wait_observation_is_kept_for_later_checks() {
        let (handle, token) = cancellation();
        handle.cancel();
        assert!(token.wait(Duration::from_millis(10)));
        assert!(token.is_cancelled());
        drop(handle);
    }
}
