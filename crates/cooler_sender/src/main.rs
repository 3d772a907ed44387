//! # Cooler Display Sender
//!
//! Amostra temperatura da CPU, uso de CPU ou uso de RAM e envia o valor
//! para o display USB HID do water cooler a cada intervalo.
//!
//! O dispositivo pode ser plugado depois do start, desplugado ou replugado
//! a qualquer momento: falhas de dispositivo nunca encerram o processo.
//! Só SIGINT/SIGTERM (saída 0) ou configuração inválida (saída != 0).
//!
//! ## Uso
//! ```bash
//! cooler_sender                              # temp, aa88:8666, 1s
//! cooler_sender --mode cpu --interval 0.5
//! cooler_sender --vendor-id 1e71 --product-id 3008
//! cooler_sender --list-devices
//! ```
//!
//! No Linux o acesso a `/dev/hidraw*` normalmente exige uma regra udev ou
//! execução como root.

mod cli;
mod device;
mod hid_device;
mod monitor;
mod scheduler;
mod shutdown;
mod transmitter;

use clap::Parser;
use cli::Cli;
use cooler_core::config::{AppConfig, Settings};
use hid_device::HidBackend;
use monitor::HardwareMonitor;
use scheduler::{CancelToken, RunSummary, Scheduler, cancellation};
use std::process::ExitCode;
use std::thread::JoinHandle;
use transmitter::Transmitter;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // ── Logging (stderr) ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        return list_devices();
    }

    // ── Carregar config ──
    let config_path = cli.config_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let settings = match cli.apply(config).resolve() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    print_banner(&settings);

    // ── Thread de transmissão ──
    let (cancel, token) = cancellation();
    let worker = match spawn_transmitter(settings, token) {
        Ok(worker) => worker,
        Err(e) => {
            error!("Falha ao criar thread de transmissão: {e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Loop principal: só espera o sinal de encerramento ──
    if let Err(e) = shutdown::block_until_signal() {
        error!("Falha ao instalar handler de sinais: {e}");
        cancel.cancel();
        let _ = worker.join();
        return ExitCode::FAILURE;
    }

    info!("⏹️ Encerrando...");
    cancel.cancel();

    match worker.join() {
        Ok(summary) => {
            info!("Encerrado após {} ciclos ({} envios)", summary.cycles, summary.sent);
            ExitCode::SUCCESS
        }
        Err(_) => {
            error!("Thread de transmissão terminou com pânico");
            ExitCode::FAILURE
        }
    }
}

/// Inicia a thread que possui o dispositivo HID. Nada fora dela toca no handle.
fn spawn_transmitter(
    settings: Settings,
    token: CancelToken,
) -> std::io::Result<JoinHandle<RunSummary>> {
    std::thread::Builder::new()
        .name("hid-transmitter".into())
        .spawn(move || {
            let source = HardwareMonitor::new(settings.preferred_sensor, settings.cpu_sample_window);
            let mut transmitter =
                Transmitter::new(HidBackend::new(), source, settings.identity, settings.mode);
            Scheduler::new(settings.interval).run(&mut transmitter, &token)
        })
}

fn list_devices() -> ExitCode {
    match HidBackend::new().list_devices() {
        Ok(devices) => {
            if devices.is_empty() {
                println!("Nenhum dispositivo HID encontrado");
            }
            for d in devices {
                println!(
                    "{:04x}:{:04x}  {}  {} {}",
                    d.vendor_id, d.product_id, d.path, d.manufacturer, d.product
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn print_banner(settings: &Settings) {
    eprintln!();
    eprintln!("══════════════════════════════════════════════");
    eprintln!("   ⚡ COOLER DISPLAY SENDER – ATIVO (Rust)");
    eprintln!("══════════════════════════════════════════════");
    eprintln!("  Dispositivo: {}", settings.identity);
    eprintln!("  Modo:        {} ({})", settings.mode, settings.mode.unit());
    eprintln!("  Intervalo:   {:.2}s", settings.interval.as_secs_f64());
    eprintln!("══════════════════════════════════════════════");
    eprintln!();
}
