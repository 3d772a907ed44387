//! Fonte de métricas do host via `sysinfo`.
//!
//! - Temperatura: grupo de sensores preferido (ex: `k10temp`), com fallback
//!   para a primeira leitura do primeiro grupo disponível
//! - CPU: uso global medido numa janela curta (~200 ms)
//! - RAM: percentual de memória física em uso

use cooler_core::{Mode, Sample, SensorError};
use std::time::Duration;
use sysinfo::{Components, CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tracing::debug;

/// Fonte das três métricas suportadas.
///
/// Os valores já chegam truncados para inteiro, mas sem limite de faixa.
pub trait MetricSource {
    fn read_temperature(&mut self) -> Result<Sample, SensorError>;
    fn read_cpu_utilization(&mut self) -> Sample;
    fn read_ram_utilization(&mut self) -> Sample;

    /// Lê a métrica correspondente ao modo configurado.
    fn sample(&mut self, mode: Mode) -> Result<Sample, SensorError> {
        match mode {
            Mode::Temperature => self.read_temperature(),
            Mode::CpuUtilization => Ok(self.read_cpu_utilization()),
            Mode::RamUtilization => Ok(self.read_ram_utilization()),
        }
    }
}

/// Uma leitura de temperatura com o grupo (chip) a que pertence.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub group: String,
    pub celsius: f32,
}

impl SensorReading {
    /// Monta a leitura a partir do label do sysinfo.
    ///
    /// No Linux o label é `"<chip> <sensor>"` (ex: `"k10temp Tctl"`); a
    /// primeira palavra identifica o grupo.
    pub fn from_label(label: &str, celsius: f32) -> Self {
        let group = label.split_whitespace().next().unwrap_or_default();
        Self {
            group: group.to_string(),
            celsius,
        }
    }
}

/// Escolhe a temperatura: primeira leitura do grupo preferido, senão a
/// primeira leitura disponível em ordem de enumeração.
pub fn pick_temperature(readings: &[SensorReading], preferred: &str) -> Option<f32> {
    readings
        .iter()
        .find(|r| r.group.eq_ignore_ascii_case(preferred))
        .or_else(|| readings.first())
        .map(|r| r.celsius)
}

/// Monitor de hardware baseado em `sysinfo`.
pub struct HardwareMonitor {
    sys: System,
    components: Components,
    preferred_sensor: String,
    cpu_window: Duration,
}

impl HardwareMonitor {
    pub fn new(preferred_sensor: impl Into<String>, cpu_window: Duration) -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );

        Self {
            sys,
            components: Components::new_with_refreshed_list(),
            preferred_sensor: preferred_sensor.into(),
            // Abaixo do mínimo o sysinfo devolve uso zerado ou lixo
            cpu_window: cpu_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    fn temperature_readings(&self) -> Vec<SensorReading> {
        self.components
            .iter()
            .filter_map(|comp| {
                let celsius = comp.temperature()?;
                if celsius.is_finite() {
                    Some(SensorReading::from_label(comp.label(), celsius))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl MetricSource for HardwareMonitor {
    fn read_temperature(&mut self) -> Result<Sample, SensorError> {
        self.components.refresh(true);
        let readings = self.temperature_readings();

        let temp = pick_temperature(&readings, &self.preferred_sensor).ok_or_else(|| {
            SensorError::Unavailable("nenhum sensor de temperatura encontrado".into())
        })?;

        debug!("Temperatura: {temp:.1}°C ({} leituras)", readings.len());
        Ok(temp as Sample)
    }

    fn read_cpu_utilization(&mut self) -> Sample {
        self.sys.refresh_cpu_usage();
        std::thread::sleep(self.cpu_window);
        self.sys.refresh_cpu_usage();
        self.sys.global_cpu_usage() as Sample
    }

    fn read_ram_utilization(&mut self) -> Sample {
        self.sys.refresh_memory();
        let total = self.sys.total_memory() as f64;
        let used = self.sys.used_memory() as f64;
        if total > 0.0 {
            (used / total * 100.0) as Sample
        } else {
            0
        }
    }
}
