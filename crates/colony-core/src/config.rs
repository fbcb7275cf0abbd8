//! Coordination configuration loading and management.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ColonyError, Result};

/// Main configuration, usually loaded from `colony.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Config version
    pub version: Option<String>,

    /// CPU budgeting and fairness
    pub scheduler: SchedulerConfig,

    /// Task generation
    pub tasks: TaskConfig,

    /// Movement request bookkeeping
    pub movement: MovementConfig,

    /// Traffic heatmap bounds and decay
    pub traffic: TrafficConfig,

    /// Road placement
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Fraction of the CPU limit task execution may consume.
    #[serde(default = "default_cpu_threshold")]
    pub cpu_threshold: f64,

    /// Ticks without execution before an agent counts as starved.
    #[serde(default = "default_starvation_ticks")]
    pub starvation_ticks: u64,
}

fn default_cpu_threshold() -> f64 {
    0.8
}
fn default_starvation_ticks() -> u64 {
    5
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cpu_threshold: default_cpu_threshold(),
            starvation_ticks: default_starvation_ticks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default = "default_harvest_slots")]
    pub harvest_slots_per_source: usize,

    #[serde(default = "default_build_slots")]
    pub build_slots_per_site: usize,

    #[serde(default = "default_upgrade_slots")]
    pub upgrade_slots: usize,

    /// Expiry horizon for ordinary tasks.
    #[serde(default = "default_task_ttl")]
    pub task_ttl: u64,

    /// Expiry horizon for tasks on perishable targets (dropped resources).
    #[serde(default = "default_perishable_ttl")]
    pub perishable_ttl: u64,

    /// Walls and ramparts are only repaired up to this many hits.
    #[serde(default = "default_wall_repair_target")]
    pub wall_repair_target: u32,

    /// Containers below this much energy are not offered as withdraw targets.
    #[serde(default = "default_withdraw_min_energy")]
    pub withdraw_min_energy: u32,
}

fn default_harvest_slots() -> usize {
    2
}
fn default_build_slots() -> usize {
    2
}
fn default_upgrade_slots() -> usize {
    2
}
fn default_task_ttl() -> u64 {
    150
}
fn default_perishable_ttl() -> u64 {
    30
}
fn default_wall_repair_target() -> u32 {
    10_000
}
fn default_withdraw_min_energy() -> u32 {
    50
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            harvest_slots_per_source: default_harvest_slots(),
            build_slots_per_site: default_build_slots(),
            upgrade_slots: default_upgrade_slots(),
            task_ttl: default_task_ttl(),
            perishable_ttl: default_perishable_ttl(),
            wall_repair_target: default_wall_repair_target(),
            withdraw_min_energy: default_withdraw_min_energy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Requests older than this are purged whether or not they were satisfied.
    #[serde(default = "default_max_request_age")]
    pub max_request_age: u64,
}

fn default_max_request_age() -> u64 {
    100
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_request_age: default_max_request_age(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficConfig {
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,

    /// Entries that decay below this are removed.
    #[serde(default = "default_cleanup_threshold")]
    pub cleanup_threshold: f64,

    /// Ticks between decay passes.
    #[serde(default = "default_decay_interval")]
    pub decay_interval: u64,

    #[serde(default = "default_max_total_positions")]
    pub max_total_positions: usize,

    #[serde(default = "default_max_positions_per_region")]
    pub max_positions_per_region: usize,

    /// Fill fraction of the global cap that triggers aggressive decay.
    #[serde(default = "default_pressure_fraction")]
    pub pressure_fraction: f64,

    /// Multiplied into `decay_rate` under memory pressure.
    #[serde(default = "default_aggressive_decay_factor")]
    pub aggressive_decay_factor: f64,

    /// Fill fraction of the global cap that is logged as a warning.
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: f64,
}

fn default_decay_rate() -> f64 {
    0.98
}
fn default_cleanup_threshold() -> f64 {
    1.0
}
fn default_decay_interval() -> u64 {
    10
}
fn default_max_total_positions() -> usize {
    2000
}
fn default_max_positions_per_region() -> usize {
    500
}
fn default_pressure_fraction() -> f64 {
    0.8
}
fn default_aggressive_decay_factor() -> f64 {
    0.9
}
fn default_high_water_mark() -> f64 {
    0.9
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            decay_rate: default_decay_rate(),
            cleanup_threshold: default_cleanup_threshold(),
            decay_interval: default_decay_interval(),
            max_total_positions: default_max_total_positions(),
            max_positions_per_region: default_max_positions_per_region(),
            pressure_fraction: default_pressure_fraction(),
            aggressive_decay_factor: default_aggressive_decay_factor(),
            high_water_mark: default_high_water_mark(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Candidates scoring below this are never placed.
    #[serde(default = "default_min_value")]
    pub min_value: f64,

    /// Construction placements per planning pass.
    #[serde(default = "default_placements_per_pass")]
    pub placements_per_pass: usize,

    /// Ticks between planning passes.
    #[serde(default = "default_plan_interval")]
    pub plan_interval: u64,

    /// Failed placements at one cell before a warning is logged.
    #[serde(default = "default_placement_failure_warn")]
    pub placement_failure_warn: u32,
}

fn default_min_value() -> f64 {
    20.0
}
fn default_placements_per_pass() -> usize {
    1
}
fn default_plan_interval() -> u64 {
    100
}
fn default_placement_failure_warn() -> u32 {
    3
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            placements_per_pass: default_placements_per_pass(),
            plan_interval: default_plan_interval(),
            placement_failure_warn: default_placement_failure_warn(),
        }
    }
}

impl ColonyConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ColonyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ColonyError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ColonyError::ConfigEncode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_fields() {
        let config: ColonyConfig = serde_yaml::from_str(
            "scheduler:\n  cpu_threshold: 0.5\ntraffic:\n  max_total_positions: 64\n",
        )
        .unwrap();

        assert_eq!(config.scheduler.cpu_threshold, 0.5);
        assert_eq!(config.scheduler.starvation_ticks, 5);
        assert_eq!(config.traffic.max_total_positions, 64);
        assert_eq!(config.traffic.max_positions_per_region, 500);
        assert_eq!(config.tasks, TaskConfig::default());
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let mut config = ColonyConfig::default();
        config.planner.placements_per_pass = 3;
        let yaml = config.to_yaml().unwrap();
        let back: ColonyConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
