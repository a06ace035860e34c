use serde::{Deserialize, Serialize};
use std::fmt;

use vigil_core::{Result, VigilError};

/// 规范指标，与源模式中的实际列名无关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cpu,
    Memory,
    Disk,
    NetworkStatus,
}

impl Metric {
    /// 数值校验覆盖的必需指标；网络状态列可选
    pub const REQUIRED: [Metric; 3] = [Metric::Cpu, Metric::Memory, Metric::Disk];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Cpu => "cpu",
            Metric::Memory => "memory",
            Metric::Disk => "disk",
            Metric::NetworkStatus => "network_status",
        }
    }

    /// 报告中使用的标签
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU",
            Metric::Memory => "Memory",
            Metric::Disk => "Disk",
            Metric::NetworkStatus => "Network",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 已解析的实际列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub index: usize,
    pub name: String,
}

// 精确别名表（大小写不敏感）
const CPU_ALIASES: &[&str] = &["cpu", "cpu_usage", "cpu%", "cpu_pct", "usage_cpu"];
const MEMORY_ALIASES: &[&str] = &["memory", "mem", "memory_usage", "mem_pct", "memory%"];
const DISK_ALIASES: &[&str] = &["disk", "disk_usage", "disk_pct", "disk%"];

/// 规范指标到实际列的映射
///
/// 每次装载构建一次，之后只读。解析是确定性的：
/// 同一模式永远得到同一映射（模式序内首个命中生效）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMap {
    pub cpu: Option<ResolvedColumn>,
    pub memory: Option<ResolvedColumn>,
    pub disk: Option<ResolvedColumn>,
    pub network: Option<ResolvedColumn>,
}

impl ColumnMap {
    /// 解析记录模式
    ///
    /// 两段式：先精确别名匹配，再退化为规范词子串匹配；
    /// 两者皆无则未解析。未解析在此处从不报错。
    pub fn resolve(columns: &[String]) -> Self {
        Self {
            cpu: resolve_numeric(columns, CPU_ALIASES, "cpu"),
            memory: resolve_numeric(columns, MEMORY_ALIASES, "mem"),
            disk: resolve_numeric(columns, DISK_ALIASES, "disk"),
            network: resolve_status(columns),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<&ResolvedColumn> {
        match metric {
            Metric::Cpu => self.cpu.as_ref(),
            Metric::Memory => self.memory.as_ref(),
            Metric::Disk => self.disk.as_ref(),
            Metric::NetworkStatus => self.network.as_ref(),
        }
    }

    /// 模式中未解析出的必需指标
    pub fn missing_required(&self) -> Vec<Metric> {
        Metric::REQUIRED
            .iter()
            .copied()
            .filter(|m| self.get(*m).is_none())
            .collect()
    }

    /// 摘要与告警路径强制要求 cpu 列
    ///
    /// 这是列解析唯一的硬失败出口；memory / disk / network 缺失
    /// 只会让对应结果缺省。
    pub fn require_cpu(&self) -> Result<&ResolvedColumn> {
        self.cpu
            .as_ref()
            .ok_or_else(|| VigilError::MissingRequiredColumn("cpu".to_string()))
    }
}

fn resolve_numeric(columns: &[String], aliases: &[&str], token: &str) -> Option<ResolvedColumn> {
    columns
        .iter()
        .position(|c| aliases.contains(&c.to_lowercase().as_str()))
        .or_else(|| columns.iter().position(|c| c.to_lowercase().contains(token)))
        .map(|index| ResolvedColumn {
            index,
            name: columns[index].clone(),
        })
}

fn resolve_status(columns: &[String]) -> Option<ResolvedColumn> {
    // 名为 status 或包含 network 的列
    columns
        .iter()
        .position(|c| {
            let lower = c.to_lowercase();
            lower == "status" || lower.contains("network")
        })
        .map(|index| ResolvedColumn {
            index,
            name: columns[index].clone(),
        })
}
