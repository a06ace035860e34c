use serde::{Deserialize, Serialize};
use tracing::info;

use crate::schema::Metric;
use crate::summary::SummaryReport;
use vigil_config::Thresholds;

/// cpu 固定严重界限（百分比）
///
/// 与可调的警告阈值相互独立：管理员把 cpu 警告阈值调到 90 以上
/// 也不会豁免此界限触发的强制通知。
pub const CPU_CRITICAL_BOUND: f64 = 90.0;

/// 告警级别：任何越界都可执行，严重级别额外强制外发通知
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// 一次评估产出的告警事件
///
/// 由告警评估器产出，立即被通知调度与报告渲染消费，核心不持久化。
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub metric: Metric,
    pub threshold_breached: f64,
    pub count: u64,
    pub severity: AlertSeverity,
}

/// 评估聚合摘要，产出告警事件
///
/// 每个告警计数非零的指标一条事件，携带被突破的配置阈值；
/// cpu 超过固定严重界限时追加一条 Critical 事件。
/// 事件顺序固定：cpu / memory / disk 警告在前，严重事件殿后。
pub fn evaluate(summary: &SummaryReport, thresholds: &Thresholds) -> Vec<AlertEvent> {
    let mut events = Vec::new();

    let warning_counts = [
        (Metric::Cpu, thresholds.cpu, summary.cpu.alert_count),
        (
            Metric::Memory,
            thresholds.memory,
            summary.memory.map(|m| m.alert_count).unwrap_or(0),
        ),
        (
            Metric::Disk,
            thresholds.disk,
            summary.disk.map(|m| m.alert_count).unwrap_or(0),
        ),
    ];

    for (metric, threshold, count) in warning_counts {
        if count > 0 {
            events.push(AlertEvent {
                metric,
                threshold_breached: threshold,
                count,
                severity: AlertSeverity::Warning,
            });
        }
    }

    if summary.cpu_critical_count > 0 {
        info!(
            "{} records exceeded the fixed {}% cpu critical bound",
            summary.cpu_critical_count, CPU_CRITICAL_BOUND
        );
        events.push(AlertEvent {
            metric: Metric::Cpu,
            threshold_breached: CPU_CRITICAL_BOUND,
            count: summary.cpu_critical_count,
            severity: AlertSeverity::Critical,
        });
    }

    events
}

/// 是否必须外发通知：存在严重事件即强制
pub fn requires_notification(events: &[AlertEvent]) -> bool {
    events.iter().any(|e| e.severity == AlertSeverity::Critical)
}
