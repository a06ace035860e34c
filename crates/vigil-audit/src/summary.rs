use serde::Serialize;
use tracing::debug;

use crate::alert::CPU_CRITICAL_BOUND;
use crate::schema::{ColumnMap, Metric};
use vigil_config::Thresholds;
use vigil_core::Result;
use vigil_store::RecordBatch;

/// cpu 峰值取前几名
pub const TOP_PEAKS: usize = 3;

/// 单指标聚合统计
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSummary {
    /// 数值有效的样本数
    pub valid_count: u64,
    /// None 表示没有任何有效样本，区别于真实均值恰为 0
    pub average: Option<f64>,
    pub max: Option<f64>,
    /// 严格大于当前配置阈值的有效值个数
    pub alert_count: u64,
}

/// 聚合摘要，每轮运行重新推导
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub total_records: u64,
    pub cpu: MetricSummary,
    /// memory / disk 列未解析时整体缺省
    pub memory: Option<MetricSummary>,
    pub disk: Option<MetricSummary>,
    /// cpu 有效值前三大，降序，同值保持记录原序
    pub top_peaks: Vec<f64>,
    /// 有效 cpu 值中超过固定严重界限（90%）的个数
    pub cpu_critical_count: u64,
    /// 状态列未解析时缺省；子串匹配 "down"（大小写不敏感）
    pub network_down_count: Option<u64>,
}

/// 聚合整批记录
///
/// cpu 列是硬性要求；阈值取调用时刻的快照，运行中途的阈值
/// 变更只影响之后开始的运行。
pub fn summarize(
    batch: &RecordBatch,
    map: &ColumnMap,
    thresholds: &Thresholds,
) -> Result<SummaryReport> {
    let cpu_column = map.require_cpu()?;

    let cpu_values = collect_valid(batch, cpu_column.index);
    let cpu = metric_summary(&cpu_values, thresholds.cpu);

    let memory = map
        .get(Metric::Memory)
        .map(|c| metric_summary(&collect_valid(batch, c.index), thresholds.memory));
    let disk = map
        .get(Metric::Disk)
        .map(|c| metric_summary(&collect_valid(batch, c.index), thresholds.disk));

    // 稳定降序：同值保持原始记录顺序
    let mut top_peaks = cpu_values.clone();
    top_peaks.sort_by(|a, b| b.total_cmp(a));
    top_peaks.truncate(TOP_PEAKS);

    let cpu_critical_count = cpu_values.iter().filter(|v| **v > CPU_CRITICAL_BOUND).count() as u64;

    let network_down_count = map.get(Metric::NetworkStatus).map(|column| {
        batch
            .records
            .iter()
            .filter_map(|r| r.value(column.index))
            .filter_map(|v| v.as_text())
            .filter(|s| s.to_lowercase().contains("down"))
            .count() as u64
    });

    debug!(
        "Summarized {} records: {} valid cpu samples, {} over critical bound",
        batch.len(),
        cpu.valid_count,
        cpu_critical_count
    );

    Ok(SummaryReport {
        total_records: batch.len() as u64,
        cpu,
        memory,
        disk,
        top_peaks,
        cpu_critical_count,
        network_down_count,
    })
}

/// 某一列数值有效的样本，按记录原序
fn collect_valid(batch: &RecordBatch, index: usize) -> Vec<f64> {
    batch
        .records
        .iter()
        .filter_map(|r| r.value(index))
        .filter_map(|v| v.as_f64())
        .collect()
}

fn metric_summary(values: &[f64], threshold: f64) -> MetricSummary {
    let valid_count = values.len() as u64;
    let average = if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };
    let max = values.iter().copied().reduce(f64::max);
    let alert_count = values.iter().filter(|v| **v > threshold).count() as u64;

    MetricSummary {
        valid_count,
        average,
        max,
        alert_count,
    }
}
