use serde::Serialize;
use tracing::debug;

use crate::schema::{ColumnMap, Metric};
use vigil_store::RecordBatch;

/// 单指标无效值计数
///
/// 非数值与越界分开计数；`total()` 保持与合并口径的报告格式兼容。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InvalidCounts {
    pub non_numeric: u64,
    pub out_of_range: u64,
}

impl InvalidCounts {
    pub fn total(&self) -> u64 {
        self.non_numeric + self.out_of_range
    }
}

/// 校验报告：一轮运行内对全部记录的完整盘点，构造后不再修改
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub total_records: u64,
    pub missing_values: u64,
    /// 与批次列序对齐的逐列缺失计数
    pub missing_by_column: Vec<(String, u64)>,
    pub invalid_cpu: InvalidCounts,
    pub invalid_memory: InvalidCounts,
    pub invalid_disk: InvalidCounts,
    /// 模式中未解析出的必需指标，平铺上报，不混入数值计数
    pub missing_columns: Vec<Metric>,
}

impl ValidationReport {
    pub fn invalid_total(&self) -> u64 {
        self.invalid_cpu.total() + self.invalid_memory.total() + self.invalid_disk.total()
    }

    pub fn all_in_range(&self) -> bool {
        self.invalid_total() == 0
    }
}

/// 校验整批记录
///
/// 永不在首个坏记录处停下：完整扫描，汇报所有发现。
/// 数据质量问题只计数，从不中断。
pub fn validate(batch: &RecordBatch, map: &ColumnMap) -> ValidationReport {
    let mut missing_values = 0u64;
    let mut missing_by_column: Vec<(String, u64)> =
        batch.columns.iter().map(|c| (c.clone(), 0)).collect();
    // 与 Metric::REQUIRED 对齐：cpu / memory / disk
    let mut invalid = [InvalidCounts::default(); 3];

    for record in &batch.records {
        // 逐字段缺失盘点
        for (index, value) in record.values.iter().enumerate() {
            if value.is_empty() {
                missing_values += 1;
                if let Some(entry) = missing_by_column.get_mut(index) {
                    entry.1 += 1;
                }
            }
        }

        // 必需指标的数值校验；空值已计入缺失，不再算无效
        for (slot, metric) in Metric::REQUIRED.iter().enumerate() {
            let Some(column) = map.get(*metric) else {
                continue;
            };
            let Some(value) = record.value(column.index) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            match value.as_f64() {
                None => invalid[slot].non_numeric += 1,
                // 0 与 100 是合法边界值
                Some(v) if !(0.0..=100.0).contains(&v) => invalid[slot].out_of_range += 1,
                Some(_) => {}
            }
        }
    }

    let report = ValidationReport {
        total_records: batch.len() as u64,
        missing_values,
        missing_by_column,
        invalid_cpu: invalid[0],
        invalid_memory: invalid[1],
        invalid_disk: invalid[2],
        missing_columns: map.missing_required(),
    };

    debug!(
        "Validated {} records: {} missing values, {} invalid metric values",
        report.total_records,
        report.missing_values,
        report.invalid_total()
    );

    report
}
