use chrono::{DateTime, Utc};
use serde::Serialize;

use vigil_audit::{AlertEvent, AlertSeverity, SummaryReport, ValidationReport};

/// 一轮运行的结果
///
/// 三种结构性结局各自渲染不同的用户提示；仪表盘层按 JSON 消费同一结构。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    StoreMissing {
        path: String,
    },
    TableMissing {
        table: String,
    },
    Completed {
        table: String,
        validation: ValidationReport,
        /// cpu 列未解析时聚合缺省，校验部分照常渲染
        summary: Option<SummaryReport>,
        events: Vec<AlertEvent>,
    },
}

/// 渲染文本报告正文
///
/// 正文是确定性的：相同输入与相同阈值下逐字节可复现。
/// 时间戳只允许出现在 `with_header` 的头行里，绝不混入正文。
pub fn render_report(outcome: &RunOutcome) -> String {
    let mut lines: Vec<String> = vec!["🔍 Running Full System Test...".to_string()];

    match outcome {
        RunOutcome::StoreMissing { path } => {
            lines.push(format!("❌ Database file not found: {}", path));
            push_summary_block(&mut lines, 0, 0, 0, 0, 0);
        }
        RunOutcome::TableMissing { table } => {
            lines.push("✅ Database file found.".to_string());
            lines.push(format!("❌ Table `{}` not found in database.", table));
        }
        RunOutcome::Completed {
            table, validation, ..
        } => {
            lines.push("✅ Database file found.".to_string());
            lines.push(format!(
                "✅ Loaded {} records from {}.",
                validation.total_records, table
            ));

            if validation.missing_columns.is_empty() {
                lines.push("✅ Column check passed.".to_string());
            } else {
                let names: Vec<&str> = validation
                    .missing_columns
                    .iter()
                    .map(|m| m.name())
                    .collect();
                lines.push(format!(
                    "❌ Missing required metric columns: {}",
                    names.join(", ")
                ));
            }

            if validation.missing_values == 0 {
                lines.push("✅ No missing values detected.".to_string());
            } else {
                let by_column: Vec<String> = validation
                    .missing_by_column
                    .iter()
                    .map(|(name, count)| format!("{}={}", name, count))
                    .collect();
                lines.push(format!(
                    "⚠️ Missing values detected: {} (by column: {})",
                    validation.missing_values,
                    by_column.join(", ")
                ));
            }

            if validation.all_in_range() {
                lines.push("✅ All system metrics within valid range (0–100).".to_string());
            } else {
                lines.push("❌ Some metrics out of range or invalid:".to_string());
                lines.push(format!(
                    "  - Invalid CPU records: {}",
                    validation.invalid_cpu.total()
                ));
                lines.push(format!(
                    "  - Invalid Memory records: {}",
                    validation.invalid_memory.total()
                ));
                lines.push(format!(
                    "  - Invalid Disk records: {}",
                    validation.invalid_disk.total()
                ));
            }

            push_summary_block(
                &mut lines,
                validation.total_records,
                validation.missing_values,
                validation.invalid_cpu.total(),
                validation.invalid_memory.total(),
                validation.invalid_disk.total(),
            );

            lines.push(String::new());
            lines.push("🟢 System validation complete.".to_string());
        }
    }

    lines.join("\n")
}

/// 固定表头的汇总块，行序不可变
fn push_summary_block(
    lines: &mut Vec<String>,
    total: u64,
    missing: u64,
    invalid_cpu: u64,
    invalid_memory: u64,
    invalid_disk: u64,
) {
    lines.push("===== Test Summary =====".to_string());
    lines.push(format!("Total Records: {}", total));
    lines.push(format!("Missing Values: {}", missing));
    lines.push(format!("Invalid CPU Records: {}", invalid_cpu));
    lines.push(format!("Invalid Memory Records: {}", invalid_memory));
    lines.push(format!("Invalid Disk Records: {}", invalid_disk));
}

/// 渲染人读摘要，同一段文字直接用作通知正文
///
/// 无有效样本时均值 / 峰值按 0 渲染，保持旧报告形态；
/// 需要区分「无数据」的消费方应读取结构化的 `SummaryReport`。
pub fn render_summary_text(summary: &SummaryReport) -> String {
    let avg_cpu = summary.cpu.average.unwrap_or(0.0);
    let max_cpu = summary.cpu.max.unwrap_or(0.0);
    let down_count = summary.network_down_count.unwrap_or(0);

    let sections = [
        "**System Summary**".to_string(),
        format!("Total Records: {}", summary.total_records),
        format!("Average CPU Usage: {:.2}%", avg_cpu),
        format!("Maximum CPU Usage: {}", max_cpu),
        format!("Network DOWN count: {}", down_count),
        format!("Top 3 CPU Peaks: {:?}", summary.top_peaks),
        format!(
            "⚠️ ALERT: {} records exceeded 90% CPU usage.",
            summary.cpu_critical_count
        ),
    ];

    sections.join("\n\n")
}

/// 渲染告警事件清单，事件顺序由评估器固定
pub fn render_alerts(events: &[AlertEvent]) -> String {
    if events.is_empty() {
        return "No alerts.".to_string();
    }

    let lines: Vec<String> = events
        .iter()
        .map(|e| {
            let tag = match e.severity {
                AlertSeverity::Warning => "warning",
                AlertSeverity::Critical => "CRITICAL",
            };
            format!(
                "[{}] {}: {} records above threshold {}",
                tag,
                e.metric.name(),
                e.count,
                e.threshold_breached
            )
        })
        .collect();

    lines.join("\n")
}

/// 渲染 CSV：两列 Metric,Value，行序固定
pub fn render_csv(summary: &SummaryReport) -> String {
    let avg = |m: Option<vigil_audit::MetricSummary>| {
        m.and_then(|s| s.average).unwrap_or(0.0)
    };
    let alerts = |m: Option<vigil_audit::MetricSummary>| m.map(|s| s.alert_count).unwrap_or(0);

    let rows = [
        format!("Average CPU,{:.2}", summary.cpu.average.unwrap_or(0.0)),
        format!("Average Memory,{:.2}", avg(summary.memory)),
        format!("Average Disk,{:.2}", avg(summary.disk)),
        format!("CPU Alerts,{}", summary.cpu.alert_count),
        format!("Memory Alerts,{}", alerts(summary.memory)),
        format!("Disk Alerts,{}", alerts(summary.disk)),
    ];

    let mut csv = String::from("Metric,Value\n");
    csv.push_str(&rows.join("\n"));
    csv.push('\n');
    csv
}

/// 为报告加时间戳头行：这是整份产物里唯一的非确定性来源
pub fn with_header(now: DateTime<Utc>, body: &str) -> String {
    format!("System Test Report - {}\n{}\n", now.to_rfc3339(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_audit::{summarize, validate, ColumnMap};
    use vigil_config::Thresholds;
    use vigil_store::{FieldValue, MetricRecord, RecordBatch};

    fn sample_batch() -> RecordBatch {
        let rows = vec![
            vec![
                FieldValue::Integer(1),
                FieldValue::Text("2026-01-01 00:00:00".to_string()),
                FieldValue::Real(95.0),
                FieldValue::Real(60.0),
                FieldValue::Real(40.0),
            ],
            vec![
                FieldValue::Integer(2),
                FieldValue::Text("2026-01-01 00:05:00".to_string()),
                FieldValue::Text("N/A".to_string()),
                FieldValue::Real(55.0),
                FieldValue::Null,
            ],
        ];
        RecordBatch {
            columns: ["id", "timestamp", "cpu", "memory", "disk"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            records: rows
                .into_iter()
                .enumerate()
                .map(|(seq, values)| MetricRecord { seq, values })
                .collect(),
        }
    }

    fn completed_outcome() -> RunOutcome {
        let batch = sample_batch();
        let map = ColumnMap::resolve(&batch.columns);
        let thresholds = Thresholds::default();
        let validation = validate(&batch, &map);
        let summary = summarize(&batch, &map, &thresholds).unwrap();
        let events = vigil_audit::evaluate(&summary, &thresholds);
        RunOutcome::Completed {
            table: "system_log".to_string(),
            validation,
            summary: Some(summary),
            events,
        }
    }

    #[test]
    fn test_report_body_is_deterministic() {
        let outcome = completed_outcome();
        assert_eq!(render_report(&outcome), render_report(&outcome));
    }

    #[test]
    fn test_report_section_order() {
        let outcome = completed_outcome();
        let body = render_report(&outcome);

        let sections = [
            "🔍 Running Full System Test...",
            "✅ Database file found.",
            "✅ Loaded 2 records from system_log.",
            "✅ Column check passed.",
            "⚠️ Missing values detected: 1",
            "❌ Some metrics out of range or invalid:",
            "===== Test Summary =====",
            "Total Records: 2",
            "Missing Values: 1",
            "Invalid CPU Records: 1",
            "Invalid Memory Records: 0",
            "Invalid Disk Records: 0",
            "🟢 System validation complete.",
        ];
        let mut cursor = 0;
        for section in sections {
            let found = body[cursor..]
                .find(section)
                .unwrap_or_else(|| panic!("section out of order or missing: {}", section));
            cursor += found + section.len();
        }
    }

    #[test]
    fn test_store_missing_renders_zero_summary() {
        // 场景 A：存储缺失也要给出零值汇总，而不是抛错
        let body = render_report(&RunOutcome::StoreMissing {
            path: "log.db".to_string(),
        });

        assert!(body.contains("❌ Database file not found: log.db"));
        assert!(body.contains("===== Test Summary ====="));
        assert!(body.contains("Total Records: 0"));
        assert!(body.contains("Invalid Disk Records: 0"));
    }

    #[test]
    fn test_table_missing_is_a_distinct_message() {
        let body = render_report(&RunOutcome::TableMissing {
            table: "system_log".to_string(),
        });

        assert!(body.contains("✅ Database file found."));
        assert!(body.contains("❌ Table `system_log` not found in database."));
        assert!(!body.contains("Database file not found"));
    }

    #[test]
    fn test_summary_text_shape() {
        let batch = sample_batch();
        let map = ColumnMap::resolve(&batch.columns);
        let summary = summarize(&batch, &map, &Thresholds::default()).unwrap();
        let text = render_summary_text(&summary);

        assert!(text.starts_with("**System Summary**"));
        assert!(text.contains("Total Records: 2"));
        assert!(text.contains("Average CPU Usage: 95.00%"));
        assert!(text.contains("Maximum CPU Usage: 95"));
        assert!(text.contains("Top 3 CPU Peaks: [95.0]"));
        assert!(text.contains("⚠️ ALERT: 1 records exceeded 90% CPU usage."));
    }

    #[test]
    fn test_csv_row_order() {
        let batch = sample_batch();
        let map = ColumnMap::resolve(&batch.columns);
        let summary = summarize(&batch, &map, &Thresholds::default()).unwrap();
        let csv = render_csv(&summary);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Metric,Value");
        assert!(lines[1].starts_with("Average CPU,"));
        assert!(lines[2].starts_with("Average Memory,"));
        assert!(lines[3].starts_with("Average Disk,"));
        assert!(lines[4].starts_with("CPU Alerts,"));
        assert!(lines[5].starts_with("Memory Alerts,"));
        assert!(lines[6].starts_with("Disk Alerts,"));
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_timestamp_isolated_to_header_line() {
        let outcome = completed_outcome();
        let body = render_report(&outcome);
        let now = Utc::now();
        let full = with_header(now, &body);

        let mut lines = full.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("System Test Report - "));
        // 除头行外与正文逐字节一致
        let rest: Vec<&str> = lines.collect();
        assert_eq!(rest.join("\n"), body);
    }

    #[test]
    fn test_alert_lines() {
        let batch = sample_batch();
        let map = ColumnMap::resolve(&batch.columns);
        let thresholds = Thresholds::default();
        let summary = summarize(&batch, &map, &thresholds).unwrap();
        let events = vigil_audit::evaluate(&summary, &thresholds);
        let text = render_alerts(&events);

        assert!(text.contains("[warning] cpu: 1 records above threshold 80"));
        assert!(text.contains("[CRITICAL] cpu: 1 records above threshold 90"));
        assert_eq!(render_alerts(&[]), "No alerts.");
    }
}
