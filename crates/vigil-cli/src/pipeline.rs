use tracing::{error, warn};

use vigil_audit::{evaluate, requires_notification, summarize, validate, ColumnMap};
use vigil_config::{GlobalConfig, ThresholdStore};
use vigil_notify::{DispatchResult, Dispatcher, EmailNotifier, NotifyMessage, WebhookNotifier};
use vigil_report::{render_csv, render_summary_text, RunOutcome};
use vigil_store::{RecordBatch, RecordStore, SqliteStore};

/// 告警通知的固定主题
const ALERT_SUBJECT: &str = "CPU Alert";

/// 一轮审计的全部产物
pub struct AuditRun {
    pub outcome: RunOutcome,
    pub summary_text: Option<String>,
    pub csv: Option<String>,
    pub dispatch: Option<DispatchResult>,
}

/// 按配置组装通知调度器
///
/// 没有任何传输配置时返回空调度器：仅本地回显，不算故障。
pub fn build_dispatcher(config: &GlobalConfig) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    if let Some(email) = &config.email {
        dispatcher.register(Box::new(EmailNotifier::new(email.clone())));
    }
    if let Some(webhook) = &config.webhook {
        dispatcher.register(Box::new(WebhookNotifier::new(webhook.clone())));
    }
    dispatcher
}

/// 执行一轮完整审计
///
/// 装载 → 校验 → 聚合 → 告警评估 → （必要时）通知 → 汇集产物。
/// 结构性失败转成对应的 RunOutcome，绝不向上抛出；
/// 通知失败被吸收进 DispatchResult，报告永远生成。
pub async fn run_audit(
    config: &GlobalConfig,
    thresholds: &ThresholdStore,
    dispatcher: &Dispatcher,
) -> AuditRun {
    let batch = match load_batch(config).await {
        Ok(batch) => batch,
        Err(outcome) => {
            return AuditRun {
                outcome,
                summary_text: None,
                csv: None,
                dispatch: None,
            }
        }
    };

    let map = ColumnMap::resolve(&batch.columns);
    let validation = validate(&batch, &map);

    // 评估时刻的阈值快照：此后发生的更新只影响下一轮
    let snapshot = thresholds.snapshot().await;

    let summary = match summarize(&batch, &map, &snapshot) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("Summary skipped: {}", e);
            None
        }
    };

    let events = summary
        .as_ref()
        .map(|s| evaluate(s, &snapshot))
        .unwrap_or_default();
    let summary_text = summary.as_ref().map(render_summary_text);
    let csv = summary.as_ref().map(render_csv);

    let dispatch = if requires_notification(&events) {
        let body = summary_text.clone().unwrap_or_default();
        let message = NotifyMessage::critical(ALERT_SUBJECT, body);
        Some(dispatcher.dispatch(&message).await)
    } else {
        None
    };

    AuditRun {
        outcome: RunOutcome::Completed {
            table: config.store.table.clone(),
            validation,
            summary,
            events,
        },
        summary_text,
        csv,
        dispatch,
    }
}

/// 仅数据完整性检查，不聚合、不通知
pub async fn run_check(config: &GlobalConfig) -> RunOutcome {
    let batch = match load_batch(config).await {
        Ok(batch) => batch,
        Err(outcome) => return outcome,
    };

    let map = ColumnMap::resolve(&batch.columns);
    let validation = validate(&batch, &map);

    RunOutcome::Completed {
        table: config.store.table.clone(),
        validation,
        summary: None,
        events: Vec::new(),
    }
}

/// 打开并扫描记录存储，结构性失败映射为对应的 RunOutcome
async fn load_batch(config: &GlobalConfig) -> Result<RecordBatch, RunOutcome> {
    let store = match SqliteStore::open(&config.store.path, &config.store.table).await {
        Ok(store) => store,
        Err(e) => {
            error!("Record store unavailable: {}", e);
            return Err(RunOutcome::StoreMissing {
                path: config.store.path.display().to_string(),
            });
        }
    };

    match store.load().await {
        Ok(batch) => Ok(batch),
        Err(e) => {
            error!("Record scan failed: {}", e);
            Err(RunOutcome::TableMissing {
                table: config.store.table.clone(),
            })
        }
    }
}
