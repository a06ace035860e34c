use crate::message::NotifyMessage;
use crate::notifier::Notifier;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// 调度超时：外部传输最多阻塞流水线 10 秒
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// 单次调度结果
///
/// `attempted=false` 表示未配置任何传输渠道，属于正常路径而非故障；
/// 传输失败被记录在 `error` 中，从不向上抛出。
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub attempted: bool,
    pub delivered: bool,
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn skipped() -> Self {
        Self {
            attempted: false,
            delivered: false,
            error: None,
        }
    }
}

/// 通知调度器
///
/// 本地回显是权威记录，外部投递尽力而为：每轮运行对每个渠道
/// 只尝试一次，失败由下一轮调度自然重试。
pub struct Dispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// 注册通知器
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        info!("Registered notifier: {}", notifier.name());
        self.notifiers.push(notifier);
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    /// 调度一条告警通知
    pub async fn dispatch(&self, message: &NotifyMessage) -> DispatchResult {
        // 本地回显先于任何外部调用
        info!(
            "--- Alert notification ({:?}) ---\n{}\n{}\n--- End notification ---",
            message.level, message.title, message.content
        );

        if self.notifiers.is_empty() {
            info!("No notification transport configured, local echo only");
            return DispatchResult::skipped();
        }

        let mut delivered = false;
        let mut last_error = None;

        for notifier in &self.notifiers {
            if !notifier.is_enabled() {
                continue;
            }

            match timeout(DISPATCH_TIMEOUT, notifier.send(message)).await {
                Ok(Ok(result)) => {
                    if result.success {
                        info!("Notification sent via {}: {}", notifier.name(), message.title);
                        delivered = true;
                    } else {
                        error!(
                            "Notification failed via {}: {}",
                            notifier.name(),
                            result.message
                        );
                        last_error = Some(result.message);
                    }
                }
                Ok(Err(e)) => {
                    error!("Notification error via {}: {}", notifier.name(), e);
                    last_error = Some(e.to_string());
                }
                Err(_) => {
                    warn!(
                        "Notification via {} timed out after {:?}",
                        notifier.name(),
                        DISPATCH_TIMEOUT
                    );
                    last_error = Some(format!("timed out after {:?}", DISPATCH_TIMEOUT));
                }
            }
        }

        DispatchResult {
            attempted: true,
            delivered,
            error: if delivered { None } else { last_error },
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
