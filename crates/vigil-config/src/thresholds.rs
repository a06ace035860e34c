use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use vigil_core::{Result, VigilError};

/// 各指标的警告阈值（百分比，0-100）
///
/// 与 cpu 的固定严重界限（90%）相互独立：阈值可调，严重界限不可调。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Thresholds {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: 80.0,
            memory: 85.0,
            disk: 90.0,
        }
    }
}

impl Thresholds {
    /// 校验所有阈值落在 [0, 100]
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cpu", self.cpu),
            ("memory", self.memory),
            ("disk", self.disk),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(VigilError::InvalidThreshold(format!(
                    "{} threshold {} outside [0, 100]",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// 进程级阈值状态
///
/// 单写者模型：配置界面是唯一写入方，更新在写锁下原子生效，
/// 对更新之后开始的聚合 / 告警评估可见；已生成的校验报告不受影响。
#[derive(Clone)]
pub struct ThresholdStore {
    inner: Arc<RwLock<Thresholds>>,
}

impl ThresholdStore {
    pub fn new(initial: Thresholds) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// 读取评估时刻的阈值快照
    pub async fn snapshot(&self) -> Thresholds {
        *self.inner.read().await
    }

    /// 更新阈值
    ///
    /// `authorized` 由外部身份层提供；为 false 时拒绝修改。
    pub async fn update(&self, authorized: bool, new: Thresholds) -> Result<()> {
        if !authorized {
            return Err(VigilError::Unauthorized(
                "requester may not modify thresholds".to_string(),
            ));
        }
        new.validate()?;

        let mut current = self.inner.write().await;
        *current = new;
        info!(
            "Thresholds updated: cpu={}, memory={}, disk={}",
            new.cpu, new.memory, new.disk
        );
        Ok(())
    }
}

impl Default for ThresholdStore {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.cpu, 80.0);
        assert_eq!(t.memory, 85.0);
        assert_eq!(t.disk, 90.0);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_boundary_thresholds_are_valid() {
        let t = Thresholds {
            cpu: 0.0,
            memory: 100.0,
            disk: 50.0,
        };
        assert!(t.validate().is_ok());
    }

    #[tokio::test]
    async fn test_unauthorized_update_is_refused() {
        let store = ThresholdStore::default();
        let result = store
            .update(
                false,
                Thresholds {
                    cpu: 50.0,
                    memory: 50.0,
                    disk: 50.0,
                },
            )
            .await;

        assert!(matches!(result, Err(VigilError::Unauthorized(_))));
        assert_eq!(store.snapshot().await, Thresholds::default());
    }

    #[tokio::test]
    async fn test_authorized_update_is_visible_to_later_reads() {
        let store = ThresholdStore::default();
        let new = Thresholds {
            cpu: 95.0,
            memory: 85.0,
            disk: 90.0,
        };
        store.update(true, new).await.unwrap();
        assert_eq!(store.snapshot().await, new);
    }

    #[tokio::test]
    async fn test_out_of_range_threshold_is_rejected() {
        let store = ThresholdStore::default();
        let result = store
            .update(
                true,
                Thresholds {
                    cpu: 120.0,
                    memory: 85.0,
                    disk: 90.0,
                },
            )
            .await;

        assert!(matches!(result, Err(VigilError::InvalidThreshold(_))));
    }
}
