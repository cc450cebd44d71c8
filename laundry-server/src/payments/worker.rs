//! 支付对账后台任务
//!
//! 每 `interval` 扫描一次待对账标记，向网关查询状态。
//! 每个标记最多自动查询 `max_attempts` 次，之后留给手动重试。

use std::sync::Arc;
use std::time::Duration;

use shared::order::SYSTEM_ACTOR;
use tokio_util::sync::CancellationToken;

use super::reconciler::PaymentReconciler;
use crate::utils::time::now_millis;

/// Result of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Markers verified against the gateway
    pub checked: usize,
    /// Settled (confirmed or already paid)
    pub confirmed: usize,
    /// Gateway has not reported success yet
    pub pending: usize,
    /// Skipped: attempt budget used up
    pub exhausted: usize,
    pub failed: usize,
}

/// 对账 worker
///
/// 注册为 `TaskKind::Worker`，在 `start_background_tasks()` 中启动。
pub struct ReconciliationWorker {
    reconciler: Arc<PaymentReconciler>,
    interval: Duration,
    max_attempts: u32,
    shutdown: CancellationToken,
}

impl ReconciliationWorker {
    pub fn new(
        reconciler: Arc<PaymentReconciler>,
        interval: Duration,
        max_attempts: u32,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            reconciler,
            interval,
            max_attempts,
            shutdown,
        }
    }

    /// 主循环
    pub async fn run(self) {
        if !self.reconciler.is_configured() {
            tracing::info!("Payment gateway not configured, reconciliation worker idle");
            self.shutdown.cancelled().await;
            return;
        }

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            max_attempts = self.max_attempts,
            "Reconciliation worker started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {
                    let stats = self.sweep(now_millis()).await;
                    if stats.checked > 0 {
                        tracing::debug!(?stats, "Reconciliation sweep finished");
                    }
                }
            }
        }

        tracing::info!("Reconciliation worker stopped");
    }

    /// Verify every marker that still has attempts left
    pub async fn sweep(&self, now: i64) -> SweepStats {
        let mut stats = SweepStats::default();
        let storage = self.reconciler.orders().storage();

        let markers = match storage.list_pending() {
            Ok(markers) => markers,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load pending reconciliations");
                return stats;
            }
        };

        for marker in markers {
            if self.shutdown.is_cancelled() {
                break;
            }
            if marker.attempts >= self.max_attempts {
                stats.exhausted += 1;
                continue;
            }

            let attempt = match storage.record_attempt(&marker.reference, now) {
                Ok(Some(attempt)) => attempt,
                // 已被 webhook / 手动重试处理
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(reference = %marker.reference, error = %e, "Failed to record attempt");
                    stats.failed += 1;
                    continue;
                }
            };

            stats.checked += 1;
            match self.reconciler.reconcile(&marker.reference, SYSTEM_ACTOR).await {
                Ok(outcome) if outcome.is_settled() => stats.confirmed += 1,
                Ok(_) => {
                    stats.pending += 1;
                    if attempt >= self.max_attempts {
                        tracing::warn!(
                            reference = %marker.reference,
                            order_id = %marker.order_id,
                            attempts = attempt,
                            "Automatic verification exhausted, manual retry required"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(reference = %marker.reference, attempt, error = %e, "Reconciliation failed");
                    stats.failed += 1;
                }
            }
        }

        stats
    }
}
