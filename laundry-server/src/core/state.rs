use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::catalog::CatalogStorage;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::notifications::{MessagingClient, Notifier};
use crate::orders::{OrderStorage, OrdersManager};
use crate::payments::{PaymentGateway, PaymentReconciler, PaystackClient, ReconciliationWorker};
use crate::utils::logger::periodic_cleanup;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，作为 axum `State` 传给所有处理器。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | catalog | CatalogStorage | 服务、时间段、用户档案 |
/// | orders | Arc<OrdersManager> | 订单命令处理 |
/// | payments | Arc<PaymentReconciler> | 支付初始化与对账 |
/// | notifier | Arc<Notifier> | 订单状态通知 |
/// | jwt_service | Arc<JwtService> | JWT 校验 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub catalog: CatalogStorage,
    pub orders: Arc<OrdersManager>,
    pub payments: Arc<PaymentReconciler>,
    pub notifier: Arc<Notifier>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/{catalog,orders}.redb)
    /// 3. 支付网关 (PAYSTACK_SECRET_KEY 存在时)
    /// 4. 各服务 (Orders, Payments, Notifier, JWT)
    pub fn initialize(config: &Config) -> Result<Self> {
        let gateway: Option<Arc<dyn PaymentGateway>> = match &config.paystack.secret_key {
            Some(secret_key) => Some(Arc::new(PaystackClient::new(
                secret_key.clone(),
                config.paystack.base_url.clone(),
                Duration::from_millis(config.request_timeout_ms),
            )?)),
            None => None,
        };
        Self::with_gateway(config, gateway)
    }

    /// 使用指定的支付网关初始化 (测试注入 mock)
    pub fn with_gateway(
        config: &Config,
        gateway: Option<Arc<dyn PaymentGateway>>,
    ) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let catalog = CatalogStorage::open(config.catalog_db_path())?;
        let order_storage = OrderStorage::open(config.orders_db_path())?;
        let orders = Arc::new(OrdersManager::new(
            order_storage,
            catalog.clone(),
            config.order_number_prefix.clone(),
            config.timezone,
        ));

        let payments = Arc::new(PaymentReconciler::new(
            orders.clone(),
            catalog.clone(),
            gateway,
            config.paystack.secret_key.clone(),
            config.paystack.callback_url.clone(),
        ));

        let messaging = match config.messaging.credentials() {
            Some((api_url, token, phone_number_id)) => Some(MessagingClient::new(
                api_url,
                token,
                phone_number_id,
                Duration::from_millis(config.request_timeout_ms),
            )?),
            None => None,
        };
        let notifier = Arc::new(Notifier::new(
            orders.clone(),
            catalog.clone(),
            messaging,
            config.business_phone.clone(),
            config.business_hours.clone(),
        ));

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        tracing::info!(
            work_dir = %config.work_dir,
            payments = payments.is_configured(),
            notifications = notifier.is_configured(),
            "Server state initialized"
        );

        Ok(Self {
            config: config.clone(),
            catalog,
            orders,
            payments,
            notifier,
            jwt_service,
        })
    }

    /// 启动后台任务
    ///
    /// - 支付对账 (ReconciliationWorker)
    /// - 日志清理
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let worker = ReconciliationWorker::new(
            self.payments.clone(),
            Duration::from_secs(self.config.reconcile_interval_secs),
            self.config.reconcile_max_attempts,
            tasks.shutdown_token(),
        );
        tasks.spawn("payment_reconciliation", TaskKind::Worker, worker.run());

        let cleanup = periodic_cleanup(self.config.log_dir(), tasks.shutdown_token());
        tasks.spawn("log_cleanup", TaskKind::Periodic, cleanup);

        tasks.log_summary();
        tasks
    }
}
