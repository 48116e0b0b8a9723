use std::sync::Arc;

use iterated_config::{ResponderConfig, DEFAULT_MAX_BODY_BYTES};

use crate::responder::{strategy_for, CannedResponder, Responder};

/// 共享给所有 handler 的应用状态
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<dyn Responder>,
    /// 聊天请求体大小上限（字节）
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// 根据配置创建占位 responder
    pub fn from_config(config: &ResponderConfig) -> Self {
        let strategy = strategy_for(config.strategy, config.seed);
        let responder = CannedResponder::new(config.replies.clone())
            .with_delay(std::time::Duration::from_millis(config.delay_ms))
            .with_strategy(strategy);
        Self::new(Arc::new(responder))
    }
}
