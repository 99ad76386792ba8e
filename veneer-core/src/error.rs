//! 层栈错误类型
//!
//! 注册期的校验失败立即返回给调用方（fail-fast），
//! 装配期/分发期的失败视为配置缺陷，不在内部重试或恢复

/// 层栈操作结果
pub type StackResult<T> = Result<T, StackError>;

#[derive(Debug, thiserror::Error)]
pub enum StackError {
    /// 匹配表达式无法识别（未知的匹配类型标记、空目标等）
    #[error("invalid match expression `{0}`")]
    InvalidMatchType(String),

    /// 按名称注册的层类型不存在于目录中
    #[error("unknown layer type `{0}`")]
    UnknownLayerType(String),

    /// 名称存在，但登记的是目标类型而非层类型
    #[error("`{0}` is declared as a target type, not a layer type")]
    InvalidLayerType(String),

    /// 工厂在注册期探测调用时失败
    #[error("layer factory failed validation: {0}")]
    InvalidLayerFactory(String),

    /// 装配链时无法创建层实例
    #[error("could not create layer: {0}")]
    LayerCreationFailed(String),

    /// 非终端层在绑定下一层之前收到了转发调用
    #[error("link has no next layer bound; stacks must be fully linked before use")]
    NoNextLink,
}

impl StackError {
    /// 是否属于注册期校验失败（而非装配/分发期失败）
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            StackError::InvalidMatchType(_)
                | StackError::UnknownLayerType(_)
                | StackError::InvalidLayerType(_)
                | StackError::InvalidLayerFactory(_)
        )
    }
}
