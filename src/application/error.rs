//! 应用层错误定义
//!
//! 头像组件对外的统一错误类型

use thiserror::Error;

use crate::domain::speech::SpeechError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 语音播放失败（不含取消）
    #[error("Speech failed: {0}")]
    SpeechFailed(#[from] SpeechError),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }
}
