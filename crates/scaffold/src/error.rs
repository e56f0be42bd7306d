//! 脚手架错误类型

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// 名称不符合 snake_case 规则
    #[error("无效的迁移名称 '{0}'：只允许小写字母、数字和单个下划线分隔")]
    InvalidName(String),

    #[error("迁移文件已存在: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("写入迁移文件失败: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
