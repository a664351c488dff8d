//! 后台任务管理
//!
//! 统一管理后台任务的注册、启动和关闭。

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// 长期后台工作者
    Worker,
    /// 定时任务
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Worker => write!(f, "Worker"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

/// 已注册的后台任务
struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// 所有任务共享一个 CancellationToken；shutdown 时先 cancel 再 join。
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    cancel: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 注册并启动一个任务。panic 会被捕获并记录，不影响其他任务。
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!(task = name, kind = %kind, "background task started");
        let handle = tokio::spawn(async move {
            if AssertUnwindSafe(fut).catch_unwind().await.is_err() {
                tracing::error!(task = name, "background task panicked");
            }
        });
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    /// 取消所有任务并等待退出（每个任务最多等 5s）
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            match tokio::time::timeout(std::time::Duration::from_secs(5), task.handle).await {
                Ok(_) => tracing::debug!(task = task.name, "background task stopped"),
                Err(_) => tracing::warn!(task = task.name, "background task shutdown timed out"),
            }
        }
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
