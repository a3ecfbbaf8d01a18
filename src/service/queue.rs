//! 限流请求队列
//!
//! 所有对外部估价服务的调用都经过同一个队列: 一次只执行一个任务 (FIFO),
//! 任务结束 (成功、失败或 panic) 后等待固定冷却时间再取下一个。
//! 队列在进程启动时创建一次, 以 `Arc<RateLimitedQueue>` 注入估价服务。

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Request queue is closed")]
    Closed,

    #[error("Queued task failed before producing a result")]
    TaskFailed,
}

type Job = BoxFuture<'static, ()>;

pub struct RateLimitedQueue {
    sender: mpsc::UnboundedSender<Job>,
    pending: Arc<AtomicUsize>,
}

impl RateLimitedQueue {
    /// 创建队列并启动工作任务; 必须在 tokio 运行时内调用
    pub fn new(cooldown: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        tokio::spawn(run_worker(receiver, cooldown, Arc::clone(&pending)));
        tracing::info!("Rate-limited queue started, cooldown {:?}", cooldown);

        Self { sender, pending }
    }

    /// 排队中 + 执行中的任务数
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// 提交任务并等待其结果
    ///
    /// 任务 panic 只会让本次调用返回 `QueueError::TaskFailed`, 不影响后续任务。
    pub async fn enqueue<F, T>(&self, work: F) -> Result<T, QueueError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let output = work.await;
            // 调用方可能已放弃等待
            let _ = reply_tx.send(output);
        });

        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(QueueError::Closed);
        }

        tracing::debug!("Task enqueued, {} pending", self.pending());
        reply_rx.await.map_err(|_| QueueError::TaskFailed)
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<Job>,
    cooldown: Duration,
    pending: Arc<AtomicUsize>,
) {
    while let Some(job) = receiver.recv().await {
        // 单独 spawn, panic 只影响该任务
        if let Err(e) = tokio::spawn(job).await {
            tracing::error!("Queued task aborted: {}", e);
        }
        pending.fetch_sub(1, Ordering::SeqCst);

        tokio::time::sleep(cooldown).await;
    }

    tracing::info!("Rate-limited queue stopped");
}
