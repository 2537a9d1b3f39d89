//! 반복 작업 스케줄러.
//!
//! 작업마다 `tokio::time::interval_at` 루프를 하나씩 띄우고, `CancellationToken`으로
//! 개별 중지 및 전체 종료를 처리합니다. 같은 작업의 실행은 절대 겹치지 않습니다.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 기본 실행 주기 (초).
pub const DEFAULT_CADENCE_SECS: u64 = 15;

/// 실행 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    period: Duration,
    aligned: bool,
}

impl Cadence {
    /// 즉시 시작해서 `period`마다 실행합니다.
    pub fn every(period: Duration) -> Self {
        Self {
            period,
            aligned: false,
        }
    }

    /// 벽시계 15초 경계(:00, :15, :30, :45)마다 실행합니다.
    pub fn every_15_seconds() -> Self {
        Self::every(Duration::from_secs(DEFAULT_CADENCE_SECS)).aligned()
    }

    /// 첫 실행을 벽시계의 다음 주기 경계에 맞춥니다.
    pub fn aligned(mut self) -> Self {
        self.aligned = true;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// `now` 기준 첫 실행까지의 대기 시간.
    pub fn initial_delay(&self, now: DateTime<Utc>) -> Duration {
        let period_ms = self.period.as_millis() as i64;
        if !self.aligned || period_ms == 0 {
            return Duration::ZERO;
        }

        let remainder = now.timestamp_millis().rem_euclid(period_ms);
        if remainder == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis((period_ms - remainder) as u64)
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::every_15_seconds()
    }
}

/// 이전 실행이 끝나기 전에 다음 주기가 도래했을 때의 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// 실행 중이면 이번 주기를 건너뜁니다.
    #[default]
    SkipIfBusy,
    /// 실행이 끝날 때까지 기다렸다가 늦게라도 다음 주기를 실행합니다.
    Serial,
}

/// 예약 작업 식별자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// 작업 실행 통계.
#[derive(Debug, Default)]
pub struct TaskStats {
    started: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

impl TaskStats {
    /// 시작된 실행 횟수.
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    /// 실행 중이라 건너뛴 주기 수.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }

    /// 에러 또는 패닉으로 끝난 실행 횟수.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }
}

type TaskFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// 실행 중 플래그. drop될 때(패닉, 취소 포함) 해제됩니다.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct TaskHandle {
    name: String,
    cancel: CancellationToken,
    join: JoinHandle<()>,
    stats: Arc<TaskStats>,
}

/// 반복 작업 스케줄러.
pub struct Scheduler {
    policy: OverlapPolicy,
    root: CancellationToken,
    tasks: Mutex<HashMap<TaskId, TaskHandle>>,
}

impl Scheduler {
    /// `SkipIfBusy` 정책의 스케줄러를 생성합니다.
    pub fn new() -> Self {
        Self::with_policy(OverlapPolicy::default())
    }

    pub fn with_policy(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            root: CancellationToken::new(),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// 작업을 예약합니다.
    ///
    /// 작업은 중지되거나 스케줄러가 종료될 때까지 `cadence`마다 실행됩니다.
    /// 에러는 로그로 남기고 다음 주기는 계속 실행됩니다. Tokio 런타임 안에서 호출해야 합니다.
    pub fn schedule<F, Fut, E>(&self, name: impl Into<String>, cadence: Cadence, task: F) -> TaskId
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let id = TaskId::new();
        let name = name.into();
        let cancel = self.root.child_token();
        let stats = Arc::new(TaskStats::default());

        let task: TaskFn = Arc::new(move || {
            let fut = task();
            Box::pin(async move { fut.await.map_err(|e| e.to_string()) })
        });

        let mut tasks = self.tasks();
        let join = tokio::spawn(run_task(
            name.clone(),
            cadence,
            self.policy,
            task,
            cancel.clone(),
            stats.clone(),
        ));
        tasks.insert(
            id,
            TaskHandle {
                name: name.clone(),
                cancel,
                join,
                stats,
            },
        );
        drop(tasks);

        info!(task_id = %id, task = %name, period = ?cadence.period(), "Task scheduled");
        id
    }

    /// 작업 맵 잠금. 다른 스레드의 패닉으로 오염되어도 맵은 계속 사용합니다.
    fn tasks(&self) -> MutexGuard<'_, HashMap<TaskId, TaskHandle>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 작업을 중지합니다. 등록된 작업이었으면 `true`.
    pub fn stop(&self, id: TaskId) -> bool {
        let handle = self.tasks().remove(&id);
        match handle {
            Some(handle) => {
                handle.cancel.cancel();
                info!(task_id = %id, task = %handle.name, "Task stopped");
                true
            }
            None => false,
        }
    }

    /// 작업 루프가 아직 실행 중인지 확인합니다.
    pub fn is_running(&self, id: TaskId) -> bool {
        self.tasks()
            .get(&id)
            .map(|h| !h.join.is_finished())
            .unwrap_or(false)
    }

    /// 등록된 작업 수.
    pub fn task_count(&self) -> usize {
        self.tasks().len()
    }

    /// 작업 실행 통계.
    pub fn stats(&self, id: TaskId) -> Option<Arc<TaskStats>> {
        self.tasks().get(&id).map(|h| h.stats.clone())
    }

    /// 모든 작업을 중지하고 루프가 끝날 때까지 기다립니다.
    pub async fn shutdown(&self) {
        self.root.cancel();

        let handles: Vec<(TaskId, TaskHandle)> = self.tasks().drain().collect();

        for (id, handle) in handles {
            if let Err(e) = handle.join.await {
                warn!(task_id = %id, "Task loop ended abnormally: {}", e);
            }
        }

        info!("Scheduler shut down");
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

async fn run_task(
    name: String,
    cadence: Cadence,
    policy: OverlapPolicy,
    task: TaskFn,
    cancel: CancellationToken,
    stats: Arc<TaskStats>,
) {
    let start = Instant::now() + cadence.initial_delay(Utc::now());
    let mut interval = tokio::time::interval_at(start, cadence.period());
    interval.set_missed_tick_behavior(match policy {
        OverlapPolicy::SkipIfBusy => MissedTickBehavior::Skip,
        OverlapPolicy::Serial => MissedTickBehavior::Delay,
    });

    let busy = Arc::new(AtomicBool::new(false));
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Some(handle) = in_flight.take() {
                    handle.abort();
                }
                debug!(task = %name, "Task loop cancelled");
                break;
            }
            _ = interval.tick() => {
                if busy.swap(true, Ordering::SeqCst) {
                    stats.skipped.fetch_add(1, Ordering::SeqCst);
                    warn!(task = %name, "Previous run still in progress, skipping tick");
                    continue;
                }

                let guard = BusyGuard(busy.clone());
                let mut handle = spawn_run(name.clone(), task.clone(), guard, stats.clone());

                match policy {
                    OverlapPolicy::SkipIfBusy => in_flight = Some(handle),
                    OverlapPolicy::Serial => {
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                handle.abort();
                                debug!(task = %name, "Task loop cancelled");
                                break;
                            }
                            _ = &mut handle => {}
                        }
                    }
                }
            }
        }
    }
}

/// 한 번의 실행을 별도 태스크로 띄웁니다. 패닉은 이 태스크 안에서 끝납니다.
fn spawn_run(
    name: String,
    task: TaskFn,
    guard: BusyGuard,
    stats: Arc<TaskStats>,
) -> JoinHandle<()> {
    stats.started.fetch_add(1, Ordering::SeqCst);

    tokio::spawn(async move {
        let _guard = guard;

        match AssertUnwindSafe(task()).catch_unwind().await {
            Ok(Ok(())) => debug!(task = %name, "Task run completed"),
            Ok(Err(e)) => {
                stats.failed.fetch_add(1, Ordering::SeqCst);
                error!(task = %name, "Task run failed: {}", e);
            }
            Err(_) => {
                stats.failed.fetch_add(1, Ordering::SeqCst);
                error!(task = %name, "Task run panicked");
            }
        }
    })
}
