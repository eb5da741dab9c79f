//! 전송 오케스트레이션 -- 기록 핸들과 단일 소유자 워커
//!
//! [`LogShipper`]는 애플리케이션 어디서나 복제하여 쓰는 기록 핸들이고,
//! 버퍼/타이머/서킷 브레이커 상태는 전용 워커 태스크가 단독 소유합니다.
//! 핸들과 워커는 bounded mpsc 채널로 연결되며, 기록 호출은 절대
//! 블록하거나 실패하지 않습니다.
//!
//! # 내부 아키텍처
//! ```text
//! record() -> mpsc -> Worker { LogBuffer + CircuitBreaker + flush deadline }
//!                        |-- spawn --> Transport::deliver (detached)
//!                        ^------------ delivery outcome channel
//! ```
//!
//! # 플러시 트리거
//! 1. 크기: 큐가 `max_batch_size`에 도달하면 즉시
//! 2. 시간: 엔트리 추가 시 예약된 플러시가 없으면 one-shot 마감 예약
//! 3. teardown: `shutdown()` 또는 마지막 핸들 드롭 시 최종 전송

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::breaker::CircuitBreaker;
use crate::buffer::LogBuffer;
use crate::config::ShipperConfig;
use crate::entry::{LogBatch, LogEntry, LogLevel};
use crate::error::ShipperError;
use crate::transport::{HttpTransport, Transport};

/// 전송 결과 채널 용량 (배치당 결과 하나이므로 작게 유지)
const OUTCOME_CHANNEL_CAPACITY: usize = 16;

/// 핸들 -> 워커 명령
enum Command {
    /// 전송 대상 엔트리 기록
    Record(LogEntry),
    /// 최종 플러시 후 종료 (완료 통지용 oneshot)
    Shutdown(oneshot::Sender<()>),
}

/// 로그 기록 핸들
///
/// `Clone`으로 복제하여 애플리케이션 전역에서 공유합니다.
/// 모든 복제본은 하나의 워커(하나의 큐, 하나의 서킷 브레이커)를
/// 공유합니다.
///
/// # 사용 예시
/// ```ignore
/// use carelog::LogShipperBuilder;
///
/// let shipper = LogShipperBuilder::new().build()?;
/// shipper.error(vec!["chart load failed".into()]);
/// shipper.debug(vec!["render pass".into()]); // 콘솔 전용
/// ```
#[derive(Clone)]
pub struct LogShipper {
    cmd_tx: mpsc::Sender<Command>,
    verbose: bool,
}

impl LogShipper {
    /// 이벤트를 기록합니다.
    ///
    /// 레벨에 맞는 tracing 채널로 콘솔 미러링을 수행하고,
    /// `Warn`/`Error` 엔트리는 전송 버퍼로 넘깁니다.
    /// 이 호출은 블록하지 않으며 어떤 에러도 반환하지 않습니다.
    pub fn record(&self, level: LogLevel, args: Vec<Value>) {
        let entry = LogEntry::new(level, args);
        self.mirror(&entry);
        if entry.level.is_shippable() {
            // 채널이 가득 찼거나 워커가 종료된 경우 조용히 드롭
            let _ = self.cmd_tx.try_send(Command::Record(entry));
        }
    }

    /// `Debug` 레벨 기록 (콘솔 전용)
    pub fn debug(&self, args: Vec<Value>) {
        self.record(LogLevel::Debug, args);
    }

    /// `Info` 레벨 기록 (콘솔 전용)
    pub fn info(&self, args: Vec<Value>) {
        self.record(LogLevel::Info, args);
    }

    /// `Warn` 레벨 기록 (전송 대상)
    pub fn warn(&self, args: Vec<Value>) {
        self.record(LogLevel::Warn, args);
    }

    /// `Error` 레벨 기록 (전송 대상)
    pub fn error(&self, args: Vec<Value>) {
        self.record(LogLevel::Error, args);
    }

    /// 최종 플러시를 요청하고 워커 종료를 기다립니다.
    ///
    /// 큐에 남은 엔트리는 마지막 배치로 전송되며, 전송 실패는 조용히
    /// 무시됩니다. 워커가 이미 종료된 경우에도 에러 없이 반환합니다.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Shutdown(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// 레벨에 맞는 tracing 채널로 이벤트를 미러링합니다.
    ///
    /// verbose 모드가 꺼져 있으면 warn/error만 미러링합니다.
    fn mirror(&self, entry: &LogEntry) {
        if !self.verbose && !entry.level.is_shippable() {
            return;
        }
        let message = render_args(&entry.args);
        match entry.level {
            LogLevel::Debug => tracing::debug!(target: "carelog", "{message}"),
            LogLevel::Info => tracing::info!(target: "carelog", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "carelog", "{message}"),
            LogLevel::Error => tracing::error!(target: "carelog", "{message}"),
        }
    }
}

/// 인자 목록을 콘솔 출력용 한 줄 문자열로 변환합니다.
///
/// 문자열 값은 따옴표 없이, 나머지는 JSON 표기로 이어 붙입니다.
fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 로그 전송기 빌더
///
/// 설정을 검증하고 워커 태스크를 스폰합니다.
/// tokio 런타임 위에서 호출해야 합니다.
pub struct LogShipperBuilder {
    config: ShipperConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl LogShipperBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ShipperConfig::default(),
            transport: None,
        }
    }

    /// 전송기 설정을 지정합니다.
    pub fn config(mut self, config: ShipperConfig) -> Self {
        self.config = config;
        self
    }

    /// 전송 구현을 교체합니다.
    ///
    /// 지정하지 않으면 설정의 엔드포인트로 [`HttpTransport`]를 생성합니다.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 설정을 검증하고 워커를 스폰한 뒤 기록 핸들을 반환합니다.
    pub fn build(self) -> Result<LogShipper, ShipperError> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&self.config.endpoint)?),
        };

        let (cmd_tx, cmd_rx) = mpsc::channel(self.config.channel_capacity);
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);

        let worker = ShipperWorker {
            buffer: LogBuffer::new(self.config.max_batch_size),
            breaker: CircuitBreaker::new(self.config.failure_threshold),
            flush_deadline: None,
            transport,
            cmd_rx,
            outcome_tx,
            outcome_rx,
            config: self.config.clone(),
        };
        tokio::spawn(worker.run());

        Ok(LogShipper {
            cmd_tx,
            verbose: self.config.verbose,
        })
    }
}

impl Default for LogShipperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 버퍼/브레이커/타이머를 단독 소유하는 워커
///
/// 모든 상태 변경이 이 태스크 안에서 직렬화되므로 락이 필요 없습니다.
struct ShipperWorker {
    config: ShipperConfig,
    buffer: LogBuffer,
    breaker: CircuitBreaker,
    /// 예약된 플러시 마감 시각 (최대 하나)
    flush_deadline: Option<Instant>,
    transport: Arc<dyn Transport>,
    cmd_rx: mpsc::Receiver<Command>,
    outcome_tx: mpsc::Sender<Result<(), ShipperError>>,
    outcome_rx: mpsc::Receiver<Result<(), ShipperError>>,
}

impl ShipperWorker {
    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Record(entry)) => self.on_record(entry),
                    Some(Command::Shutdown(ack)) => {
                        self.final_flush().await;
                        let _ = ack.send(());
                        break;
                    }
                    // 모든 핸들이 드롭됨 -- teardown으로 간주
                    None => {
                        self.final_flush().await;
                        break;
                    }
                },
                Some(outcome) = self.outcome_rx.recv() => self.on_outcome(outcome),
                () = flush_timer(self.flush_deadline) => {
                    self.flush_deadline = None;
                    self.flush();
                }
            }
        }
    }

    /// 엔트리를 버퍼에 추가하고 플러시 트리거를 평가합니다.
    fn on_record(&mut self, entry: LogEntry) {
        if self.breaker.is_open() {
            // 서킷이 열린 뒤에는 전송 목적의 버퍼링을 중단
            return;
        }

        let size_reached = self.buffer.push(entry);
        if size_reached {
            // 크기 트리거: 타이머를 기다리지 않고 즉시 플러시
            self.flush_deadline = None;
            self.flush();
        } else if self.flush_deadline.is_none() {
            // 시간 트리거: 예약된 플러시가 없을 때만 새로 예약
            self.flush_deadline = Some(Instant::now() + self.config.flush_interval());
        }
    }

    /// 현재 큐 전체를 한 배치로 인출하여 분리된 태스크로 전송합니다.
    ///
    /// 전송 결과는 기다리지 않고 outcome 채널로만 돌려받습니다.
    /// 인출된 배치는 결과와 무관하게 큐로 되돌아가지 않습니다
    /// (배치당 최대 1회 전송).
    fn flush(&mut self) {
        if self.buffer.is_empty() || self.breaker.is_open() {
            return;
        }

        let batch = LogBatch::new(self.buffer.take_batch());
        tracing::debug!(
            transport = self.transport.name(),
            entries = batch.len(),
            "shipping log batch"
        );

        let delivery = self.transport.deliver(batch);
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = delivery.await;
            // 워커가 이미 종료된 경우 결과는 버려짐
            let _ = outcome_tx.send(outcome).await;
        });
    }

    /// 전송 결과를 브레이커에 반영합니다.
    ///
    /// 실패는 호출자에게 전파되지 않으며, 이 파이프라인을 통해
    /// 다시 기록되지도 않습니다 (피드백 루프 방지).
    fn on_outcome(&mut self, outcome: Result<(), ShipperError>) {
        match outcome {
            Ok(()) => self.breaker.record_success(),
            Err(e) => {
                if self.breaker.record_failure() {
                    tracing::warn!(
                        error = %e,
                        failures = self.breaker.consecutive_failures(),
                        "circuit opened, log delivery disabled for process lifetime"
                    );
                } else {
                    tracing::debug!(error = %e, "log batch delivery failed");
                }
            }
        }
    }

    /// teardown 시 남은 엔트리를 마지막 배치로 전송합니다.
    ///
    /// 유예 시간 내에 완료되지 않으면 포기하며, 결과는 무시됩니다.
    async fn final_flush(&mut self) {
        if self.buffer.is_empty() || self.breaker.is_open() {
            return;
        }

        let batch = LogBatch::new(self.buffer.take_batch());
        tracing::debug!(entries = batch.len(), "final flush on teardown");

        let grace = self.config.shutdown_grace();
        let _ = tokio::time::timeout(grace, self.transport.deliver(batch)).await;
    }
}

/// 예약된 플러시 마감까지 대기합니다.
///
/// 예약이 없으면 영원히 대기하여 select의 다른 브랜치만 동작합니다.
async fn flush_timer(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
