#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`entry`]: 로그 레벨, 엔트리, 배치 와이어 타입
//! - [`buffer`]: 인메모리 FIFO 버퍼 및 배치 인출
//! - [`breaker`]: 연속 실패 서킷 브레이커 (open은 프로세스 수명 동안 유지)
//! - [`transport`]: 전송 trait 및 reqwest HTTP 구현
//! - [`shipper`]: 기록 핸들 + 단일 소유자 워커
//! - [`config`]: 전송기 설정 (환경변수 오버라이드 포함)
//! - [`error`]: 도메인 에러 타입
//!
//! # 동시성 모델
//!
//! 버퍼, 타이머 예약, 서킷 브레이커는 워커 태스크 하나가 단독
//! 소유합니다. 기록 핸들은 `Clone`이며 `try_send` 한 번으로 끝나므로
//! 호출자는 절대 suspend하지 않습니다. 전송 시도는 분리된 태스크로
//! 실행되어 배치 N의 전송 중에도 배치 N+1을 인출할 수 있습니다
//! (수집 서버는 배치 간 도착 순서 역전을 허용해야 합니다).

pub mod breaker;
pub mod buffer;
pub mod config;
pub mod entry;
pub mod error;
pub mod shipper;
pub mod transport;

// --- 주요 타입 re-export ---

// 기록 핸들
pub use shipper::{LogShipper, LogShipperBuilder};

// 설정
pub use config::{ShipperConfig, ShipperConfigBuilder};

// 에러
pub use error::ShipperError;

// 엔트리/배치
pub use entry::{LogBatch, LogEntry, LogLevel};

// 전송
pub use transport::{HttpTransport, Transport};

// 버퍼/브레이커
pub use breaker::{CircuitBreaker, CircuitState};
pub use buffer::LogBuffer;
