//! 서킷 브레이커 -- 연속 전송 실패 시 전송을 영구 차단
//!
//! # 상태 전이
//! ```text
//! Closed → Open: 연속 실패 횟수가 임계값에 도달
//! Open → (없음): 프로세스 수명 동안 복구 경로 없음
//! ```
//!
//! 한 번 열린 서킷은 다시 닫히지 않습니다. 실패 중인 엔드포인트에 대한
//! 무한 재시도를 막기 위한 fail-stop이며, 이후 로깅은 콘솔 전용으로
//! 동작합니다.

use std::fmt;

/// 서킷 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// 정상 동작 -- 전송 시도함
    Closed,
    /// 전송 영구 차단
    Open,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// 연속 실패 서킷 브레이커
///
/// 연속된 전송 실패 횟수를 추적하여 임계값 도달 시 서킷을 엽니다.
/// 중간에 성공이 끼어들면 카운터가 리셋됩니다.
pub struct CircuitBreaker {
    /// 현재 상태
    state: CircuitState,
    /// 연속 실패 카운터
    consecutive_failures: u32,
    /// 서킷을 여는 연속 실패 임계값
    threshold: u32,
}

impl CircuitBreaker {
    /// 임계값으로 브레이커를 생성합니다. 초기 상태는 `Closed`입니다.
    pub fn new(threshold: u32) -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            threshold,
        }
    }

    /// 전송 성공을 기록합니다.
    ///
    /// 닫힌 상태에서 연속 실패 카운터를 0으로 리셋합니다.
    /// 이미 열린 서킷은 성공이 늦게 도착해도 다시 닫히지 않습니다.
    pub fn record_success(&mut self) {
        if self.state == CircuitState::Closed {
            self.consecutive_failures = 0;
        }
    }

    /// 전송 실패를 기록합니다.
    ///
    /// 이번 기록으로 임계값에 도달하여 서킷이 열리면 `true`를 반환합니다.
    /// 이미 열린 상태에서는 아무 효과가 없습니다.
    pub fn record_failure(&mut self) -> bool {
        if self.state == CircuitState::Open {
            return false;
        }

        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.threshold {
            self.state = CircuitState::Open;
            return true;
        }
        false
    }

    /// 서킷이 열려있는지 확인합니다.
    pub fn is_open(&self) -> bool {
        self.state == CircuitState::Open
    }

    /// 현재 상태를 반환합니다.
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// 현재 연속 실패 횟수를 반환합니다.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// 설정된 임계값을 반환합니다.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
