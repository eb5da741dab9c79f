//! 로그 전송 에러 타입
//!
//! [`ShipperError`]는 빌더와 전송 경로 내부에서만 사용됩니다.
//! 기록(`record`) 호출자에게는 계약상 어떤 에러도 전파되지 않으며,
//! 전송 실패는 서킷 브레이커 카운터 갱신으로만 반영됩니다.

/// 로그 전송 도메인 에러
///
/// 설정 검증, HTTP 전송, 수집 서버 응답, 워커 채널 통신의
/// 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum ShipperError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// HTTP 전송 에러 (연결 실패, DNS, 타임아웃 등)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// 수집 서버가 비성공 상태 코드로 응답
    #[error("collector rejected batch: status {status}")]
    Collector {
        /// HTTP 상태 코드
        status: u16,
    },

    /// 워커 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),
}
