//! 배치 전송 -- 수집 엔드포인트로의 HTTP 전달
//!
//! [`Transport`] trait은 전송 메커니즘을 추상화하여 테스트에서
//! 모의 전송으로 교체할 수 있게 합니다. 기본 구현인 [`HttpTransport`]는
//! reqwest로 JSON 배치를 POST합니다.

use std::future::Future;
use std::pin::Pin;

use crate::entry::LogBatch;
use crate::error::ShipperError;

/// dyn-compatible 전송 future 타입
///
/// `Transport` trait을 `Box<dyn Transport>`로 다루기 위해
/// RPITIT 대신 boxed future를 반환합니다.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 수집 엔드포인트 경로 (베이스 URL에 이어 붙음)
const COLLECT_PATH: &str = "/logs";

/// 배치 전송 trait
///
/// 새로운 전송 방식을 추가하려면 이 trait을 구현합니다.
pub trait Transport: Send + Sync {
    /// 전송 방식 이름 (로깅용)
    fn name(&self) -> &str;

    /// 배치 하나를 수집 엔드포인트로 전송합니다.
    ///
    /// 반환된 future는 워커에서 분리된 태스크로 실행되므로
    /// `'static`이어야 합니다.
    fn deliver(&self, batch: LogBatch) -> BoxFuture<'static, Result<(), ShipperError>>;
}

/// reqwest 기반 HTTP 전송
///
/// - 요청 본문: `{ "entries": [...] }` (`Content-Type: application/json`)
/// - 쿠키 저장소 활성화 (세션 자격 증명을 함께 전송)
/// - 요청 타임아웃은 따로 지정하지 않고 전송 계층 기본값을 따릅니다.
pub struct HttpTransport {
    client: reqwest::Client,
    collect_url: String,
}

impl HttpTransport {
    /// 수집 서버 베이스 URL로 전송기를 생성합니다.
    pub fn new(endpoint: &str) -> Result<Self, ShipperError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            collect_url: format!("{}{}", endpoint.trim_end_matches('/'), COLLECT_PATH),
        })
    }

    /// 완성된 수집 URL을 반환합니다.
    pub fn collect_url(&self) -> &str {
        &self.collect_url
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn deliver(&self, batch: LogBatch) -> BoxFuture<'static, Result<(), ShipperError>> {
        let client = self.client.clone();
        let url = self.collect_url.clone();
        Box::pin(async move {
            let response = client.post(&url).json(&batch).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ShipperError::Collector {
                    status: status.as_u16(),
                });
            }
            Ok(())
        })
    }
}
