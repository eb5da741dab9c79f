//! 전송기 설정
//!
//! [`ShipperConfig`]는 수집 엔드포인트, 배치/플러시 파라미터,
//! 서킷 브레이커 임계값을 담습니다.
//!
//! # 설정 로딩 우선순위
//! 1. 빌더/코드에서 명시한 값 (최고 우선)
//! 2. 환경변수 (`CARELOG_ENDPOINT=https://...` 형식)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), carelog::ShipperError> {
//! use carelog::ShipperConfig;
//!
//! // 기본값 + 환경변수 오버라이드
//! let config = ShipperConfig::from_env()?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ShipperError;

/// 전송기 설정
///
/// 모든 필드는 환경변수 `CARELOG_{FIELD}`로 오버라이드할 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipperConfig {
    /// 수집 서버 베이스 URL
    pub endpoint: String,
    /// 최대 배치 크기 (이 개수에 도달하면 즉시 플러시)
    pub max_batch_size: usize,
    /// 배치 플러시 간격 (밀리초)
    pub flush_interval_ms: u64,
    /// 서킷을 여는 연속 실패 임계값
    pub failure_threshold: u32,
    /// 콘솔 미러링 verbose 모드 (꺼져 있으면 warn/error만 미러링)
    pub verbose: bool,
    /// 기록 핸들 -> 워커 채널 용량
    pub channel_capacity: usize,
    /// teardown 최종 전송 유예 시간 (밀리초)
    pub shutdown_grace_ms: u64,
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000".to_owned(),
            max_batch_size: 20,
            flush_interval_ms: 5_000,
            failure_threshold: 3,
            // 프로덕션 빌드 밖에서는 기본 활성화
            verbose: cfg!(debug_assertions),
            channel_capacity: 1024,
            shutdown_grace_ms: 1_000,
        }
    }
}

impl ShipperConfig {
    /// 기본값에 환경변수 오버라이드를 적용한 설정을 생성합니다.
    pub fn from_env() -> Result<Self, ShipperError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CARELOG_{FIELD}`
    /// 예: `CARELOG_ENDPOINT=https://emr.example.com`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.endpoint, "CARELOG_ENDPOINT");
        override_usize(&mut self.max_batch_size, "CARELOG_MAX_BATCH_SIZE");
        override_u64(&mut self.flush_interval_ms, "CARELOG_FLUSH_INTERVAL_MS");
        override_u32(&mut self.failure_threshold, "CARELOG_FAILURE_THRESHOLD");
        override_bool(&mut self.verbose, "CARELOG_VERBOSE");
        override_usize(&mut self.channel_capacity, "CARELOG_CHANNEL_CAPACITY");
        override_u64(&mut self.shutdown_grace_ms, "CARELOG_SHUTDOWN_GRACE_MS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ShipperError> {
        const MAX_BATCH_SIZE: usize = 10_000;
        const MAX_FLUSH_INTERVAL_MS: u64 = 3_600_000; // 1 hour
        const MAX_FAILURE_THRESHOLD: u32 = 100;
        const MAX_CHANNEL_CAPACITY: usize = 1_000_000;
        const MAX_SHUTDOWN_GRACE_MS: u64 = 60_000;

        if self.endpoint.is_empty() {
            return Err(ShipperError::Config {
                field: "endpoint".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ShipperError::Config {
                field: "endpoint".to_owned(),
                reason: format!("'{}' must start with http:// or https://", self.endpoint),
            });
        }

        if self.max_batch_size == 0 || self.max_batch_size > MAX_BATCH_SIZE {
            return Err(ShipperError::Config {
                field: "max_batch_size".to_owned(),
                reason: format!("must be 1-{MAX_BATCH_SIZE}"),
            });
        }

        if self.flush_interval_ms == 0 || self.flush_interval_ms > MAX_FLUSH_INTERVAL_MS {
            return Err(ShipperError::Config {
                field: "flush_interval_ms".to_owned(),
                reason: format!("must be 1-{MAX_FLUSH_INTERVAL_MS}"),
            });
        }

        if self.failure_threshold == 0 || self.failure_threshold > MAX_FAILURE_THRESHOLD {
            return Err(ShipperError::Config {
                field: "failure_threshold".to_owned(),
                reason: format!("must be 1-{MAX_FAILURE_THRESHOLD}"),
            });
        }

        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(ShipperError::Config {
                field: "channel_capacity".to_owned(),
                reason: format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
            });
        }

        if self.shutdown_grace_ms == 0 || self.shutdown_grace_ms > MAX_SHUTDOWN_GRACE_MS {
            return Err(ShipperError::Config {
                field: "shutdown_grace_ms".to_owned(),
                reason: format!("must be 1-{MAX_SHUTDOWN_GRACE_MS}"),
            });
        }

        Ok(())
    }

    /// 플러시 간격을 `Duration`으로 반환합니다.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// teardown 유예 시간을 `Duration`으로 반환합니다.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// 전송기 설정 빌더
#[derive(Default)]
pub struct ShipperConfigBuilder {
    config: ShipperConfig,
}

impl ShipperConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 수집 서버 베이스 URL을 설정합니다.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// 최대 배치 크기를 설정합니다.
    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.config.max_batch_size = size;
        self
    }

    /// 플러시 간격(밀리초)을 설정합니다.
    pub fn flush_interval_ms(mut self, ms: u64) -> Self {
        self.config.flush_interval_ms = ms;
        self
    }

    /// 연속 실패 임계값을 설정합니다.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    /// verbose 모드를 설정합니다.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// 채널 용량을 설정합니다.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// teardown 유예 시간(밀리초)을 설정합니다.
    pub fn shutdown_grace_ms(mut self, ms: u64) -> Self {
        self.config.shutdown_grace_ms = ms;
        self
    }

    /// 설정을 검증하고 `ShipperConfig`를 생성합니다.
    pub fn build(self) -> Result<ShipperConfig, ShipperError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
