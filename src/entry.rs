//! 로그 엔트리 타입 -- 캡처된 이벤트와 전송 배치의 와이어 형태
//!
//! [`LogEntry`]는 호출 지점에서 캡처된 진단 이벤트 하나를 나타냅니다.
//! 인자 목록은 전송 직렬화 시점까지 `serde_json::Value`로 구조를 유지하며,
//! 미리 문자열로 변환하지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 로그 레벨
///
/// `Warn`/`Error`만 수집 서버로 전송되며, `Debug`/`Info`는 콘솔 미러링
/// 전용입니다. 전송 볼륨을 조치 가능한 신호로 한정하기 위함입니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 개발용 상세 이벤트
    Debug,
    /// 정보성 이벤트
    Info,
    /// 경고 -- 전송 대상
    Warn,
    /// 에러 -- 전송 대상
    Error,
}

impl LogLevel {
    /// 이 레벨의 엔트리가 수집 서버로 전송되는지 여부를 반환합니다.
    pub fn is_shippable(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }

    /// 문자열에서 레벨을 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" | "err" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// 캡처된 로그 엔트리 하나
///
/// `args`는 호출자가 전달한 값 시퀀스를 순서 그대로 보존합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 심각도 레벨 (생성 이후 불변)
    pub level: LogLevel,
    /// 호출 지점의 인자 목록
    pub args: Vec<Value>,
}

impl LogEntry {
    /// 새 엔트리를 생성합니다.
    ///
    /// 인자 목록이 비어있으면 레벨을 설명하는 플레이스홀더 하나로 대체하여
    /// 내용 없는 엔트리가 만들어지지 않도록 합니다.
    pub fn new(level: LogLevel, args: Vec<Value>) -> Self {
        let args = if args.is_empty() {
            vec![Value::String(format!("({level} event with no arguments)"))]
        } else {
            args
        };
        Self { level, args }
    }
}

/// 한 번의 전송 시도로 보내지는 배치
///
/// 와이어 형태: `{ "entries": [ { "level": ..., "args": [...] }, ... ] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogBatch {
    /// 배치에 포함된 엔트리 (기록 순서 보존)
    pub entries: Vec<LogEntry>,
}

impl LogBatch {
    /// 엔트리 목록으로 배치를 생성합니다.
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    /// 배치에 포함된 엔트리 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 배치가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shippable_levels() {
        assert!(!LogLevel::Debug.is_shippable());
        assert!(!LogLevel::Info.is_shippable());
        assert!(LogLevel::Warn.is_shippable());
        assert!(LogLevel::Error.is_shippable());
    }

    #[test]
    fn level_display_is_lowercase() {
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn level_from_str_loose() {
        assert_eq!(LogLevel::from_str_loose("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str_loose("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str_loose("err"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_str_loose("fatal"), None);
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_value(LogLevel::Warn).unwrap();
        assert_eq!(json, json!("warn"));
    }

    #[test]
    fn entry_preserves_args_in_order() {
        let entry = LogEntry::new(
            LogLevel::Error,
            vec![json!("patient load failed"), json!({"chart_id": 42}), json!(3)],
        );
        assert_eq!(entry.args.len(), 3);
        assert_eq!(entry.args[0], json!("patient load failed"));
        assert_eq!(entry.args[1], json!({"chart_id": 42}));
        assert_eq!(entry.args[2], json!(3));
    }

    #[test]
    fn empty_args_get_placeholder() {
        let entry = LogEntry::new(LogLevel::Warn, vec![]);
        assert_eq!(entry.args.len(), 1);
        let text = entry.args[0].as_str().unwrap();
        assert!(text.contains("warn"));
    }

    #[test]
    fn batch_wire_shape() {
        let batch = LogBatch::new(vec![
            LogEntry::new(LogLevel::Warn, vec![json!("a")]),
            LogEntry::new(LogLevel::Error, vec![json!("b"), json!(1)]),
        ]);
        let wire = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            wire,
            json!({
                "entries": [
                    { "level": "warn", "args": ["a"] },
                    { "level": "error", "args": ["b", 1] },
                ]
            })
        );
    }

    #[test]
    fn batch_len_and_empty() {
        let empty = LogBatch::new(vec![]);
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);

        let one = LogBatch::new(vec![LogEntry::new(LogLevel::Error, vec![json!("x")])]);
        assert!(!one.is_empty());
        assert_eq!(one.len(), 1);
    }
}
