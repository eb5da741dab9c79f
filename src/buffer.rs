//! 로그 버퍼링 -- 인메모리 FIFO 큐 및 배치 인출
//!
//! [`LogBuffer`]는 전송 대상 엔트리를 기록 순서대로 버퍼링하고,
//! 큐 전체를 하나의 배치로 인출합니다.
//!
//! # 크기 불변식
//! 큐 길이가 `max_batch_size`에 도달하는 것 자체가 플러시 트리거이므로,
//! 트리거 사이의 휴지 상태에서 큐는 최대 배치 크기를 넘지 않습니다.

use std::collections::VecDeque;

use crate::entry::LogEntry;

/// 인메모리 로그 버퍼
///
/// 전송 대상 엔트리를 임시 저장하고, 플러시 시점에 큐 전체를
/// 하나의 배치로 전달합니다.
pub struct LogBuffer {
    /// 버퍼 내부 저장소
    buffer: VecDeque<LogEntry>,
    /// 최대 배치 크기 (도달 시 즉시 플러시)
    max_batch_size: usize,
    /// 총 유입 엔트리 카운터
    total_recorded: u64,
    /// 인출된 배치 카운터
    batches_taken: u64,
}

impl LogBuffer {
    /// 새 로그 버퍼를 생성합니다.
    pub fn new(max_batch_size: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(max_batch_size.min(10_000)),
            max_batch_size,
            total_recorded: 0,
            batches_taken: 0,
        }
    }

    /// 엔트리를 큐 끝에 추가합니다.
    ///
    /// 추가 직후 큐 길이가 최대 배치 크기에 도달하면 `true`를 반환하여
    /// 호출측에 즉시 플러시가 필요함을 알립니다.
    pub fn push(&mut self, entry: LogEntry) -> bool {
        self.total_recorded += 1;
        self.buffer.push_back(entry);
        self.buffer.len() >= self.max_batch_size
    }

    /// 현재 큐 전체를 하나의 배치로 인출합니다.
    ///
    /// 인출 이후 추가되는 엔트리는 새 큐에서 시작하므로, 어떤 엔트리도
    /// 두 배치에 걸치지 않습니다. 버퍼가 비어있으면 빈 Vec을 반환합니다.
    pub fn take_batch(&mut self) -> Vec<LogEntry> {
        if !self.buffer.is_empty() {
            self.batches_taken += 1;
        }
        self.buffer.drain(..).collect()
    }

    /// 현재 버퍼에 저장된 엔트리 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// 버퍼가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 최대 배치 크기를 반환합니다.
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// 총 유입 엔트리 수를 반환합니다.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// 지금까지 인출된 배치 수를 반환합니다.
    pub fn batches_taken(&self) -> u64 {
        self.batches_taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogLevel;
    use serde_json::json;

    fn make_entry(msg: &str) -> LogEntry {
        LogEntry::new(LogLevel::Error, vec![json!(msg)])
    }

    #[test]
    fn push_and_take() {
        let mut buf = LogBuffer::new(100);
        buf.push(make_entry("log1"));
        buf.push(make_entry("log2"));
        buf.push(make_entry("log3"));
        assert_eq!(buf.len(), 3);

        let batch = buf.take_batch();
        assert_eq!(batch.len(), 3);
        assert!(buf.is_empty());
    }

    #[test]
    fn push_signals_at_max_batch_size() {
        let mut buf = LogBuffer::new(3);
        assert!(!buf.push(make_entry("log1")));
        assert!(!buf.push(make_entry("log2")));
        assert!(buf.push(make_entry("log3"))); // 크기 트리거
    }

    #[test]
    fn fifo_order_preserved() {
        let mut buf = LogBuffer::new(100);
        for i in 0..5 {
            buf.push(make_entry(&format!("log{i}")));
        }
        let batch = buf.take_batch();
        for (i, entry) in batch.iter().enumerate() {
            assert_eq!(entry.args[0], json!(format!("log{i}")));
        }
    }

    #[test]
    fn take_batch_on_empty_returns_empty() {
        let mut buf = LogBuffer::new(100);
        let batch = buf.take_batch();
        assert!(batch.is_empty());
        assert_eq!(buf.batches_taken(), 0); // 빈 인출은 배치로 세지 않음
    }

    #[test]
    fn entries_after_take_start_fresh_queue() {
        let mut buf = LogBuffer::new(100);
        buf.push(make_entry("first"));
        let batch1 = buf.take_batch();
        assert_eq!(batch1.len(), 1);

        buf.push(make_entry("second"));
        let batch2 = buf.take_batch();
        assert_eq!(batch2.len(), 1);
        assert_eq!(batch2[0].args[0], json!("second"));
    }

    #[test]
    fn counters_track_recorded_and_taken() {
        let mut buf = LogBuffer::new(100);
        buf.push(make_entry("1"));
        buf.push(make_entry("2"));
        buf.take_batch();
        buf.push(make_entry("3"));
        buf.take_batch();

        assert_eq!(buf.total_recorded(), 3);
        assert_eq!(buf.batches_taken(), 2);
    }
}
