use serde::Serialize;
use serde_json::Value;
use trickle::{SimpleEvent, SourceBuffer, TimestampedSourceBuffer};

/// Any item one of the driven sources can emit.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Item {
    Event(SimpleEvent),
    Long(i64),
    Value(Value),
}

/// One output line.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub worker: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub item: Item,
}

/// Collects the items of one poll, tagged with the emitting worker.
#[derive(Debug)]
pub struct RecordBuffer {
    worker: usize,
    records: Vec<Record>,
    closed: bool,
}

impl RecordBuffer {
    pub const fn new(worker: usize) -> Self {
        Self {
            worker,
            records: Vec::new(),
            closed: false,
        }
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn take(&mut self) -> Vec<Record> {
        core::mem::take(&mut self.records)
    }

    fn push(&mut self, item: Item, timestamp: Option<i64>) {
        self.records.push(Record {
            worker: self.worker,
            timestamp,
            item,
        });
    }
}

impl TimestampedSourceBuffer<SimpleEvent> for RecordBuffer {
    fn add(&mut self, item: SimpleEvent, timestamp_millis: i64) {
        self.push(Item::Event(item), Some(timestamp_millis));
    }
}

impl TimestampedSourceBuffer<i64> for RecordBuffer {
    fn add(&mut self, item: i64, timestamp_millis: i64) {
        self.push(Item::Long(item), Some(timestamp_millis));
    }
}

impl SourceBuffer<Value> for RecordBuffer {
    fn add(&mut self, item: Value) {
        self.push(Item::Value(item), None);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_serialize_flat() {
        let mut buf = RecordBuffer::new(3);
        TimestampedSourceBuffer::add(&mut buf, SimpleEvent::new(200, 1), 200);
        TimestampedSourceBuffer::add(&mut buf, 7_i64, 400);
        SourceBuffer::add(&mut buf, json!("x"));
        buf.close();

        let lines: Vec<Value> = buf
            .take()
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect();

        assert_eq!(
            lines,
            [
                json!({ "worker": 3, "timestamp": 200, "item": { "timestamp": 200, "sequence": 1 } }),
                json!({ "worker": 3, "timestamp": 400, "item": 7 }),
                json!({ "worker": 3, "item": "x" }),
            ]
        );
        assert!(buf.is_closed());
        assert!(buf.is_empty());
    }
}
