//! Codec for the on-device task cache.
//!
//! The cache blob is a plain JSON array of task records, rewritten wholesale
//! on every change to the in-memory list.

use crate::{error::Result, Error, Task};

/// Serialize a task list into a cache blob.
pub fn encode(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).map_err(|e| Error::InvalidCache(e.to_string()))
}

/// Parse a cache blob back into a task list.
pub fn decode(blob: &str) -> Result<Vec<Task>> {
    serde_json::from_str(blob).map_err(|e| Error::InvalidCache(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let tasks = vec![
            Task::new("2-b", "Second", "local", 2).with_notes("n"),
            Task::new("1-a", "First", "local", 1).with_due_date(10),
        ];

        let blob = encode(&tasks).unwrap();
        assert_eq!(decode(&blob).unwrap(), tasks);
    }

    #[test]
    fn empty_list_is_empty_array() {
        assert_eq!(encode(&[]).unwrap(), "[]");
        assert!(decode("[]").unwrap().is_empty());
    }

    #[test]
    fn corrupt_blob_is_rejected() {
        assert!(matches!(decode("{not json"), Err(Error::InvalidCache(_))));
        assert!(matches!(decode(r#"{"id":"x"}"#), Err(Error::InvalidCache(_))));
    }

    #[test]
    fn stable_encoding() {
        let tasks = vec![Task::new("1-a", "One", "local", 1)];
        assert_eq!(encode(&tasks).unwrap(), encode(&tasks).unwrap());
    }
}
