use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use tracing::{debug, warn};
use tunnel_core::{Binding, ShortCode};

/// One line of the link log.
///
/// On-disk format, one JSON object per line:
/// ```text
/// {"op":"put","code":"abc123","url":"https://example.com","created_at":1700000000,"expires_at":null}
/// ```
/// Unknown fields are ignored. Lines with an unknown `op` fail to parse and
/// are skipped by [`replay`] like any other malformed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum LogRecord {
    Put(PutRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPutRecord")]
pub struct PutRecord {
    pub code: String,
    pub url: String,
    #[serde(serialize_with = "jiff::fmt::serde::timestamp::second::optional::serialize")]
    pub created_at: Option<Timestamp>,
    #[serde(serialize_with = "jiff::fmt::serde::timestamp::second::optional::serialize")]
    pub expires_at: Option<Timestamp>,
}

/// Wire shape of a put record.
///
/// The tagged enum buffers its content before deserializing the variant,
/// which turns `null` into a unit value that jiff's optional timestamp
/// visitor rejects. Plain integers survive the buffering; they are range
/// checked when converted.
#[derive(Deserialize)]
struct RawPutRecord {
    code: String,
    url: String,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
}

impl TryFrom<RawPutRecord> for PutRecord {
    type Error = String;

    fn try_from(raw: RawPutRecord) -> Result<Self, Self::Error> {
        let second = |value: Option<i64>, field: &str| {
            value
                .map(Timestamp::from_second)
                .transpose()
                .map_err(|e| format!("{field} out of range: {e}"))
        };
        Ok(Self {
            created_at: second(raw.created_at, "created_at")?,
            expires_at: second(raw.expires_at, "expires_at")?,
            code: raw.code,
            url: raw.url,
        })
    }
}

impl From<&Binding> for LogRecord {
    fn from(binding: &Binding) -> Self {
        LogRecord::Put(PutRecord {
            code: binding.code.as_str().to_owned(),
            url: binding.url.clone(),
            created_at: Some(binding.created_at),
            expires_at: binding.expires_at,
        })
    }
}

impl PutRecord {
    /// Converts the record into a binding, stamping `now` when the record
    /// carries no creation time.
    pub fn into_binding(self, now: Timestamp) -> Binding {
        let created_at = self
            .created_at
            .unwrap_or_else(|| Timestamp::from_second(now.as_second()).unwrap_or(now));
        Binding {
            code: ShortCode::new_unchecked(self.code),
            url: self.url,
            created_at,
            expires_at: self.expires_at,
        }
    }
}

/// The valid records of a log, in file order.
#[derive(Debug, Default)]
pub struct Replay {
    pub records: Vec<LogRecord>,
    /// Number of non-blank lines that failed to parse.
    pub skipped: usize,
    /// The log does not end with a newline, typically after a crash mid-append.
    pub torn_tail: bool,
}

/// Reads every line of a link log, keeping the records that parse.
///
/// Blank lines are ignored. Malformed lines, including invalid UTF-8, are
/// logged and skipped. Only failures of the reader itself are returned.
pub fn replay<R: BufRead>(mut reader: R) -> io::Result<Replay> {
    let mut replay = Replay::default();
    let mut line = Vec::new();
    let mut line_no = 0usize;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_no += 1;
        replay.torn_tail = line.last() != Some(&b'\n');

        let text = line.trim_ascii();
        if text.is_empty() {
            continue;
        }

        match serde_json::from_slice::<LogRecord>(text) {
            Ok(record) => replay.records.push(record),
            Err(error) => {
                replay.skipped += 1;
                warn!(line = line_no, %error, "skipping malformed link log line");
            }
        }
    }

    debug!(
        records = replay.records.len(),
        skipped = replay.skipped,
        torn_tail = replay.torn_tail,
        "link log replay finished"
    );
    Ok(replay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn at(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    #[test]
    fn put_serializes_with_op_tag() {
        let binding = Binding {
            code: ShortCode::new_unchecked("abc123"),
            url: "https://example.com".to_string(),
            created_at: at(1_700_000_000),
            expires_at: None,
        };

        let line = serde_json::to_string(&LogRecord::from(&binding)).unwrap();
        assert_eq!(
            line,
            r#"{"op":"put","code":"abc123","url":"https://example.com","created_at":1700000000,"expires_at":null}"#
        );
    }

    #[test]
    fn parses_record_with_extra_fields() {
        let line = r#"{"op":"put","code":"a","url":"https://a.com","created_at":5,"expires_at":9,"by":"ops"}"#;
        let record: LogRecord = serde_json::from_str(line).unwrap();
        assert_eq!(
            record,
            LogRecord::Put(PutRecord {
                code: "a".to_string(),
                url: "https://a.com".to_string(),
                created_at: Some(at(5)),
                expires_at: Some(at(9)),
            })
        );
    }

    #[test]
    fn parses_record_without_expiry() {
        let line = r#"{"op":"put","code":"a","url":"https://a.com","created_at":1,"expires_at":null}"#;
        let LogRecord::Put(put) = serde_json::from_str::<LogRecord>(line).unwrap();
        assert_eq!(put.created_at, Some(at(1)));
        assert_eq!(put.expires_at, None);

        // what save writes for a binding without ttl must read back
        let binding = put.clone().into_binding(at(100));
        let written = serde_json::to_string(&LogRecord::from(&binding)).unwrap();
        assert_eq!(written, line);
    }

    #[test]
    fn rejects_out_of_range_expiry() {
        let line = r#"{"op":"put","code":"a","url":"https://a.com","expires_at":99999999999999}"#;
        assert!(serde_json::from_str::<LogRecord>(line).is_err());
    }

    #[test]
    fn missing_timestamps_are_optional() {
        let line = r#"{"op":"put","code":"a","url":"https://a.com"}"#;
        let LogRecord::Put(put) = serde_json::from_str::<LogRecord>(line).unwrap();
        assert_eq!(put.created_at, None);
        assert_eq!(put.expires_at, None);

        let binding = put.into_binding(Timestamp::new(42, 500).unwrap());
        assert_eq!(binding.created_at, at(42));
    }

    #[test]
    fn replay_skips_malformed_lines() {
        let log = concat!(
            r#"{"op":"put","code":"a","url":"https://a.com","created_at":1,"expires_at":null}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"op":"delete","code":"a"}"#,
            "\n",
            r#"{"op":"put","code":"b"}"#,
            "\n",
            r#"{"op":"put","code":"c","url":"https://c.com","created_at":99999999999999}"#,
            "\n",
            r#"{"op":"put","code":"d","url":"https://d.com","created_at":2,"expires_at":null}"#,
            "\n",
        );

        let replayed = replay(Cursor::new(log)).unwrap();
        let codes: Vec<_> = replayed
            .records
            .iter()
            .map(|LogRecord::Put(put)| put.code.as_str())
            .collect();
        assert_eq!(codes, ["a", "d"]);
        assert_eq!(replayed.skipped, 4);
        assert!(!replayed.torn_tail);
    }

    #[test]
    fn replay_tolerates_invalid_utf8() {
        let mut log = b"\xff\xfe garbage\n".to_vec();
        log.extend_from_slice(br#"{"op":"put","code":"a","url":"https://a.com"}"#);
        log.push(b'\n');

        let replayed = replay(Cursor::new(log)).unwrap();
        assert_eq!(replayed.records.len(), 1);
        assert_eq!(replayed.skipped, 1);
    }

    #[test]
    fn replay_detects_torn_tail() {
        let log = concat!(
            r#"{"op":"put","code":"a","url":"https://a.com"}"#,
            "\n",
            r#"{"op":"put","code":"b","ur"#,
        );

        let replayed = replay(Cursor::new(log)).unwrap();
        assert_eq!(replayed.records.len(), 1);
        assert_eq!(replayed.skipped, 1);
        assert!(replayed.torn_tail);
    }

    #[test]
    fn replay_empty_input() {
        let replayed = replay(Cursor::new("")).unwrap();
        assert!(replayed.records.is_empty());
        assert!(!replayed.torn_tail);
    }
}
