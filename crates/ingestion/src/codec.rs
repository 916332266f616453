//! HttpLogRecord wire codec
//!
//! Messages are unpacked Cap'n Proto (segment table followed by segments)
//! whose root is the `HttpLogRecord` struct of `schema/http_log.capnp`.
//! Readers and builders are generated from that schema at build time.

use capnp::message::{Builder, ReaderOptions};
use capnp::serialize;
use contracts::HttpLogRecord;

use crate::error::DecodeError;
use crate::http_log_capnp::http_log_record;

/// Decode one message into a record
///
/// Fields missing from an older producer's layout read as zero or empty;
/// non-UTF-8 text is replaced lossily.
///
/// # Errors
/// Empty payload or any structural problem reported by the reader; the
/// caller skips the record.
pub fn decode(bytes: &[u8]) -> Result<HttpLogRecord, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut slice = bytes;
    let message = serialize::read_message_from_flat_slice(&mut slice, ReaderOptions::new())?;
    let root = message.get_root::<http_log_record::Reader>()?;

    Ok(HttpLogRecord {
        timestamp_epoch_milli: root.get_timestamp_epoch_milli(),
        resource_id: root.get_resource_id(),
        bytes_sent: root.get_bytes_sent(),
        request_time_milli: root.get_request_time_milli(),
        response_status: root.get_response_status(),
        cache_status: lossy(root.get_cache_status()?),
        method: lossy(root.get_method()?),
        remote_addr: lossy(root.get_remote_addr()?),
        url: lossy(root.get_url()?),
    })
}

fn lossy(text: capnp::text::Reader<'_>) -> String {
    String::from_utf8_lossy(text.as_bytes()).into_owned()
}

/// Encode a record as a single-segment message
///
/// Used by the mock source and fixtures.
pub fn encode(record: &HttpLogRecord) -> Vec<u8> {
    let mut message = Builder::new_default();
    {
        let mut root = message.init_root::<http_log_record::Builder>();
        root.set_timestamp_epoch_milli(record.timestamp_epoch_milli);
        root.set_resource_id(record.resource_id);
        root.set_bytes_sent(record.bytes_sent);
        root.set_request_time_milli(record.request_time_milli);
        root.set_response_status(record.response_status);
        // text blobs land after the struct in field order
        root.set_cache_status(record.cache_status.as_str());
        root.set_method(record.method.as_str());
        root.set_remote_addr(record.remote_addr.as_str());
        root.set_url(record.url.as_str());
    }
    serialize::write_message_to_words(&message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HttpLogRecord {
        HttpLogRecord {
            timestamp_epoch_milli: 1_700_000_123_456,
            resource_id: 42,
            bytes_sent: 1024,
            request_time_milli: 87,
            response_status: 200,
            cache_status: "HIT".into(),
            method: "GET".into(),
            remote_addr: "10.0.0.17".into(),
            url: "https://example.com/a?b=c".into(),
        }
    }

    fn words(bytes: &[u8]) -> Vec<u64> {
        bytes
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
            .collect()
    }

    fn to_bytes(words: &[u64]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    /// List pointer to a NUL-terminated byte blob `offset` words ahead
    fn text_pointer(offset: u64, len_with_nul: u64) -> u64 {
        (offset << 2) | 1 | (2 << 32) | (len_with_nul << 35)
    }

    /// A message laid out word by word as any Cap'n Proto producer emits it
    fn producer_fixture() -> Vec<u8> {
        to_bytes(&[
            // segment table: one segment of 14 words
            14 << 32,
            // root struct pointer: 5 data words, 4 pointers
            (5 << 32) | (4 << 48),
            1_700_000_000_000,
            7,
            512,
            35,
            503,
            text_pointer(3, 4),
            text_pointer(3, 4),
            text_pointer(3, 8),
            text_pointer(3, 2),
            u64::from_le_bytes(*b"HIT\0\0\0\0\0"),
            u64::from_le_bytes(*b"GET\0\0\0\0\0"),
            u64::from_le_bytes(*b"1.2.3.4\0"),
            u64::from_le_bytes(*b"/\0\0\0\0\0\0\0"),
        ])
    }

    fn fixture_record() -> HttpLogRecord {
        HttpLogRecord {
            timestamp_epoch_milli: 1_700_000_000_000,
            resource_id: 7,
            bytes_sent: 512,
            request_time_milli: 35,
            response_status: 503,
            cache_status: "HIT".into(),
            method: "GET".into(),
            remote_addr: "1.2.3.4".into(),
            url: "/".into(),
        }
    }

    #[test]
    fn test_decodes_producer_bytes() {
        assert_eq!(decode(&producer_fixture()).unwrap(), fixture_record());
    }

    #[test]
    fn test_encoder_matches_producer_layout() {
        assert_eq!(encode(&fixture_record()), producer_fixture());
    }

    #[test]
    fn test_decode_encoded_record() {
        let record = sample();
        assert_eq!(decode(&encode(&record)).unwrap(), record);
    }

    #[test]
    fn test_empty_strings_and_unicode() {
        let record = HttpLogRecord {
            cache_status: String::new(),
            url: "https://例え.jp/päth".into(),
            ..sample()
        };
        assert_eq!(decode(&encode(&record)).unwrap(), record);
    }

    #[test]
    fn test_null_text_pointer_reads_empty() {
        let mut w = words(&producer_fixture());
        // pointer 0 (cacheStatus) is segment word 6, payload word 7
        w[7] = 0;
        let decoded = decode(&to_bytes(&w)).unwrap();
        assert_eq!(decoded.cache_status, "");
        assert_eq!(decoded.method, "GET");
    }

    #[test]
    fn test_short_data_section_reads_zero() {
        // root struct with 1 data word, no pointers
        let w = [2u64 << 32, 1u64 << 32, 7];
        let decoded = decode(&to_bytes(&w)).unwrap();
        assert_eq!(decoded.timestamp_epoch_milli, 7);
        assert_eq!(decoded.resource_id, 0);
        assert_eq!(decoded.response_status, 0);
        assert_eq!(decoded.url, "");
    }

    #[test]
    fn test_null_root_is_default_record() {
        let w = [1u64 << 32, 0];
        assert_eq!(decode(&to_bytes(&w)).unwrap(), HttpLogRecord::default());
    }

    #[test]
    fn test_far_pointer_to_second_segment() {
        let single = words(&encode(&sample()));
        let body = &single[1..];

        // header [count-1, size0, size1, pad]; segment 0 holds a far pointer
        // to word 0 of segment 1, whose root pointer doubles as landing pad
        let mut w = vec![1u64 | 1u64 << 32, body.len() as u64, 2u64 | 1u64 << 32];
        w.extend_from_slice(body);

        assert_eq!(decode(&to_bytes(&w)).unwrap(), sample());
    }

    #[test]
    fn test_rejects_truncated_payloads() {
        assert_eq!(decode(&[]), Err(DecodeError::Empty));
        assert!(matches!(decode(&[0, 0]), Err(DecodeError::Malformed(_))));

        let bytes = producer_fixture();
        let truncated = &bytes[..bytes.len() - 8];
        assert!(matches!(decode(truncated), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_rejects_out_of_bounds_root() {
        // struct pointer with offset 10 in a 2-word segment
        let w = [2u64 << 32, (10u64 << 2) | 5u64 << 32, 0];
        assert!(matches!(decode(&to_bytes(&w)), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_rejects_list_root() {
        let w = [1u64 << 32, 1 | 2u64 << 32];
        assert!(matches!(decode(&to_bytes(&w)), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_rejects_unterminated_text() {
        let mut bytes = producer_fixture();
        // cacheStatus "HIT\0" is the first blob, right after the pointer section
        let blob_start = 8 + 10 * 8;
        assert_eq!(&bytes[blob_start..blob_start + 4], b"HIT\0");
        bytes[blob_start + 3] = b'!';
        assert!(matches!(decode(&bytes), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut bytes = producer_fixture();
        let blob_start = 8 + 10 * 8;
        bytes[blob_start] = 0xff;
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.cache_status, "\u{fffd}IT");
    }
}
