use crate::envelope::DecodedUplink;
use crate::error::{DomainError, DomainResult};
use crate::normalizer;
use crate::repository::DecodedUplinkSink;
use crate::uplink_decoder::UplinkDecoder;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Domain service that runs raw envelope records through the decode pipeline
///
/// Flow:
/// 1. Normalize the envelope to a canonical uplink (skip when no shape matches)
/// 2. Decode the binary payload via the decoder trait (skip when undecodable)
/// 3. Parse the envelope timestamp (failure tolerated)
/// 4. Publish the decoded uplink via the sink trait
pub struct UplinkService {
    decoder: Arc<dyn UplinkDecoder>,
    sink: Arc<dyn DecodedUplinkSink>,
}

impl UplinkService {
    /// Create a new UplinkService with dependencies
    pub fn new(decoder: Arc<dyn UplinkDecoder>, sink: Arc<dyn DecodedUplinkSink>) -> Self {
        Self { decoder, sink }
    }

    /// Process one raw envelope record
    ///
    /// Returns the published uplink, or `None` when the record was skipped.
    /// Only sink failures are errors; unmatched envelopes and undecodable
    /// payloads are skips.
    pub async fn process_record(&self, record: &Value) -> DomainResult<Option<DecodedUplink>> {
        let Some(uplink) = normalizer::normalize(record) else {
            debug!("Skipping record that matches no known envelope shape");
            return Ok(None);
        };

        debug!(
            port = uplink.port,
            payload_size = uplink.payload.len(),
            "Decoding canonical uplink"
        );

        let decoded = match self.decoder.decode_uplink(uplink.port, &uplink.payload) {
            Ok(value) => value,
            Err(DomainError::PayloadDecodeError(reason)) => {
                debug!(port = uplink.port, %reason, "Skipping undecodable payload");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let data = match decoded {
            Value::Object(map) => map,
            other => {
                warn!(port = uplink.port, ?other, "Decoder did not return a JSON object");
                return Ok(None);
            }
        };

        let decoded_uplink = DecodedUplink {
            occurred_at: parse_received_at(uplink.received_at.as_deref()),
            port: uplink.port,
            data,
        };

        self.sink.publish(&decoded_uplink).await?;

        info!(
            port = decoded_uplink.port,
            field_count = decoded_uplink.data.len(),
            "Published decoded uplink"
        );

        Ok(Some(decoded_uplink))
    }

    /// Process records strictly in input order
    ///
    /// Output order equals the relative order of the source records that
    /// produced output. Returns the number published.
    pub async fn process_batch(&self, records: &[Value]) -> DomainResult<usize> {
        let mut published = 0;
        for record in records {
            if self.process_record(record).await?.is_some() {
                published += 1;
            }
        }
        Ok(published)
    }
}

fn parse_received_at(received_at: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = received_at?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            debug!(raw, error = %e, "Could not parse envelope timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockDecodedUplinkSink;
    use crate::uplink_decoder::MockUplinkDecoder;
    use chrono::TimeZone;
    use serde_json::json;

    fn legacy_record() -> Value {
        json!({
            "port": 5,
            "payload_raw": "AQID",
            "metadata": { "time": "2021-03-01T04:12:07Z" }
        })
    }

    #[tokio::test]
    async fn test_process_record_success() {
        let mut mock_decoder = MockUplinkDecoder::new();
        let mut mock_sink = MockDecodedUplinkSink::new();

        mock_decoder
            .expect_decode_uplink()
            .withf(|port: &u32, payload: &[u8]| *port == 5 && payload == &[1, 2, 3])
            .times(1)
            .return_once(|_, _| Ok(json!({"rtc": 1, "command": 0})));

        mock_sink
            .expect_publish()
            .withf(|uplink: &DecodedUplink| {
                uplink.port == 5
                    && uplink.data.contains_key("rtc")
                    && uplink.occurred_at
                        == Some(chrono::Utc.with_ymd_and_hms(2021, 3, 1, 4, 12, 7).unwrap())
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = UplinkService::new(Arc::new(mock_decoder), Arc::new(mock_sink));

        let result = service.process_record(&legacy_record()).await;

        let published = result.unwrap().unwrap();
        assert_eq!(published.port, 5);
        assert_eq!(published.data["command"], json!(0));
    }

    #[tokio::test]
    async fn test_process_record_unmatched_shape_is_skipped() {
        let mock_decoder = MockUplinkDecoder::new();
        let mock_sink = MockDecodedUplinkSink::new();

        let service = UplinkService::new(Arc::new(mock_decoder), Arc::new(mock_sink));

        let result = service.process_record(&json!({"dev_id": "probe-3"})).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_process_record_undecodable_payload_is_skipped() {
        let mut mock_decoder = MockUplinkDecoder::new();
        let mock_sink = MockDecodedUplinkSink::new();

        mock_decoder
            .expect_decode_uplink()
            .times(1)
            .return_once(|_, _| {
                Err(DomainError::PayloadDecodeError(
                    "unsupported command: 2".to_string(),
                ))
            });

        let service = UplinkService::new(Arc::new(mock_decoder), Arc::new(mock_sink));

        let result = service.process_record(&legacy_record()).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_process_record_non_object_decode_is_skipped() {
        let mut mock_decoder = MockUplinkDecoder::new();
        let mock_sink = MockDecodedUplinkSink::new();

        mock_decoder
            .expect_decode_uplink()
            .times(1)
            .return_once(|_, _| Ok(json!(42)));

        let service = UplinkService::new(Arc::new(mock_decoder), Arc::new(mock_sink));

        let result = service.process_record(&legacy_record()).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_process_record_sink_error_propagates() {
        let mut mock_decoder = MockUplinkDecoder::new();
        let mut mock_sink = MockDecodedUplinkSink::new();

        mock_decoder
            .expect_decode_uplink()
            .times(1)
            .return_once(|_, _| Ok(json!({"rtc": 1})));

        mock_sink
            .expect_publish()
            .times(1)
            .return_once(|_| Err(DomainError::SinkError(anyhow::anyhow!("sink closed"))));

        let service = UplinkService::new(Arc::new(mock_decoder), Arc::new(mock_sink));

        let result = service.process_record(&legacy_record()).await;
        assert!(matches!(result, Err(DomainError::SinkError(_))));
    }

    #[tokio::test]
    async fn test_process_record_missing_timestamp_tolerated() {
        let mut mock_decoder = MockUplinkDecoder::new();
        let mut mock_sink = MockDecodedUplinkSink::new();

        mock_decoder
            .expect_decode_uplink()
            .times(1)
            .return_once(|_, _| Ok(json!({"rtc": 1})));

        mock_sink
            .expect_publish()
            .withf(|uplink: &DecodedUplink| uplink.occurred_at.is_none())
            .times(1)
            .return_once(|_| Ok(()));

        let service = UplinkService::new(Arc::new(mock_decoder), Arc::new(mock_sink));

        let record = json!({"port": 5, "payload_raw": "AQID"});
        let result = service.process_record(&record).await;
        assert!(result.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_process_batch_counts_published_records() {
        let mut mock_decoder = MockUplinkDecoder::new();
        let mut mock_sink = MockDecodedUplinkSink::new();

        mock_decoder
            .expect_decode_uplink()
            .times(2)
            .returning(|_, _| Ok(json!({"rtc": 1})));

        mock_sink.expect_publish().times(2).returning(|_| Ok(()));

        let service = UplinkService::new(Arc::new(mock_decoder), Arc::new(mock_sink));

        let records = vec![
            legacy_record(),
            json!({"dev_id": "not an uplink"}),
            legacy_record(),
        ];
        let published = service.process_batch(&records).await.unwrap();
        assert_eq!(published, 2);
    }

    #[test]
    fn test_parse_received_at() {
        let parsed = parse_received_at(Some("2022-06-10T22:00:05.123456789Z")).unwrap();
        assert_eq!(
            parsed,
            chrono::Utc
                .with_ymd_and_hms(2022, 6, 10, 22, 0, 5)
                .unwrap()
                + chrono::Duration::nanoseconds(123_456_789)
        );

        assert_eq!(parse_received_at(Some("yesterday-ish")), None);
        assert_eq!(parse_received_at(None), None);
    }
}
