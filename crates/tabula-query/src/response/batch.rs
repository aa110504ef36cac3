use super::{AnyResponse, ResponseKind, parse_root};
use crate::error::{Error, Result};
use serde_json::Value;
use tracing::{debug, trace};

/// The answer to a batched request.
///
/// The payload is an object keyed by the synthetic batch keys (`q0`, `q1`,
/// ...), each holding a complete sub-response. Sub-responses are decoded
/// with the parser recorded for their key and kept in queue order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse {
    json: String,
    responses: Vec<(String, AnyResponse)>,
}

impl BatchResponse {
    /// Parses a batched payload against the queued `(key, kind)` pairs.
    ///
    /// Keys in the payload that were never queued are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSubResponse`] if a queued key has no
    /// sub-payload, or the sub-parser's error if one is malformed.
    pub fn parse(json: impl Into<String>, requests: &[(String, ResponseKind)]) -> Result<Self> {
        let json = json.into();
        let root = parse_root(&json)?;

        let mut responses = Vec::with_capacity(requests.len());
        for (key, kind) in requests {
            let sub = match root.get(key) {
                Some(sub @ Value::Object(_)) => sub.to_string(),
                Some(_) => return Err(Error::unexpected(key.clone(), "object")),
                None => return Err(Error::MissingSubResponse { key: key.clone() }),
            };
            trace!(key = %key, kind = kind.as_str(), "dispatching sub-response");
            responses.push((key.clone(), kind.parse(sub)?));
        }

        debug!(count = responses.len(), "parsed batch response");
        Ok(Self { json, responses })
    }

    /// The raw batched payload.
    #[must_use]
    pub fn json(&self) -> &str {
        &self.json
    }

    /// Sub-responses in queue order, with their batch keys.
    #[must_use]
    pub fn responses(&self) -> &[(String, AnyResponse)] {
        &self.responses
    }

    /// The sub-response for one batch key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AnyResponse> {
        self.responses
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, response)| response)
    }

    /// Number of sub-responses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Returns true if nothing was batched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Consumes the batch, returning the sub-responses in queue order.
    #[must_use]
    pub fn into_responses(self) -> Vec<AnyResponse> {
        self.responses
            .into_iter()
            .map(|(_, response)| response)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    fn keys(pairs: &[(&str, ResponseKind)]) -> Vec<(String, ResponseKind)> {
        pairs.iter().map(|(k, kind)| ((*k).to_string(), *kind)).collect()
    }

    const BATCH: &str = r#"{
        "q0": {"version":"3","status":"ok","response":{"included_rows":1,"data":[{"name":"A"}]}},
        "q1": {"version":"3","status":"ok","response":{"data":{"region":{"ca":3}}}},
        "q9": {"version":"3","status":"ok"}
    }"#;

    #[test]
    fn dispatches_each_key_to_its_parser() {
        let batch = BatchResponse::parse(
            BATCH,
            &keys(&[("q0", ResponseKind::Read), ("q1", ResponseKind::Facet)]),
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.responses()[0].0, "q0");
        assert_eq!(batch.get("q0").unwrap().kind(), ResponseKind::Read);
        assert_eq!(batch.get("q0").unwrap().included_row_count(), 1);
        let facets = batch.get("q1").and_then(AnyResponse::as_facet).unwrap();
        assert_eq!(facets.counts("region").unwrap()["ca"], 3);
        assert!(batch.get("q9").is_none());
    }

    #[test]
    fn rejected_sub_request_keeps_the_others() {
        let batch = BatchResponse::parse(
            r#"{
                "q0": {"version":"3","status":"ok","response":{"included_rows":1,"data":[{"name":"A"}]}},
                "q1": {"version":"3","status":"error","error_type":"InvalidArgument","message":"bad filter"}
            }"#,
            &keys(&[("q0", ResponseKind::Read), ("q1", ResponseKind::Read)]),
        )
        .unwrap();

        let rows = batch.get("q0").and_then(AnyResponse::as_read).unwrap();
        assert_eq!(rows.map_strings("name"), vec![Some("A".to_string())]);
        let rejected = batch.get("q1").unwrap();
        assert_eq!(rejected.status(), "error");
        assert!(rejected.as_read().unwrap().rows().is_empty());
    }

    #[test]
    fn missing_sub_payload_is_an_error() {
        let err = BatchResponse::parse(BATCH, &keys(&[("q2", ResponseKind::Read)])).unwrap_err();
        assert!(matches!(err, Error::MissingSubResponse { ref key } if key == "q2"));
    }

    #[test]
    fn malformed_sub_payload_fails_the_batch() {
        let err = BatchResponse::parse(r#"{"q0":{"status":"ok"}}"#, &keys(&[("q0", ResponseKind::Raw)]))
            .unwrap_err();
        assert!(matches!(err, Error::MissingField { ref path } if path == "version"));
    }

    #[test]
    fn empty_queue_parses_to_empty_batch() {
        let batch = BatchResponse::parse("{}", &[]).unwrap();
        assert!(batch.is_empty());
    }
}
