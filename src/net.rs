//! Dataset fetch.
//!
//! The exchange runs on its own thread with a current-thread tokio runtime;
//! the result comes back over a channel polled from the frame loop, which
//! shows its loading state in the meantime. There is no cooperative
//! cancellation: a failed fetch is terminal for the attempt.

use crate::data::types::{DataEnvelope, Point3};
use crate::error::ViewerError;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::thread;

pub type FetchResult = Result<Vec<Point3>, ViewerError>;

/// Spawns the fetch thread; the outcome arrives on `tx` exactly once.
pub fn spawn_fetch(url: String, tx: Sender<FetchResult>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async move {
            let result = fetch_dataset(&url).await;
            match &result {
                Ok(points) => log::info!("Data loaded: {} points", points.len()),
                Err(e) => log::error!("Data fetch failed: {e}"),
            }
            let _ = tx.send(result);
        });
    })
}

/// Non-blocking check of the fetch channel; `None` while the exchange is
/// still in flight. A hangup without a result reads as a load failure, so
/// the caller always ends up with exactly one outcome.
pub fn poll_fetch(rx: &Receiver<FetchResult>) -> Option<FetchResult> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => Some(Err(ViewerError::DataLoad(
            "fetch thread terminated unexpectedly".into(),
        ))),
    }
}

/// GET the envelope and validate it. Non-2xx or transport trouble is a load
/// failure; a `success: false` envelope or missing payload is a format
/// failure. Partial data is never returned.
pub async fn fetch_dataset(url: &str) -> FetchResult {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ViewerError::DataLoad(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        // The endpoint may still carry an envelope with a reason; prefer it.
        let reason = response
            .json::<DataEnvelope>()
            .await
            .ok()
            .and_then(|env| env.error)
            .unwrap_or_else(|| status.to_string());
        return Err(ViewerError::DataLoad(format!("status {status}: {reason}")));
    }

    let envelope: DataEnvelope = response
        .json()
        .await
        .map_err(|e| ViewerError::DataFormat(e.to_string()))?;

    validate_envelope(envelope)
}

/// Envelope contract: `success` must be true and `data` present; anything
/// else is rejected rather than rendered partially.
pub fn validate_envelope(envelope: DataEnvelope) -> FetchResult {
    if !envelope.success {
        return Err(ViewerError::DataFormat(
            envelope.error.unwrap_or_else(|| "Failed to load data".into()),
        ));
    }

    let data = envelope
        .data
        .ok_or_else(|| ViewerError::DataFormat("success envelope without data".into()))?;

    if let Some(count) = envelope.count {
        if count as usize != data.len() {
            log::warn!(
                "Envelope count {} disagrees with payload length {}",
                count,
                data.len()
            );
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> DataEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn success_envelope_passes_through() {
        let data = validate_envelope(envelope(
            r#"{"success": true, "data": [{"x":1,"y":2,"z":3}], "count": 1}"#,
        ))
        .unwrap();
        assert_eq!(data, vec![Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn failure_envelope_is_a_format_error() {
        let err = validate_envelope(envelope(
            r#"{"success": false, "error": "Data file not found"}"#,
        ))
        .unwrap_err();
        match err {
            ViewerError::DataFormat(msg) => assert_eq!(msg, "Data file not found"),
            other => panic!("expected DataFormat, got {other:?}"),
        }
    }

    #[test]
    fn failure_without_message_gets_a_default() {
        let err = validate_envelope(envelope(r#"{"success": false}"#)).unwrap_err();
        assert!(matches!(err, ViewerError::DataFormat(_)));
    }

    #[test]
    fn success_without_data_is_rejected() {
        let err = validate_envelope(envelope(r#"{"success": true, "count": 3}"#)).unwrap_err();
        assert!(matches!(err, ViewerError::DataFormat(_)));
    }

    #[test]
    fn count_mismatch_is_tolerated() {
        // Logged, not fatal: the payload is authoritative.
        let data = validate_envelope(envelope(
            r#"{"success": true, "data": [{"x":0,"y":0,"z":0}], "count": 99}"#,
        ))
        .unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn poll_reports_in_flight_then_delivers_once() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        // Nothing arrived yet: the loading state persists.
        assert!(poll_fetch(&rx).is_none());

        tx.send(Ok(vec![Point3::new(1.0, 2.0, 3.0)])).unwrap();
        let data = poll_fetch(&rx).unwrap().unwrap();
        assert_eq!(data, vec![Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn poll_turns_a_hangup_into_a_load_failure() {
        let (tx, rx) = crossbeam_channel::bounded::<FetchResult>(1);
        drop(tx);
        let err = poll_fetch(&rx).unwrap().unwrap_err();
        assert!(matches!(err, ViewerError::DataLoad(_)));
    }

    #[test]
    fn empty_dataset_is_valid() {
        let data =
            validate_envelope(envelope(r#"{"success": true, "data": [], "count": 0}"#)).unwrap();
        assert!(data.is_empty());
    }
}
