use std::num::ParseIntError;

/// Faults that end a capture session.
///
/// Frames that merely fail to look like RTP are not errors, see
/// [`crate::classifier::DecodeReject`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open capture on {device}: {source}")]
    CaptureOpen {
        device: String,
        #[source]
        source: pcap::Error,
    },

    #[error("capture read failed: {0}")]
    CaptureRead(#[source] pcap::Error),

    #[error("invalid {layer} {field} {value:?}: {source}")]
    Extraction {
        layer: &'static str,
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to persist rtp packet: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub fn capture_open<T>(device: T, source: pcap::Error) -> Self
    where
        T: ToString,
    {
        Error::CaptureOpen {
            device: device.to_string(),
            source,
        }
    }

    pub fn persistence(err: anyhow::Error) -> Self {
        Error::Persistence(err.into())
    }
}
