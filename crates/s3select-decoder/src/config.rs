use s3select_wire::FrameLimits;
use tokio_util::sync::CancellationToken;

/// Settings shared by [`SelectDecoder`](crate::SelectDecoder) and
/// [`StreamingDecoder`](crate::StreamingDecoder).
///
/// ```rust
/// use s3select_decoder::DecoderConfig;
/// use s3select_wire::FrameLimits;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let config = DecoderConfig::default()
///     .with_limits(FrameLimits { max_message_len: 1 << 20, max_headers_len: 4096 })
///     .with_cancellation(token.clone());
/// assert!(config.cancellation.is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct DecoderConfig {
    /// Bounds applied to every prelude before its lengths are trusted.
    pub limits: FrameLimits,
    /// Checked once per message; when cancelled the decode fails with
    /// [`DecodeError::Cancelled`](crate::DecodeError::Cancelled).
    pub cancellation: Option<CancellationToken>,
}

impl DecoderConfig {
    #[must_use]
    pub fn with_limits(mut self, limits: FrameLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
