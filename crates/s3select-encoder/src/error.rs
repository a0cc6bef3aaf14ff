use s3select_types::TypeError;
use s3select_wire::WireError;

/// Errors that can occur while building an event stream.
///
/// ```text
///   EncodeError
///   ├── EmptyStream          ← no messages were added before .encode()
///   ├── Wire(WireError)      ← header too long, message over 4 GiB
///   ├── Type(TypeError)      ← Progress/Stats XML rendering
///   └── Io(std::io::Error)   ← from the writer passed to .encode_to()
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("no messages have been added to the encoder")]
    EmptyStream,

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
