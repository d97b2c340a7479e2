/// Core error type for the bot.
///
/// Adapter crates map their specific failures into this type so the pipeline
/// can handle them consistently, and so each error kind carries its own
/// user-facing message (no generic catch-all text).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// A download returned a non-success HTTP status.
    #[error("transfer failed: http status {status}")]
    Transfer { status: u16 },

    /// Network-layer failure, propagated unchanged from the HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The conversion service rejected the input or returned no output.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// The local rasterization tool failed.
    #[error("rasterization error: {0}")]
    Raster(String),

    /// Attachment mime type we do not handle.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// An external API answered with an unexpected shape.
    #[error("unexpected response: {0}")]
    BadResponse(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// User-facing message for this error kind, sent to the chat on failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Config(_) => "⚠️ The bot is missing configuration for this feature.",
            Error::Transfer { .. } | Error::Network(_) => {
                "❌ Error downloading the PDF. Please check the URL and try again."
            }
            Error::Conversion(_) => "❌ PDF to PPTX conversion failed. Please try again later.",
            Error::Raster(_) => "❌ PDF to image conversion failed. Please try again later.",
            Error::UnsupportedType(_) => "❌ Unsupported file type. Only PDF files are handled.",
            Error::BadResponse(_) => {
                "❌ The external service returned an unexpected response. Please try again."
            }
            Error::Io(_) | Error::External(_) => {
                "❌ Something went wrong while processing your request. Please try again."
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_kind_specific() {
        let transfer = Error::Transfer { status: 404 };
        let conversion = Error::Conversion("no converted files".into());
        let raster = Error::Raster("pdftoppm exited with 1".into());
        assert_ne!(transfer.user_message(), conversion.user_message());
        assert_ne!(conversion.user_message(), raster.user_message());
    }

    #[test]
    fn transfer_error_carries_status() {
        let e = Error::Transfer { status: 503 };
        assert!(e.to_string().contains("503"));
    }
}
