use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeorefError {
    #[error("malformed record at line {line}, byte {offset}: {content:?}")]
    MalformedRecord {
        line: usize,
        /// Byte offset of the field that failed to parse.
        offset: usize,
        content: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GeorefError {
    pub fn malformed(line: usize, offset: usize, content: &str) -> Self {
        Self::MalformedRecord {
            line,
            offset,
            content: content.to_string(),
        }
    }
}
