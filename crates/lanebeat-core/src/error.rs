use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid chart: {0}")]
    InvalidChart(String),

    #[error("Invalid lane {lane}: chart has {lane_count} lanes")]
    InvalidLane { lane: u8, lane_count: u8 },

    #[error("Clock went backwards: tick at {time}s after {last}s")]
    NonMonotonicTick { time: f64, last: f64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown song: {0}")]
    UnknownSong(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidLane {
            lane: 5,
            lane_count: 4,
        };
        assert_eq!(err.to_string(), "Invalid lane 5: chart has 4 lanes");

        let err = Error::NonMonotonicTick {
            time: 1.0,
            last: 2.0,
        };
        assert_eq!(err.to_string(), "Clock went backwards: tick at 1s after 2s");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
