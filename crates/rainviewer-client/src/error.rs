// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types shared by every stage of a radar snapshot run.

use std::fmt;

use thiserror::Error;

/// Broad classification of a [`RadarError`], used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Response,
    MalformedData,
    Render,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::Response => "response",
            Self::MalformedData => "malformed data",
            Self::Render => "render",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while fetching or rendering radar imagery.
#[derive(Debug, Error)]
pub enum RadarError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{status} from {url}")]
    Response {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The payload did not have the expected structure.
    #[error("malformed data: {0}")]
    MalformedData(String),

    /// Drawing, encoding or writing the output image failed.
    #[error("render failed: {0}")]
    Render(String),
}

impl RadarError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Response { .. } => ErrorKind::Response,
            Self::MalformedData(_) => ErrorKind::MalformedData,
            Self::Render(_) => ErrorKind::Render,
        }
    }

    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            source,
        }
    }
}

impl From<image::ImageError> for RadarError {
    fn from(err: image::ImageError) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<std::io::Error> for RadarError {
    fn from(err: std::io::Error) -> Self {
        Self::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = RadarError::MalformedData("radar.past is empty".to_string());
        assert_eq!(err.kind(), ErrorKind::MalformedData);

        let err = RadarError::Response {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            url: "https://api.rainviewer.com/public/weather-maps.json".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Response);
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_io_error_is_render_kind() {
        let err: RadarError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert_eq!(err.kind(), ErrorKind::Render);
        assert!(err.to_string().contains("read-only"));
    }
}
