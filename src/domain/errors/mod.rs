// Domain errors - Classified failures for every pipeline stage

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while invoking the prober or wrapping its output
#[derive(Error, Debug)]
pub enum ProbeError {
    /// A caller-supplied argument was rejected before anything ran
    #[error("Argument '{name}' received invalid value '{value}': {problem}")]
    InvalidArgument {
        name: &'static str,
        problem: &'static str,
        value: String,
    },

    /// Probe command override points at a file that does not exist
    #[error("Command override file-path does not exist: {0}")]
    OverrideNotFound(PathBuf),

    /// Probe executable could not be found
    #[error("Command executable was not found in path: {0}")]
    ExecutableNotFound(String),

    /// The OS refused to start the probe process
    #[error("Failed to launch '{cmd}': {source}")]
    Launch {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    /// Local media file does not exist
    #[error("Media file does not exist locally: {0}")]
    MediaFileNotFound(String),

    /// Probe output was not valid JSON
    #[error("Failed to parse probe output as JSON: {0}")]
    JsonParse(#[source] serde_json::Error),

    /// Probe exited with a non-zero status (or was killed)
    #[error("Subprocess {cmdline:?} returned non-zero exit status {}: {stderr}",
        describe_exit(.exit_code, .timed_out))]
    Subprocess {
        cmdline: Vec<String>,
        exit_code: Option<i32>,
        stderr: String,
        timed_out: bool,
    },

    /// A typed stream variant was built from data of another codec type
    #[error("{variant} is wrong stream variant for received codec type '{}' (required codec type is '{required}')",
        describe_codec_type(.received))]
    StreamTypeMismatch {
        variant: &'static str,
        received: Option<String>,
        required: &'static str,
    },
}

impl ProbeError {
    pub(crate) fn not_a_mapping(name: &'static str, value: &serde_json::Value) -> Self {
        ProbeError::InvalidArgument {
            name,
            problem: "Supplied parsed JSON is not a dictionary",
            value: value.to_string(),
        }
    }
}

/// Failures extracting flat track metadata from a probe result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no audio stream found")]
    NoAudioStream,

    #[error("audio stream {index:?} carries no tags")]
    MissingTags { index: Option<i64> },
}

/// Failures talking to the recording catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Catalog request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode catalog response: {source}; body: {body}")]
    ResponseParse {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("No catalog recording for ISRC {0}")]
    NotFound(String),

    #[error("Catalog recording is missing expected fields: {0}")]
    MalformedRecord(#[source] serde_json::Error),
}

/// Failures in the dedup store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open track store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("A row for ISRC {0} already exists")]
    Duplicate(String),

    #[error("Track store is closed")]
    Closed,
}

/// Failures enumerating the library
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Failures loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Why a single file did not make it into the store
///
/// Every variant is non-fatal: the run moves on to the next file.
#[derive(Error, Debug)]
pub enum TrackFailure {
    #[error("could not probe file: {0}")]
    Probe(#[from] ProbeError),

    #[error("could not read track metadata: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("track has no ISRC tag")]
    MissingIsrc,

    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),
}

fn describe_exit(exit_code: &Option<i32>, timed_out: &bool) -> String {
    let code = exit_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "<signal>".to_string());
    if *timed_out {
        format!("{} after timeout", code)
    } else {
        code
    }
}

fn describe_codec_type(received: &Option<String>) -> &str {
    received.as_deref().unwrap_or("<none>")
}
