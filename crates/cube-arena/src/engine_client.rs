//! Client for the one-shot 4x4x4 engine executable.
//!
//! Every move is a separate process spawn: the request travels on the command
//! line and the reply is read from stdout once the process exits. Each spawn is
//! bounded by a timeout and the child is killed if the timeout fires.
//!
//! # Example
//!
//! ```no_run
//! use cube_arena::engine_client::{EngineClient, EngineTimeouts, MoveEngine};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EngineClient::new("./tttt", EngineTimeouts::default())?;
//! client.validate().await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use cube_core::{Board, BoardError, Side, Weights, WeightsError};
use cube_protocol::{MoveReply, MoveRequest, ProtocolError, HELP_FLAG, VALIDATION_WEIGHTS};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, trace};

/// The engine executable could not be used at all.
#[derive(Error, Debug)]
pub enum EngineNotFound {
    #[error("engine executable not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("engine executable is not executable: {}", .0.display())]
    NotExecutable(PathBuf),
}

/// Errors raised while requesting a move or playing a game.
///
/// Any of these is fatal to the tournament run; nothing is retried.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process or collect its output.
    #[error("failed to run engine: {0}")]
    Spawn(#[from] std::io::Error),
    /// The engine did not finish within the per-move limit.
    #[error("engine move timed out after {0:?}")]
    Timeout(Duration),
    /// The engine exited with a non-zero status.
    #[error("engine move failed with exit code {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },
    /// The engine's reply did not follow the protocol.
    #[error("invalid engine reply: {0}")]
    Protocol(#[from] ProtocolError),
    /// The board handed to the next move is inconsistent.
    #[error("invalid board state: {0}")]
    InconsistentBoard(#[from] BoardError),
    /// A move added anything other than exactly one mark.
    #[error("move did not add exactly one mark: {before} marks before, {after} after")]
    MarkCountMismatch { before: usize, after: usize },
    /// The whole game ran longer than its wall-clock budget.
    #[error("game exceeded maximum duration of {0:?}")]
    GameTimeout(Duration),
    /// Wraps the failure of a game with where it happened.
    #[error("game execution failed after {moves} moves in {elapsed_secs:.2}s: {source}")]
    GameFailed {
        moves: u32,
        elapsed_secs: f64,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Returns the innermost error, looking through [`EngineError::GameFailed`].
    pub fn root(&self) -> &EngineError {
        match self {
            EngineError::GameFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

/// The engine failed its sanity check.
#[derive(Error, Debug)]
pub enum EngineValidationError {
    #[error("engine help command failed with code {0:?}")]
    HelpFailed(Option<i32>),
    #[error("engine help command could not run: {0}")]
    HelpUnavailable(#[source] EngineError),
    #[error("engine tournament mode test failed: {0}")]
    MoveFailed(#[source] EngineError),
    #[error("invalid validation weights: {0}")]
    Weights(#[from] WeightsError),
}

/// Something that answers move requests.
///
/// [`EngineClient`] is the production implementation; tests drive the game
/// runner with in-process engines.
#[allow(async_fn_in_trait)]
pub trait MoveEngine {
    /// Performs a sanity check of the engine.
    async fn validate(&self) -> Result<(), EngineValidationError>;

    /// Requests one move and parses the reply.
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveReply, EngineError>;
}

/// Per-invocation time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTimeouts {
    /// Limit for the `--help` probe.
    pub help: Duration,
    /// Limit for a single move request.
    pub per_move: Duration,
}

impl Default for EngineTimeouts {
    fn default() -> Self {
        Self {
            help: Duration::from_secs(10),
            per_move: Duration::from_secs(30),
        }
    }
}

/// Spawns the engine executable once per request.
#[derive(Debug, Clone)]
pub struct EngineClient {
    path: PathBuf,
    timeouts: EngineTimeouts,
}

impl EngineClient {
    /// Creates a client after checking the executable exists.
    ///
    /// # Errors
    ///
    /// Returns [`EngineNotFound`] if the path does not exist or, on unix,
    /// carries no execute permission.
    pub fn new<P: Into<PathBuf>>(path: P, timeouts: EngineTimeouts) -> Result<Self, EngineNotFound> {
        let path = path.into();
        let metadata = std::fs::metadata(&path).map_err(|_| EngineNotFound::Missing(path.clone()))?;
        if !is_executable(&metadata) {
            return Err(EngineNotFound::NotExecutable(path));
        }
        Ok(Self { path, timeouts })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeouts(&self) -> EngineTimeouts {
        self.timeouts
    }

    async fn invoke(&self, args: &[String], limit: Duration) -> Result<Output, EngineError> {
        trace!(engine = %self.path.display(), ?args, "Spawning engine");
        let mut command = Command::new(&self.path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(limit, command.output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(EngineError::Timeout(limit)),
        }
    }
}

impl MoveEngine for EngineClient {
    async fn validate(&self) -> Result<(), EngineValidationError> {
        let help = self
            .invoke(&[HELP_FLAG.to_string()], self.timeouts.help)
            .await
            .map_err(EngineValidationError::HelpUnavailable)?;
        match help.status.code() {
            Some(0) | Some(1) => {}
            code => return Err(EngineValidationError::HelpFailed(code)),
        }

        let weights = Weights::new(&VALIDATION_WEIGHTS)?;
        let request = MoveRequest::new(Side::Second, Board::empty(), weights);
        let reply = self
            .request_move(&request)
            .await
            .map_err(EngineValidationError::MoveFailed)?;
        reply
            .verify_placed()
            .map_err(|e| EngineValidationError::MoveFailed(e.into()))?;

        debug!(engine = %self.path.display(), move_number = reply.move_number, "Engine validated");
        Ok(())
    }

    async fn request_move(&self, request: &MoveRequest) -> Result<MoveReply, EngineError> {
        let output = self.invoke(&request.args(), self.timeouts.per_move).await?;
        if !output.status.success() {
            return Err(EngineError::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!(side = %request.side, reply = %stdout.trim(), "Engine replied");
        Ok(MoveReply::parse(&stdout)?)
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    metadata.is_file()
}
