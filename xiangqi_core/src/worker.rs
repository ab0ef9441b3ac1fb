//! Off-thread move search. Requests and replies are plain serializable data so
//! the same protocol works over a native channel or a web worker bridge.

use crate::engine::config::{Difficulty, EngineConfig};
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{Move, SearchError};
use crate::logic::board::{Board, Color, PieceType, Position, UnknownPieceType};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    UnknownPieceType(#[from] UnknownPieceType),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("search worker is no longer running")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub piece_type: String,
    pub color: Color,
    pub position: Position,
}

/// Transferable form of a board: its pieces plus the sender's hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub pieces: Vec<PieceSnapshot>,
    pub hash: u32,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board) -> Self {
        Self {
            pieces: board
                .pieces()
                .map(|p| PieceSnapshot {
                    piece_type: p.piece_type.as_str().to_string(),
                    color: p.color,
                    position: p.position,
                })
                .collect(),
            hash: board.hash(),
        }
    }

    /// Places every piece on an empty board, then adopts the transmitted
    /// hash verbatim.
    pub fn reconstruct(&self) -> Result<Board, WorkerError> {
        let mut board = Board::empty();
        for snapshot in &self.pieces {
            let piece_type: PieceType = snapshot.piece_type.parse()?;
            board.place(snapshot.color, piece_type, snapshot.position);
        }
        board.set_hash(self.hash);
        Ok(board)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Input {
    FindBestMove {
        board: BoardSnapshot,
        color: Color,
        difficulty: Difficulty,
    },
    Configure(EngineConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    MoveFound(Move),
    Configured,
    Error(String),
}

/// Serves one request against `engine`. Failures become `Output::Error`.
pub fn handle_request(engine: &mut AlphaBetaEngine, input: Input) -> Output {
    match input {
        Input::FindBestMove {
            board,
            color,
            difficulty,
        } => match find_move(engine, &board, color, difficulty) {
            Ok(mv) => Output::MoveFound(mv),
            Err(e) => {
                log::warn!("search request failed: {e}");
                Output::Error(e.to_string())
            }
        },
        Input::Configure(config) => {
            engine.update_config(Arc::new(config));
            Output::Configured
        }
    }
}

fn find_move(
    engine: &mut AlphaBetaEngine,
    snapshot: &BoardSnapshot,
    color: Color,
    difficulty: Difficulty,
) -> Result<Move, WorkerError> {
    let board = snapshot.reconstruct()?;
    Ok(engine.find_best_move(&board, color, &difficulty.config())?)
}

/// A search engine running on its own thread. At most one request is queued
/// at a time; replies arrive in request order.
pub struct SearchWorker {
    requests: Option<Sender<Input>>,
    responses: Option<Receiver<Output>>,
    handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    pub fn spawn(config: Arc<EngineConfig>) -> Self {
        Self::spawn_with_engine(AlphaBetaEngine::new(config))
    }

    pub fn spawn_with_engine(mut engine: AlphaBetaEngine) -> Self {
        let (request_tx, request_rx) = crossbeam_channel::bounded::<Input>(1);
        let (response_tx, response_rx) = crossbeam_channel::bounded::<Output>(1);

        let handle = std::thread::spawn(move || {
            for input in request_rx {
                if response_tx.send(handle_request(&mut engine, input)).is_err() {
                    break;
                }
            }
            log::debug!("search worker shutting down");
        });

        Self {
            requests: Some(request_tx),
            responses: Some(response_rx),
            handle: Some(handle),
        }
    }

    pub fn submit(&self, input: Input) -> Result<(), WorkerError> {
        self.requests
            .as_ref()
            .ok_or(WorkerError::Disconnected)?
            .send(input)
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Reply to the last submitted request, if it is ready.
    pub fn try_recv(&self) -> Result<Option<Output>, WorkerError> {
        let responses = self.responses.as_ref().ok_or(WorkerError::Disconnected)?;
        match responses.try_recv() {
            Ok(output) => Ok(Some(output)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }

    pub fn recv(&self) -> Result<Output, WorkerError> {
        self.responses
            .as_ref()
            .ok_or(WorkerError::Disconnected)?
            .recv()
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Submits `input` and blocks until the reply arrives.
    pub fn request(&self, input: Input) -> Result<Output, WorkerError> {
        self.submit(input)?;
        self.recv()
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        // Closing both channels ends the worker loop, even when a reply
        // is still waiting to be read.
        self.requests.take();
        self.responses.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("search worker panicked");
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{handle_request, Input, Output};
    use crate::engine::config::EngineConfig;
    use crate::engine::search::AlphaBetaEngine;
    use gloo_worker::{HandlerId, Worker, WorkerScope};
    use std::sync::Arc;

    pub struct GameWorker {
        engine: AlphaBetaEngine,
    }

    impl Worker for GameWorker {
        type Input = Input;
        type Message = ();
        type Output = Output;

        fn create(_scope: &WorkerScope<Self>) -> Self {
            Self {
                engine: AlphaBetaEngine::new(Arc::new(EngineConfig::default())),
            }
        }

        fn update(&mut self, _scope: &WorkerScope<Self>, _msg: Self::Message) {}

        fn received(&mut self, scope: &WorkerScope<Self>, msg: Self::Input, id: HandlerId) {
            scope.respond(id, handle_request(&mut self.engine, msg));
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::GameWorker;
