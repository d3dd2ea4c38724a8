//! Asynchronous trace group loading.
//!
//! This module handles reading trace group documents in background threads,
//! keeping the GUI responsive during file I/O operations.

use eframe::egui;
use rzpl::trace::io::read_groups;
use rzpl::TraceGroup;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;

/// Holds the state of an async loading operation.
///
/// Only the in_progress flag is shared; results come through a channel.
#[derive(Debug, Default)]
pub struct LoadingState {
    /// True if a loading operation is currently in progress
    pub in_progress: bool,
}

/// Result of a completed loading operation.
pub enum LoadResult {
    /// Loading completed successfully
    Success {
        /// Every group read from the requested files, in file order
        groups: Vec<TraceGroup>,
        /// Paths that were loaded
        paths: Vec<PathBuf>,
    },
    /// Loading failed with an error
    Error(String),
    /// No loading operation in progress
    None,
}

/// Manages asynchronous loading of trace group files.
///
/// This struct coordinates background thread file loading with the main GUI thread.
pub struct AsyncLoader {
    /// Shared loading state flag
    loading_state: Arc<Mutex<LoadingState>>,

    /// Channel receiver for loading results
    loading_receiver: Option<Receiver<Result<Vec<TraceGroup>, String>>>,

    /// Paths of the files currently being loaded
    pending_paths: Vec<PathBuf>,
}

impl AsyncLoader {
    /// Creates a new async loader with no active loading operation.
    pub fn new() -> Self {
        Self {
            loading_state: Arc::new(Mutex::new(LoadingState::default())),
            loading_receiver: None,
            pending_paths: Vec::new(),
        }
    }

    /// Checks if a loading operation is currently in progress.
    pub fn is_loading(&self) -> bool {
        self.loading_state.lock().map(|state| state.in_progress).unwrap_or(false)
    }

    /// Starts loading trace group files asynchronously.
    ///
    /// All files are read on one background thread; the first failure aborts the
    /// batch. Call `check_completion()` once per frame to pick up the result.
    pub fn start_load(&mut self, paths: Vec<PathBuf>, ctx: &egui::Context) {
        if paths.is_empty() {
            return;
        }
        if self.is_loading() {
            log::warn!("Load already in progress, ignoring {} file(s)", paths.len());
            return;
        }

        let (sender, receiver) = channel();
        self.loading_receiver = Some(receiver);
        if let Ok(mut state) = self.loading_state.lock() {
            state.in_progress = true;
        }
        self.pending_paths = paths.clone();

        let loading_state = Arc::clone(&self.loading_state);
        let ctx_handle = ctx.clone();

        thread::spawn(move || {
            let mut groups = Vec::new();
            let mut result = Ok(());
            for path in &paths {
                log::info!("Loading trace groups from {}", path.display());
                match read_groups(path) {
                    Ok(mut loaded) => groups.append(&mut loaded),
                    Err(e) => {
                        result = Err(e.to_string());
                        break;
                    }
                }
            }

            let _ = sender.send(result.map(|()| groups));

            if let Ok(mut state) = loading_state.lock() {
                state.in_progress = false;
            }

            // Notify GUI thread to repaint
            ctx_handle.request_repaint();
        });
    }

    /// Checks if background loading has completed and returns the result if available.
    pub fn check_completion(&mut self) -> LoadResult {
        let Some(receiver) = &self.loading_receiver else {
            return LoadResult::None;
        };
        let Ok(result) = receiver.try_recv() else {
            return LoadResult::None;
        };

        self.loading_receiver = None;
        let paths = std::mem::take(&mut self.pending_paths);
        match result {
            Ok(groups) => LoadResult::Success { groups, paths },
            Err(error_msg) => LoadResult::Error(error_msg),
        }
    }
}

impl Default for AsyncLoader {
    fn default() -> Self {
        Self::new()
    }
}
