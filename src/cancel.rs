//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Cooperative cancellation for export calls.
//!
//! The export pipeline polls the token at fixed checkpoints (start, after
//! backend load, around each dataset, before serialization). Clones share the
//! same flag, so a caller can keep one handle and pass another to the export.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{Result, ZiError};

/// Shared cancellation flag polled at export checkpoints.
#[derive(Clone, Debug, Default)]
pub struct ZiCancelToken {
    flag: Arc<AtomicBool>,
}

impl ZiCancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that is already cancelled.
    pub fn cancelled() -> Self {
        let token = Self::new();
        token.cancel();
        token
    }

    /// Requests cancellation; every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns [`ZiError::Cancelled`] if cancellation was requested.
    pub fn checkpoint(&self, checkpoint: &str) -> Result<()> {
        if self.is_cancelled() {
            log::info!("export.cancelled: cancellation observed - checkpoint={}", checkpoint);
            return Err(ZiError::cancelled(checkpoint));
        }
        Ok(())
    }
}
