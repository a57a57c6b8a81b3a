//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Error types for the telnet engine

use mudlink_compress::TransformError;
use thiserror::Error;

/// The boxed error type host callbacks may return.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Telnet engine error types
///
/// Nothing here aborts the connection by itself: the engine's state is
/// consistent at every callback boundary, so a host may log the error and
/// keep driving the same engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A stream transformer (compression) failed
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// A host callback returned an error; it propagates to the task driving
    /// the engine
    #[error("callback failed: {0}")]
    Callback(#[source] CallbackError),
}
