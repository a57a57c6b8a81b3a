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

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Errors produced while framing or deframing the Telnet stream.
#[derive(Debug, Error)]
pub enum CodecError {
    /// I/O error from the underlying transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A subnegotiation ran past the configured size limit without its
    /// terminating `IAC SE`.
    #[error("subnegotiation for option {option} exceeded {limit} bytes without IAC SE")]
    SubnegotiationOverflow {
        /// The option code named in the unterminated block
        option: u8,
        /// The configured limit that was exceeded
        limit: usize,
    },
}
