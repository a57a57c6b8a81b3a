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

use serde_json::Value;

///
/// The JSON codec GMCP uses to decode and encode message payloads.
///
/// The engine ships with [`SerdeJson`]; the seam exists so a host with its
/// own JSON stack (or one that wants to intern or validate payloads) can
/// substitute it at construction.
///
pub trait JsonCodec: Send + Sync {
    /// Parses JSON text into a value.
    fn loads(&self, text: &str) -> serde_json::Result<Value>;

    /// Renders a value as compact JSON text.
    fn dumps(&self, value: &Value) -> String;
}

/// The default [`JsonCodec`], backed by `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerdeJson;

impl JsonCodec for SerdeJson {
    fn loads(&self, text: &str) -> serde_json::Result<Value> {
        serde_json::from_str(text)
    }

    fn dumps(&self, value: &Value) -> String {
        value.to_string()
    }
}
