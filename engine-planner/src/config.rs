// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

/// Which join executors `do_planner` is allowed to choose from. Read once
/// per call, not a compile-time switch, so tests can exercise every
/// combination without conditional compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    pub nestedloop_enabled: bool,
    pub sortmerge_enabled: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            nestedloop_enabled: true,
            sortmerge_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_both_executors() {
        let config = PlannerConfig::default();
        assert!(config.nestedloop_enabled);
        assert!(config.sortmerge_enabled);
    }
}
