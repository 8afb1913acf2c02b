// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use waste_flow_core::prelude::Quantity;
use waste_flow_model::common::WasteType;
use waste_flow_model::validation::err::SolutionValidationError;

/// The augmentation budget ran out before the flow converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IterationLimitError {
    limit: u64,
}

impl IterationLimitError {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl std::fmt::Display for IterationLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Min-cost-flow solver exhausted its iteration limit of {}",
            self.limit
        )
    }
}

impl std::error::Error for IterationLimitError {}

/// The residual graph claimed an augmenting path that could not be
/// traced back to the source. Indicates a solver bug, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidualPathError {
    detail: String,
}

impl ResidualPathError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl std::fmt::Display for ResidualPathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Residual graph inconsistency: {}", self.detail)
    }
}

impl std::error::Error for ResidualPathError {}

/// Internal failure of the exact solver. Callers recover through the
/// greedy fallback; the error itself is recorded on the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolverError {
    IterationLimit(IterationLimitError),
    ResidualPath(ResidualPathError),
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::IterationLimit(e) => write!(f, "{}", e),
            SolverError::ResidualPath(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SolverError {}

impl From<IterationLimitError> for SolverError {
    fn from(err: IterationLimitError) -> Self {
        SolverError::IterationLimit(err)
    }
}

impl From<ResidualPathError> for SolverError {
    fn from(err: ResidualPathError) -> Self {
        SolverError::ResidualPath(err)
    }
}

/// Supply exceeds capacity and the run does not allow partial
/// satisfaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfeasibleError {
    waste_type: WasteType,
    supply: Quantity,
    capacity: Quantity,
}

impl InfeasibleError {
    pub fn new(waste_type: WasteType, supply: Quantity, capacity: Quantity) -> Self {
        Self {
            waste_type,
            supply,
            capacity,
        }
    }

    pub fn waste_type(&self) -> WasteType {
        self.waste_type
    }

    pub fn supply(&self) -> Quantity {
        self.supply
    }

    pub fn capacity(&self) -> Quantity {
        self.capacity
    }

    pub fn shortfall(&self) -> Quantity {
        self.supply.saturating_sub(self.capacity)
    }
}

impl std::fmt::Display for InfeasibleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Infeasible {} run: supply {} exceeds capacity {} by {}",
            self.waste_type,
            self.supply,
            self.capacity,
            self.shortfall()
        )
    }
}

impl std::error::Error for InfeasibleError {}

/// Top-level failure of a single optimization run.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeError {
    Infeasible(InfeasibleError),
    Solution(SolutionValidationError),
}

impl std::fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizeError::Infeasible(e) => write!(f, "{}", e),
            OptimizeError::Solution(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OptimizeError {}

impl From<InfeasibleError> for OptimizeError {
    fn from(err: InfeasibleError) -> Self {
        OptimizeError::Infeasible(err)
    }
}

impl From<SolutionValidationError> for OptimizeError {
    fn from(err: SolutionValidationError) -> Self {
        OptimizeError::Solution(err)
    }
}

/// Failure while merging runs into one report.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateError {
    Solution(SolutionValidationError),
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::Solution(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AggregateError {}

impl From<SolutionValidationError> for AggregateError {
    fn from(err: SolutionValidationError) -> Self {
        AggregateError::Solution(err)
    }
}
