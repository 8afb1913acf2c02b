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

use crate::common::{ProcessorIdentifier, ProducerIdentifier, WasteType};
use waste_flow_core::prelude::CoordinateRangeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateProducerError {
    id: ProducerIdentifier,
}

impl DuplicateProducerError {
    pub fn new(id: ProducerIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ProducerIdentifier {
        self.id
    }
}

impl std::fmt::Display for DuplicateProducerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Producer id {} occurs more than once", self.id)
    }
}

impl std::error::Error for DuplicateProducerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateProcessorError {
    id: ProcessorIdentifier,
}

impl DuplicateProcessorError {
    pub fn new(id: ProcessorIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ProcessorIdentifier {
        self.id
    }
}

impl std::fmt::Display for DuplicateProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Processor id {} occurs more than once", self.id)
    }
}

impl std::error::Error for DuplicateProcessorError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeSupplyError {
    producer: ProducerIdentifier,
    waste_type: WasteType,
    value: i64,
}

impl NegativeSupplyError {
    pub fn new(producer: ProducerIdentifier, waste_type: WasteType, value: i64) -> Self {
        Self {
            producer,
            waste_type,
            value,
        }
    }

    pub fn producer(&self) -> ProducerIdentifier {
        self.producer
    }

    pub fn waste_type(&self) -> WasteType {
        self.waste_type
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl std::fmt::Display for NegativeSupplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Producer {} has negative {} supply ({})",
            self.producer, self.waste_type, self.value
        )
    }
}

impl std::error::Error for NegativeSupplyError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeCapacityError {
    processor: ProcessorIdentifier,
    value: i64,
}

impl NegativeCapacityError {
    pub fn new(processor: ProcessorIdentifier, value: i64) -> Self {
        Self { processor, value }
    }

    pub fn processor(&self) -> ProcessorIdentifier {
        self.processor
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl std::fmt::Display for NegativeCapacityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processor {} has negative capacity ({})",
            self.processor, self.value
        )
    }
}

impl std::error::Error for NegativeCapacityError {}

/// Malformed input. Surfaced before a run starts; a run never begins on
/// an invalid problem.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    DuplicateProducer(DuplicateProducerError),
    DuplicateProcessor(DuplicateProcessorError),
    NegativeSupply(NegativeSupplyError),
    NegativeCapacity(NegativeCapacityError),
    CoordinateRange(CoordinateRangeError),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::DuplicateProducer(e) => write!(f, "{}", e),
            ValidationError::DuplicateProcessor(e) => write!(f, "{}", e),
            ValidationError::NegativeSupply(e) => write!(f, "{}", e),
            ValidationError::NegativeCapacity(e) => write!(f, "{}", e),
            ValidationError::CoordinateRange(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<DuplicateProducerError> for ValidationError {
    fn from(err: DuplicateProducerError) -> Self {
        ValidationError::DuplicateProducer(err)
    }
}

impl From<DuplicateProcessorError> for ValidationError {
    fn from(err: DuplicateProcessorError) -> Self {
        ValidationError::DuplicateProcessor(err)
    }
}

impl From<NegativeSupplyError> for ValidationError {
    fn from(err: NegativeSupplyError) -> Self {
        ValidationError::NegativeSupply(err)
    }
}

impl From<NegativeCapacityError> for ValidationError {
    fn from(err: NegativeCapacityError) -> Self {
        ValidationError::NegativeCapacity(err)
    }
}

impl From<CoordinateRangeError> for ValidationError {
    fn from(err: CoordinateRangeError) -> Self {
        ValidationError::CoordinateRange(err)
    }
}

#[derive(Debug)]
pub enum ProblemLoaderError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Validation(ValidationError),
}

impl From<std::io::Error> for ProblemLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ProblemLoaderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ValidationError> for ProblemLoaderError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl std::fmt::Display for ProblemLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ProblemLoaderError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            Json(e) => write!(f, "JSON error: {e}"),
            Validation(e) => write!(f, "validation error: {e}"),
        }
    }
}

impl std::error::Error for ProblemLoaderError {}
