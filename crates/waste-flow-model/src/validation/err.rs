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
use waste_flow_core::prelude::Quantity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConservationError {
    producer: ProducerIdentifier,
    waste_type: WasteType,
    supply: Quantity,
    routed: Quantity,
    unmet: Quantity,
}

impl ConservationError {
    pub fn new(
        producer: ProducerIdentifier,
        waste_type: WasteType,
        supply: Quantity,
        routed: Quantity,
        unmet: Quantity,
    ) -> Self {
        Self {
            producer,
            waste_type,
            supply,
            routed,
            unmet,
        }
    }

    pub fn producer(&self) -> ProducerIdentifier {
        self.producer
    }

    pub fn waste_type(&self) -> WasteType {
        self.waste_type
    }

    pub fn supply(&self) -> Quantity {
        self.supply
    }

    pub fn routed(&self) -> Quantity {
        self.routed
    }

    pub fn unmet(&self) -> Quantity {
        self.unmet
    }
}

impl std::fmt::Display for ConservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Conservation violated for {} ({}): routed {} + unmet {} != supply {}",
            self.producer, self.waste_type, self.routed, self.unmet, self.supply
        )
    }
}

impl std::error::Error for ConservationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapacityExceededError {
    processor: ProcessorIdentifier,
    capacity: Quantity,
    received: Quantity,
}

impl CapacityExceededError {
    pub fn new(processor: ProcessorIdentifier, capacity: Quantity, received: Quantity) -> Self {
        Self {
            processor,
            capacity,
            received,
        }
    }

    pub fn processor(&self) -> ProcessorIdentifier {
        self.processor
    }

    pub fn capacity(&self) -> Quantity {
        self.capacity
    }

    pub fn received(&self) -> Quantity {
        self.received
    }
}

impl std::fmt::Display for CapacityExceededError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processor {} received {} exceeding its capacity {}",
            self.processor, self.received, self.capacity
        )
    }
}

impl std::error::Error for CapacityExceededError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownProducerError {
    id: ProducerIdentifier,
}

impl UnknownProducerError {
    pub fn new(id: ProducerIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ProducerIdentifier {
        self.id
    }
}

impl std::fmt::Display for UnknownProducerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Allocation references unknown producer {}", self.id)
    }
}

impl std::error::Error for UnknownProducerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownProcessorError {
    id: ProcessorIdentifier,
}

impl UnknownProcessorError {
    pub fn new(id: ProcessorIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ProcessorIdentifier {
        self.id
    }
}

impl std::fmt::Display for UnknownProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Allocation references unknown processor {}", self.id)
    }
}

impl std::error::Error for UnknownProcessorError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SolutionValidationError {
    Conservation(ConservationError),
    CapacityExceeded(CapacityExceededError),
    UnknownProducer(UnknownProducerError),
    UnknownProcessor(UnknownProcessorError),
}

impl std::fmt::Display for SolutionValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionValidationError::Conservation(e) => write!(f, "{}", e),
            SolutionValidationError::CapacityExceeded(e) => write!(f, "{}", e),
            SolutionValidationError::UnknownProducer(e) => write!(f, "{}", e),
            SolutionValidationError::UnknownProcessor(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SolutionValidationError {}

impl From<ConservationError> for SolutionValidationError {
    fn from(err: ConservationError) -> Self {
        SolutionValidationError::Conservation(err)
    }
}

impl From<CapacityExceededError> for SolutionValidationError {
    fn from(err: CapacityExceededError) -> Self {
        SolutionValidationError::CapacityExceeded(err)
    }
}

impl From<UnknownProducerError> for SolutionValidationError {
    fn from(err: UnknownProducerError) -> Self {
        SolutionValidationError::UnknownProducer(err)
    }
}

impl From<UnknownProcessorError> for SolutionValidationError {
    fn from(err: UnknownProcessorError) -> Self {
        SolutionValidationError::UnknownProcessor(err)
    }
}
