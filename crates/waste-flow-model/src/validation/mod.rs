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

//! Solution validation.
//!
//! Checks an [`AllocationSet`] against the [`Problem`] it was produced
//! from: every referenced entity exists, every producer's flow is
//! conserved, and no processor is loaded beyond its capacity.

pub mod err;

use crate::problem::Problem;
use crate::solution::AllocationSet;
use crate::validation::err::{
    CapacityExceededError, ConservationError, SolutionValidationError, UnknownProcessorError,
    UnknownProducerError,
};
use std::collections::BTreeMap;
use waste_flow_core::prelude::Quantity;

#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationValidator;

impl AllocationValidator {
    /// Runs every check for a single-run allocation set.
    pub fn validate(
        &self,
        problem: &Problem,
        set: &AllocationSet,
    ) -> Result<(), SolutionValidationError> {
        self.validate_references(problem, set)?;
        self.validate_conservation(problem, set)?;
        self.validate_capacity(problem, set)?;
        Ok(())
    }

    /// Every allocation and unmet-demand entry must reference a known
    /// producer and processor.
    pub fn validate_references(
        &self,
        problem: &Problem,
        set: &AllocationSet,
    ) -> Result<(), SolutionValidationError> {
        for a in set.allocations() {
            if !problem.producers().contains_id(a.producer()) {
                return Err(UnknownProducerError::new(a.producer()).into());
            }
            if !problem.processors().contains_id(a.processor()) {
                return Err(UnknownProcessorError::new(a.processor()).into());
            }
        }
        for (&id, _) in set.unmet_demand() {
            if !problem.producers().contains_id(id) {
                return Err(UnknownProducerError::new(id).into());
            }
        }
        Ok(())
    }

    /// For every producer, routed plus unmet must equal its supply of
    /// the set's waste type. Holds for optimal, partial and greedy runs
    /// alike.
    pub fn validate_conservation(
        &self,
        problem: &Problem,
        set: &AllocationSet,
    ) -> Result<(), SolutionValidationError> {
        for producer in problem.producers().iter() {
            let supply = producer.supply_of(set.waste_type());
            let routed = set.routed_by(producer.id());
            let unmet = set
                .unmet_demand()
                .get(&producer.id())
                .copied()
                .unwrap_or(Quantity::ZERO);
            let accounted = routed.checked_add(unmet);
            if accounted != Some(supply) {
                return Err(ConservationError::new(
                    producer.id(),
                    set.waste_type(),
                    supply,
                    routed,
                    unmet,
                )
                .into());
            }
        }
        Ok(())
    }

    /// No processor may receive more than its capacity within one run.
    pub fn validate_capacity(
        &self,
        problem: &Problem,
        set: &AllocationSet,
    ) -> Result<(), SolutionValidationError> {
        for processor in problem.processors().iter() {
            let received = set.received_by(processor.id());
            if received > processor.capacity() {
                return Err(CapacityExceededError::new(
                    processor.id(),
                    processor.capacity(),
                    received,
                )
                .into());
            }
        }
        Ok(())
    }

    /// Capacity check across several runs sharing the same period.
    /// Capacity is an aggregate budget, so loads from different waste
    /// types add up against it.
    pub fn validate_capacity_across<'a, I>(
        &self,
        problem: &Problem,
        sets: I,
    ) -> Result<(), SolutionValidationError>
    where
        I: IntoIterator<Item = &'a AllocationSet>,
    {
        let mut received: BTreeMap<crate::common::ProcessorIdentifier, Quantity> = BTreeMap::new();
        for set in sets {
            for a in set.allocations() {
                let entry = received.entry(a.processor()).or_insert(Quantity::ZERO);
                *entry = entry.saturating_add(a.quantity());
            }
        }
        for (id, total) in received {
            match problem.processors().get(id) {
                None => return Err(UnknownProcessorError::new(id).into()),
                Some(p) if total > p.capacity() => {
                    return Err(CapacityExceededError::new(id, p.capacity(), total).into());
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
