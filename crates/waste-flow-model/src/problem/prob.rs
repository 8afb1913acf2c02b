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

use crate::common::WasteType;
use crate::problem::err::{DuplicateProcessorError, DuplicateProducerError, ValidationError};
use crate::problem::processor::{Processor, ProcessorContainer};
use crate::problem::producer::{Producer, ProducerContainer};
use waste_flow_core::prelude::Quantity;

/// An immutable optimization instance: the producers and processors a
/// run sees. Every run receives its own snapshot; nothing mutates a
/// `Problem` after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    producers: ProducerContainer,
    processors: ProcessorContainer,
}

impl Problem {
    #[inline]
    pub fn new(producers: ProducerContainer, processors: ProcessorContainer) -> Self {
        Self {
            producers,
            processors,
        }
    }

    /// Builds a problem from plain entity lists, rejecting duplicate ids.
    pub fn from_entities<P, Q>(producers: P, processors: Q) -> Result<Self, ValidationError>
    where
        P: IntoIterator<Item = Producer>,
        Q: IntoIterator<Item = Processor>,
    {
        let mut pc = ProducerContainer::new();
        for p in producers {
            let id = p.id();
            if pc.insert(p).is_some() {
                return Err(DuplicateProducerError::new(id).into());
            }
        }

        let mut qc = ProcessorContainer::new();
        for q in processors {
            let id = q.id();
            if qc.insert(q).is_some() {
                return Err(DuplicateProcessorError::new(id).into());
            }
        }

        Ok(Self::new(pc, qc))
    }

    #[inline]
    pub fn producers(&self) -> &ProducerContainer {
        &self.producers
    }

    #[inline]
    pub fn processors(&self) -> &ProcessorContainer {
        &self.processors
    }

    #[inline]
    pub fn total_supply(&self, waste_type: WasteType) -> Quantity {
        self.producers.iter().map(|p| p.supply_of(waste_type)).sum()
    }

    #[inline]
    pub fn total_capacity(&self) -> Quantity {
        self.processors.total_capacity()
    }

    /// Supply that cannot be placed anywhere for this waste type, zero
    /// when capacity covers the supply.
    #[inline]
    pub fn supply_shortfall(&self, waste_type: WasteType) -> Quantity {
        self.total_supply(waste_type)
            .saturating_sub(self.total_capacity())
    }

    #[inline]
    pub fn is_over_constrained(&self, waste_type: WasteType) -> bool {
        !self.supply_shortfall(waste_type).is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ProcessorIdentifier, ProducerIdentifier};
    use std::collections::BTreeMap;
    use waste_flow_core::prelude::GeoPoint;

    #[inline]
    fn pid(n: u32) -> ProducerIdentifier {
        ProducerIdentifier::new(n)
    }

    #[inline]
    fn prid(n: u32) -> ProcessorIdentifier {
        ProcessorIdentifier::new(n)
    }

    #[inline]
    fn gp(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn producer(id: u32, organic: u64) -> Producer {
        let mut m = BTreeMap::new();
        m.insert(WasteType::Organic, Quantity::new(organic));
        Producer::new(pid(id), gp(41.4, 2.2), m)
    }

    fn processor(id: u32, cap: u64) -> Processor {
        Processor::new(prid(id), gp(41.41, 2.21), Quantity::new(cap))
    }

    #[test]
    fn test_from_entities_accepts_unique_ids() {
        let p = Problem::from_entities(
            [producer(1, 100), producer(2, 50)],
            [processor(1, 200)],
        )
        .unwrap();
        assert_eq!(p.producers().len(), 2);
        assert_eq!(p.processors().len(), 1);
    }

    #[test]
    fn test_from_entities_rejects_duplicate_producer() {
        let err =
            Problem::from_entities([producer(7, 10), producer(7, 20)], [processor(1, 5)])
                .unwrap_err();
        match err {
            ValidationError::DuplicateProducer(e) => assert_eq!(e.id(), pid(7)),
            other => panic!("expected DuplicateProducer, got {other:?}"),
        }
    }

    #[test]
    fn test_from_entities_rejects_duplicate_processor() {
        let err =
            Problem::from_entities([producer(1, 10)], [processor(3, 5), processor(3, 9)])
                .unwrap_err();
        match err {
            ValidationError::DuplicateProcessor(e) => assert_eq!(e.id(), prid(3)),
            other => panic!("expected DuplicateProcessor, got {other:?}"),
        }
    }

    #[test]
    fn test_totals_and_shortfall() {
        let p = Problem::from_entities(
            [producer(1, 100), producer(2, 100)],
            [processor(1, 150)],
        )
        .unwrap();
        assert_eq!(p.total_supply(WasteType::Organic), Quantity::new(200));
        assert_eq!(p.total_capacity(), Quantity::new(150));
        assert_eq!(p.supply_shortfall(WasteType::Organic), Quantity::new(50));
        assert!(p.is_over_constrained(WasteType::Organic));
        assert_eq!(p.supply_shortfall(WasteType::Paper), Quantity::ZERO);
        assert!(!p.is_over_constrained(WasteType::Paper));
    }
}
