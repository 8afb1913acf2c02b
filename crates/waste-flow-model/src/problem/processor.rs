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

use crate::common::ProcessorIdentifier;
use std::collections::BTreeMap;
use waste_flow_core::prelude::{GeoPoint, Quantity};

/// A processing facility. Capacity is an aggregate per-period budget
/// consumed across all waste types routed to the facility.
#[derive(Debug, Clone, PartialEq)]
pub struct Processor {
    id: ProcessorIdentifier,
    location: GeoPoint,
    capacity: Quantity,
}

impl Processor {
    #[inline]
    pub fn new(id: ProcessorIdentifier, location: GeoPoint, capacity: Quantity) -> Self {
        Self {
            id,
            location,
            capacity,
        }
    }

    #[inline]
    pub fn id(&self) -> ProcessorIdentifier {
        self.id
    }

    #[inline]
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    #[inline]
    pub fn capacity(&self) -> Quantity {
        self.capacity
    }
}

/// Processors keyed by id, iterated in ascending id order.
#[repr(transparent)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorContainer(BTreeMap<ProcessorIdentifier, Processor>);

impl ProcessorContainer {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, processor: Processor) -> Option<Processor> {
        self.0.insert(processor.id(), processor)
    }

    #[inline]
    pub fn contains_id(&self, id: ProcessorIdentifier) -> bool {
        self.0.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: ProcessorIdentifier) -> Option<&Processor> {
        self.0.get(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Processor> {
        self.0.values()
    }

    #[inline]
    pub fn total_capacity(&self) -> Quantity {
        self.iter().map(|p| p.capacity()).sum()
    }
}

impl FromIterator<Processor> for ProcessorContainer {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Processor>>(iter: I) -> Self {
        let mut c = Self::new();
        for p in iter {
            c.insert(p);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn prid(n: u32) -> ProcessorIdentifier {
        ProcessorIdentifier::new(n)
    }

    fn processor(id: u32, cap: u64) -> Processor {
        Processor::new(
            prid(id),
            GeoPoint::new(41.4, 2.2).unwrap(),
            Quantity::new(cap),
        )
    }

    #[test]
    fn test_total_capacity() {
        let c: ProcessorContainer = [processor(1, 100), processor(2, 250)].into_iter().collect();
        assert_eq!(c.total_capacity(), Quantity::new(350));
    }

    #[test]
    fn test_container_iterates_in_id_order() {
        let c: ProcessorContainer = [processor(9, 1), processor(4, 1)].into_iter().collect();
        let ids: Vec<_> = c.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![prid(4), prid(9)]);
    }
}
