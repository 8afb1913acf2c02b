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

use crate::common::{ProducerIdentifier, WasteType};
use std::collections::BTreeMap;
use waste_flow_core::prelude::{GeoPoint, Quantity};

/// A waste-producing site with its per-waste-type supply for a single
/// period. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Producer {
    id: ProducerIdentifier,
    location: GeoPoint,
    supply: BTreeMap<WasteType, Quantity>,
}

impl Producer {
    #[inline]
    pub fn new(
        id: ProducerIdentifier,
        location: GeoPoint,
        supply: BTreeMap<WasteType, Quantity>,
    ) -> Self {
        Self {
            id,
            location,
            supply,
        }
    }

    #[inline]
    pub fn id(&self) -> ProducerIdentifier {
        self.id
    }

    #[inline]
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Supply of the given waste type; absent entries count as zero.
    #[inline]
    pub fn supply_of(&self, waste_type: WasteType) -> Quantity {
        self.supply
            .get(&waste_type)
            .copied()
            .unwrap_or(Quantity::ZERO)
    }

    #[inline]
    pub fn iter_supply(&self) -> impl Iterator<Item = (WasteType, Quantity)> + '_ {
        self.supply.iter().map(|(&wt, &q)| (wt, q))
    }

    #[inline]
    pub fn total_supply(&self) -> Quantity {
        self.supply.values().copied().sum()
    }
}

/// Producers keyed by id. `BTreeMap`-backed so iteration order is the
/// ascending id order the deterministic solvers rely on.
#[repr(transparent)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducerContainer(BTreeMap<ProducerIdentifier, Producer>);

impl ProducerContainer {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a producer, returning the previous entry with the same id.
    #[inline]
    pub fn insert(&mut self, producer: Producer) -> Option<Producer> {
        self.0.insert(producer.id(), producer)
    }

    #[inline]
    pub fn contains_id(&self, id: ProducerIdentifier) -> bool {
        self.0.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: ProducerIdentifier) -> Option<&Producer> {
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
    pub fn iter(&self) -> impl Iterator<Item = &Producer> {
        self.0.values()
    }
}

impl FromIterator<Producer> for ProducerContainer {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Producer>>(iter: I) -> Self {
        let mut c = Self::new();
        for p in iter {
            c.insert(p);
        }
        c
    }
}
