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

//! JSON instance loader.
//!
//! Raw records carry signed quantities and unchecked coordinates; the
//! loader is the boundary where both are validated into the unsigned,
//! range-checked model types.

use crate::common::{ProcessorIdentifier, ProducerIdentifier, WasteType};
use crate::problem::err::{NegativeCapacityError, NegativeSupplyError, ProblemLoaderError};
use crate::problem::processor::Processor;
use crate::problem::producer::Producer;
use crate::problem::Problem;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use waste_flow_core::prelude::{GeoPoint, Quantity};

#[derive(Debug, Deserialize)]
struct RawProducer {
    id: u32,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    supply: BTreeMap<WasteType, i64>,
}

#[derive(Debug, Deserialize)]
struct RawProcessor {
    id: u32,
    latitude: f64,
    longitude: f64,
    capacity: i64,
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    producers: Vec<RawProducer>,
    processors: Vec<RawProcessor>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProblemLoader;

impl ProblemLoader {
    pub fn from_path(&self, path: &Path) -> Result<Problem, ProblemLoaderError> {
        let file = std::fs::File::open(path)?;
        self.from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Problem, ProblemLoaderError> {
        let raw: RawInstance = serde_json::from_reader(reader)?;
        self.build(raw)
    }

    pub fn from_str(&self, s: &str) -> Result<Problem, ProblemLoaderError> {
        let raw: RawInstance = serde_json::from_str(s)?;
        self.build(raw)
    }

    fn build(&self, raw: RawInstance) -> Result<Problem, ProblemLoaderError> {
        let mut producers = Vec::with_capacity(raw.producers.len());
        for rp in raw.producers {
            let id = ProducerIdentifier::new(rp.id);
            let location = GeoPoint::new(rp.latitude, rp.longitude)
                .map_err(crate::problem::err::ValidationError::from)?;
            let mut supply = BTreeMap::new();
            for (wt, kg) in rp.supply {
                if kg < 0 {
                    return Err(crate::problem::err::ValidationError::from(
                        NegativeSupplyError::new(id, wt, kg),
                    )
                    .into());
                }
                supply.insert(wt, Quantity::new(kg as u64));
            }
            producers.push(Producer::new(id, location, supply));
        }

        let mut processors = Vec::with_capacity(raw.processors.len());
        for rq in raw.processors {
            let id = ProcessorIdentifier::new(rq.id);
            let location = GeoPoint::new(rq.latitude, rq.longitude)
                .map_err(crate::problem::err::ValidationError::from)?;
            if rq.capacity < 0 {
                return Err(crate::problem::err::ValidationError::from(
                    NegativeCapacityError::new(id, rq.capacity),
                )
                .into());
            }
            processors.push(Processor::new(id, location, Quantity::new(rq.capacity as u64)));
        }

        Ok(Problem::from_entities(producers, processors)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::err::ValidationError;

    const GOOD: &str = r#"{
        "producers": [
            { "id": 1, "latitude": 41.40, "longitude": 2.15,
              "supply": { "organic": 100, "plastic": 30 } },
            { "id": 2, "latitude": 41.38, "longitude": 2.19,
              "supply": { "organic": 50 } }
        ],
        "processors": [
            { "id": 1, "latitude": 41.42, "longitude": 2.18, "capacity": 200 }
        ]
    }"#;

    #[test]
    fn test_loads_valid_instance() {
        let problem = ProblemLoader.from_str(GOOD).unwrap();
        assert_eq!(problem.producers().len(), 2);
        assert_eq!(problem.processors().len(), 1);
        assert_eq!(
            problem.total_supply(WasteType::Organic),
            Quantity::new(150)
        );
        assert_eq!(problem.total_capacity(), Quantity::new(200));
    }

    #[test]
    fn test_missing_supply_map_defaults_to_empty() {
        let s = r#"{
            "producers": [ { "id": 1, "latitude": 0.0, "longitude": 0.0 } ],
            "processors": [ { "id": 1, "latitude": 0.0, "longitude": 1.0, "capacity": 10 } ]
        }"#;
        let problem = ProblemLoader.from_str(s).unwrap();
        assert_eq!(problem.total_supply(WasteType::Organic), Quantity::ZERO);
    }

    #[test]
    fn test_rejects_negative_supply() {
        let s = r#"{
            "producers": [
                { "id": 4, "latitude": 0.0, "longitude": 0.0, "supply": { "paper": -1 } }
            ],
            "processors": []
        }"#;
        let err = ProblemLoader.from_str(s).unwrap_err();
        match err {
            ProblemLoaderError::Validation(ValidationError::NegativeSupply(e)) => {
                assert_eq!(e.producer(), ProducerIdentifier::new(4));
                assert_eq!(e.waste_type(), WasteType::Paper);
                assert_eq!(e.value(), -1);
            }
            other => panic!("expected NegativeSupply, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_negative_capacity() {
        let s = r#"{
            "producers": [],
            "processors": [ { "id": 9, "latitude": 0.0, "longitude": 0.0, "capacity": -5 } ]
        }"#;
        let err = ProblemLoader.from_str(s).unwrap_err();
        match err {
            ProblemLoaderError::Validation(ValidationError::NegativeCapacity(e)) => {
                assert_eq!(e.processor(), ProcessorIdentifier::new(9));
                assert_eq!(e.value(), -5);
            }
            other => panic!("expected NegativeCapacity, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        let s = r#"{
            "producers": [ { "id": 1, "latitude": 91.0, "longitude": 0.0 } ],
            "processors": []
        }"#;
        let err = ProblemLoader.from_str(s).unwrap_err();
        assert!(matches!(
            err,
            ProblemLoaderError::Validation(ValidationError::CoordinateRange(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let s = r#"{
            "producers": [
                { "id": 1, "latitude": 0.0, "longitude": 0.0 },
                { "id": 1, "latitude": 1.0, "longitude": 1.0 }
            ],
            "processors": []
        }"#;
        let err = ProblemLoader.from_str(s).unwrap_err();
        assert!(matches!(
            err,
            ProblemLoaderError::Validation(ValidationError::DuplicateProducer(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            ProblemLoader.from_str("{ not json").unwrap_err(),
            ProblemLoaderError::Json(_)
        ));
    }
}
