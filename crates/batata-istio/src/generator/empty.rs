//! Empty generator

use prost_types::Any;

use super::ApiGenerator;
use crate::snapshot::ResourceSnapshot;

/// Serves an empty resource list for families without content
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyGenerator;

impl ApiGenerator for EmptyGenerator {
    type Resource = Any;

    fn generate(&self, _snapshot: &ResourceSnapshot) -> Vec<Any> {
        Vec::new()
    }
}
