use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::schema::Schema;

/// Schemas of the elements of one sequence, in element order.
///
/// Each element is resolved on its own, so a sequence may mix model types.
/// `None` marks an element without a schema, which is serialized from its raw
/// attribute set.
#[derive(Debug, Clone, Default)]
pub struct SequenceSchema {
    elements: Vec<Option<Arc<Schema>>>,
}

impl SequenceSchema {
    #[inline]
    pub(crate) fn new(elements: Vec<Option<Arc<Schema>>>) -> Self {
        Self { elements }
    }

    /// The schema of the element at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Arc<Schema>> {
        self.elements.get(index).and_then(Option::as_ref)
    }

    /// The schema of the first element, which names the whole sequence.
    #[inline]
    pub fn first(&self) -> Option<&Arc<Schema>> {
        self.get(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns `true` if every element resolved to the same schema.
    pub fn is_homogeneous(&self) -> bool {
        let mut iter = self.elements.iter();
        let Some(first) = iter.next() else {
            return true;
        };
        iter.all(|other| match (first, other) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        })
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<&Arc<Schema>>> {
        self.elements.iter().map(Option::as_ref)
    }

    #[inline]
    pub(crate) fn into_inner(self) -> Vec<Option<Arc<Schema>>> {
        self.elements
    }
}
