//! Heap arena for arrays and objects
//!
//! Every array or object created during a run lives in one slot of the
//! [`Heap`], keyed by a [`HeapId`] handed out from the heap's own counter.
//! Ids are never reused within a run, and each run starts from a fresh heap,
//! so traces are reproducible regardless of what ran before.
//!
//! [`Heap::snapshot`] copies the slots reachable from a set of root values into
//! a new, independent heap with the same ids. Recorded steps own such a
//! snapshot, so later mutation of the live heap never leaks into earlier steps.

use super::value::{HeapId, RuntimeValue};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Contents of a heap slot
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HeapObject {
    Array { elements: Vec<RuntimeValue> },
    Object { properties: IndexMap<String, RuntimeValue> },
}

impl HeapObject {
    /// Values directly referenced by this slot
    fn children(&self) -> Box<dyn Iterator<Item = &RuntimeValue> + '_> {
        match self {
            HeapObject::Array { elements } => Box::new(elements.iter()),
            HeapObject::Object { properties } => Box::new(properties.values()),
        }
    }
}

/// The heap
#[derive(Debug, Clone, Default, Serialize)]
pub struct Heap {
    objects: FxHashMap<HeapId, HeapObject>,
    #[serde(skip)]
    next_id: u64,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    fn next_id(&mut self) -> HeapId {
        self.next_id += 1;
        HeapId(self.next_id)
    }

    /// Allocate a new array and return a reference value to it
    pub fn alloc_array(&mut self, elements: Vec<RuntimeValue>) -> RuntimeValue {
        let id = self.next_id();
        self.objects.insert(id, HeapObject::Array { elements });
        RuntimeValue::Array { id }
    }

    /// Allocate a new object and return a reference value to it
    pub fn alloc_object(&mut self, properties: IndexMap<String, RuntimeValue>) -> RuntimeValue {
        let id = self.next_id();
        self.objects.insert(id, HeapObject::Object { properties });
        RuntimeValue::Object { id }
    }

    pub fn get(&self, id: HeapId) -> Option<&HeapObject> {
        self.objects.get(&id)
    }

    /// Elements of the array with this id
    pub fn array(&self, id: HeapId) -> Option<&Vec<RuntimeValue>> {
        match self.objects.get(&id) {
            Some(HeapObject::Array { elements }) => Some(elements),
            _ => None,
        }
    }

    pub fn array_mut(&mut self, id: HeapId) -> Option<&mut Vec<RuntimeValue>> {
        match self.objects.get_mut(&id) {
            Some(HeapObject::Array { elements }) => Some(elements),
            _ => None,
        }
    }

    /// Properties of the object with this id
    pub fn object(&self, id: HeapId) -> Option<&IndexMap<String, RuntimeValue>> {
        match self.objects.get(&id) {
            Some(HeapObject::Object { properties }) => Some(properties),
            _ => None,
        }
    }

    pub fn object_mut(&mut self, id: HeapId) -> Option<&mut IndexMap<String, RuntimeValue>> {
        match self.objects.get_mut(&id) {
            Some(HeapObject::Object { properties }) => Some(properties),
            _ => None,
        }
    }

    /// Number of live slots
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Copy every slot reachable from `roots` into an independent heap that
    /// keeps the same ids.
    pub fn snapshot<'a>(&self, roots: impl IntoIterator<Item = &'a RuntimeValue>) -> Heap {
        let mut copy = Heap {
            objects: FxHashMap::default(),
            next_id: self.next_id,
        };
        let mut pending: Vec<HeapId> = roots.into_iter().filter_map(|v| v.heap_id()).collect();

        while let Some(id) = pending.pop() {
            if copy.objects.contains_key(&id) {
                continue;
            }
            if let Some(object) = self.objects.get(&id) {
                pending.extend(object.children().filter_map(|v| v.heap_id()));
                copy.objects.insert(id, object.clone());
            }
        }

        copy
    }
}
