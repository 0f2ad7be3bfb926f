//! Storage addressed by typed handles
use std::{collections::HashMap, hash::Hash, marker::PhantomData};

/// A `usize` wrapper used as a typed handle
pub(crate) trait Index: Copy {
    fn new(i: usize) -> Self;
    fn get(&self) -> usize;
}

/// Declares a handle type which implements [`Index`]
macro_rules! define_index {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Copy, Clone, Default, Debug, Eq, PartialEq, Hash, Ord, PartialOrd,
        )]
        pub struct $name(usize);

        impl crate::context::indexed::Index for $name {
            fn new(i: usize) -> Self {
                Self(i)
            }
            fn get(&self) -> usize {
                self.0
            }
        }
    };
}
pub(crate) use define_index;

////////////////////////////////////////////////////////////////////////////////

/// A `Vec` which is only indexed by handles of type `I`
#[derive(Clone, Debug)]
pub(crate) struct IndexVec<V, I>(Vec<V>, PhantomData<fn(I)>);

impl<V, I> IndexVec<V, I> {
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<V, I> From<Vec<V>> for IndexVec<V, I> {
    fn from(v: Vec<V>) -> Self {
        Self(v, PhantomData)
    }
}

impl<V, I: Index> std::ops::Index<I> for IndexVec<V, I> {
    type Output = V;
    fn index(&self, i: I) -> &V {
        &self.0[i.get()]
    }
}

impl<V, I: Index> std::ops::IndexMut<I> for IndexVec<V, I> {
    fn index_mut(&mut self, i: I) -> &mut V {
        &mut self.0[i.get()]
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Interning table of values, addressable by value or by handle
///
/// Every value is stored once; inserting an equal value returns the handle of
/// the earlier copy.
#[derive(Clone, Debug)]
pub(crate) struct IndexMap<V, I> {
    values: IndexVec<V, I>,
    handles: HashMap<V, I>,
}

impl<V, I> Default for IndexMap<V, I> {
    fn default() -> Self {
        Self {
            values: Vec::new().into(),
            handles: HashMap::new(),
        }
    }
}

impl<V: Eq + Hash + Clone, I: Index> IndexMap<V, I> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_by_index(&self, i: I) -> Option<&V> {
        self.values.0.get(i.get())
    }

    /// Returns the handle for `v`, storing it if it's new
    pub fn insert(&mut self, v: V) -> I {
        if let Some(i) = self.handles.get(&v) {
            return *i;
        }
        let i = I::new(self.values.len());
        self.handles.insert(v.clone(), i);
        self.values.0.push(v);
        i
    }
}
