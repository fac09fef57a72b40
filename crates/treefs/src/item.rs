// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::any::Any;
use std::rc::Rc;

/// Optional capability of an item payload to produce an independent copy.
///
/// The default returns `None`, in which case a cloned item shares the
/// payload with the original.
pub trait DeepCloneable {
    fn deep_clone(&self) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

macro_rules! deep_cloneable_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl DeepCloneable for $t {
                fn deep_clone(&self) -> Option<Self> {
                    Some(self.clone())
                }
            }
        )*
    };
}

deep_cloneable_by_value!(
    String, Vec<u8>, bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128,
    isize, f32, f64,
);

impl DeepCloneable for Box<dyn Any> {}

/// A typed data item.
pub struct Item<T> {
    data: Option<Rc<T>>,
}

impl<T> Item<T> {
    pub fn new(data: Option<T>) -> Self {
        Self {
            data: data.map(Rc::new),
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    /// Mutable access, unless the payload is absent or shared with a clone.
    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut().and_then(Rc::get_mut)
    }

    pub fn set_data(&mut self, data: Option<T>) {
        self.data = data.map(Rc::new);
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// True when both items point at the same payload allocation.
    #[must_use]
    pub fn shares_data_with(&self, other: &Item<T>) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn share(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<T: DeepCloneable> Item<T> {
    /// Copy the payload if the type can, otherwise share it.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        match self.data.as_deref().map(DeepCloneable::deep_clone) {
            Some(Some(copy)) => Self::new(Some(copy)),
            _ => self.share(),
        }
    }
}

impl Item<Box<dyn Any>> {
    /// Downcast a dynamically typed payload.
    pub fn data_as<U: Any>(&self) -> Option<&U> {
        self.data().and_then(|b| b.downcast_ref::<U>())
    }
}
