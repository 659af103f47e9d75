use crate::error::CollectionError;
use indexmap::Equivalent;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Capabilities required from each component of a [`CompositeKey`].
///
/// Components are hashed into the primary map and cloned into the secondary
/// indexes, so both operations have to be available at compile time.
pub trait KeyPart: Eq + Hash + Clone + Debug {}

impl<T> KeyPart for T where T: Eq + Hash + Clone + Debug {}

/// A key made of an id and a name.
/// Two keys are equal iff both of their components are equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey<Id, Name> {
    id: Id,
    name: Name,
}

impl<Id, Name> CompositeKey<Id, Name> {
    pub fn new(id: Id, name: Name) -> Self {
        Self { id, name }
    }

    /// Build a key out of components that may be missing.
    pub fn try_new(id: Option<Id>, name: Option<Name>) -> Result<Self, CollectionError> {
        let id = id.ok_or(CollectionError::InvalidArgument("id"))?;
        let name = name.ok_or(CollectionError::InvalidArgument("name"))?;

        Ok(Self::new(id, name))
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn into_parts(self) -> (Id, Name) {
        (self.id, self.name)
    }
}

impl<Id, Name> From<(Id, Name)> for CompositeKey<Id, Name> {
    fn from((id, name): (Id, Name)) -> Self {
        Self::new(id, name)
    }
}

impl<Id: Debug, Name: Debug> Debug for CompositeKey<Id, Name> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}, {:?}]", self.id, self.name)
    }
}

impl<Id: Display, Name: Display> Display for CompositeKey<Id, Name> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.id, self.name)
    }
}

/// Borrowed form of a [`CompositeKey`], for lookups that should not clone
/// the components. Hashes exactly like the owned key.
#[derive(Hash)]
pub(crate) struct KeyRef<'a, Id, Name> {
    id: &'a Id,
    name: &'a Name,
}

impl<'a, Id, Name> KeyRef<'a, Id, Name> {
    pub fn new(id: &'a Id, name: &'a Name) -> Self {
        Self { id, name }
    }
}

impl<Id: Eq, Name: Eq> Equivalent<CompositeKey<Id, Name>> for KeyRef<'_, Id, Name> {
    fn equivalent(&self, key: &CompositeKey<Id, Name>) -> bool {
        *self.id == key.id && *self.name == key.name
    }
}

impl<Id: Debug, Name: Debug> Debug for KeyRef<'_, Id, Name> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}, {:?}]", self.id, self.name)
    }
}
