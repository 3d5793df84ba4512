//! Store contract for generated entities.
//!
//! A generated entity never owns component data. It holds a store handle
//! and an `EntityId`, and goes through `ComponentStore` for every read and
//! write that is not served by a shadow field.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    any::{Any, TypeId},
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt,
    rc::Rc,
};

///
/// EntityId
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("#{_0}")]
pub struct EntityId(pub u64);

///
/// Component
/// anything storable: a `'static` type with a zero value
///

pub trait Component: Any + Default {}

impl<T: Any + Default> Component for T {}

///
/// ComponentType
///
/// Runtime descriptor of one component kind, usable in `const` archetype
/// tables.
///

#[derive(Clone, Copy)]
pub struct ComponentType {
    name: &'static str,
    type_id: fn() -> TypeId,
    make_default: fn() -> Box<dyn Any>,
}

impl ComponentType {
    #[must_use]
    pub const fn of<C: Component>(name: &'static str) -> Self {
        Self {
            name,
            type_id: TypeId::of::<C>,
            make_default: boxed_default::<C>,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// A boxed `C::default()`.
    #[must_use]
    pub fn make_default(&self) -> Box<dyn Any> {
        (self.make_default)()
    }
}

fn boxed_default<C: Component>() -> Box<dyn Any> {
    Box::new(C::default())
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.name).finish()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for ComponentType {}

///
/// ComponentStore
///
/// Typed get/set-by-kind over per-entity component data. Methods take
/// `&self`; implementations provide their own interior mutability.
///
/// Reading or writing a kind the entity was not created with is a contract
/// violation and may panic. Closures must not call back into the store.
///

pub trait ComponentStore {
    /// Create an entry holding a default instance of every archetype kind.
    fn create(&self, archetype: &[ComponentType]) -> EntityId;

    /// Insert or replace one component.
    fn insert<C: Component>(&self, id: EntityId, component: C);

    fn read<C: Component, R, F: FnOnce(&C) -> R>(&self, id: EntityId, f: F) -> R;

    fn write<C: Component, R, F: FnOnce(&mut C) -> R>(&self, id: EntityId, f: F) -> R;
}

impl<T: ComponentStore> ComponentStore for &T {
    fn create(&self, archetype: &[ComponentType]) -> EntityId {
        (**self).create(archetype)
    }

    fn insert<C: Component>(&self, id: EntityId, component: C) {
        (**self).insert(id, component);
    }

    fn read<C: Component, R, F: FnOnce(&C) -> R>(&self, id: EntityId, f: F) -> R {
        (**self).read(id, f)
    }

    fn write<C: Component, R, F: FnOnce(&mut C) -> R>(&self, id: EntityId, f: F) -> R {
        (**self).write(id, f)
    }
}

impl<T: ComponentStore> ComponentStore for Rc<T> {
    fn create(&self, archetype: &[ComponentType]) -> EntityId {
        (**self).create(archetype)
    }

    fn insert<C: Component>(&self, id: EntityId, component: C) {
        (**self).insert(id, component);
    }

    fn read<C: Component, R, F: FnOnce(&C) -> R>(&self, id: EntityId, f: F) -> R {
        (**self).read(id, f)
    }

    fn write<C: Component, R, F: FnOnce(&mut C) -> R>(&self, id: EntityId, f: F) -> R {
        (**self).write(id, f)
    }
}

///
/// MemoryStore
/// single-threaded reference store
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    next: Cell<u64>,
    entities: RefCell<BTreeMap<EntityId, BTreeMap<TypeId, Box<dyn Any>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }

    #[must_use]
    pub fn contains<C: Component>(&self, id: EntityId) -> bool {
        self.entities
            .borrow()
            .get(&id)
            .is_some_and(|components| components.contains_key(&TypeId::of::<C>()))
    }

    /// Number of components held by `id`.
    #[must_use]
    pub fn component_count(&self, id: EntityId) -> usize {
        self.entities.borrow().get(&id).map_or(0, BTreeMap::len)
    }
}

impl ComponentStore for MemoryStore {
    fn create(&self, archetype: &[ComponentType]) -> EntityId {
        let id = EntityId(self.next.get());
        self.next.set(id.0 + 1);

        let components = archetype
            .iter()
            .map(|kind| (kind.type_id(), kind.make_default()))
            .collect();
        self.entities.borrow_mut().insert(id, components);

        id
    }

    fn insert<C: Component>(&self, id: EntityId, component: C) {
        self.entities
            .borrow_mut()
            .entry(id)
            .or_default()
            .insert(TypeId::of::<C>(), Box::new(component));
    }

    fn read<C: Component, R, F: FnOnce(&C) -> R>(&self, id: EntityId, f: F) -> R {
        let entities = self.entities.borrow();
        let component = entities
            .get(&id)
            .and_then(|components| components.get(&TypeId::of::<C>()))
            .and_then(|boxed| boxed.downcast_ref::<C>())
            .unwrap_or_else(|| missing::<C>(id));

        f(component)
    }

    fn write<C: Component, R, F: FnOnce(&mut C) -> R>(&self, id: EntityId, f: F) -> R {
        let mut entities = self.entities.borrow_mut();
        let component = entities
            .get_mut(&id)
            .and_then(|components| components.get_mut(&TypeId::of::<C>()))
            .and_then(|boxed| boxed.downcast_mut::<C>())
            .unwrap_or_else(|| missing::<C>(id));

        f(component)
    }
}

fn missing<C>(id: EntityId) -> ! {
    panic!(
        "entity {id} has no component {}",
        std::any::type_name::<C>()
    )
}
