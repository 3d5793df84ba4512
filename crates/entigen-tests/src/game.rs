use std::rc::Rc;

#[derive(Clone, Default)]
pub struct Position {
    pub x: f32,
    pub on_change: Option<Rc<dyn Fn(f32)>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collider {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Health {
    pub value: u32,
}

impl Health {
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self { value }
    }
}
