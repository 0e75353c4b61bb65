use crate::{Triangle, TriangleId};

#[derive(Clone, Copy)]
pub struct TrianglesView<'a> {
    items: &'a [Triangle],
}

impl<'a> TrianglesView<'a> {
    pub fn new(items: &'a [Triangle]) -> Self {
        Self { items }
    }

    pub fn get(&self, id: TriangleId) -> Triangle {
        self.items[id.get() as usize]
    }
}
