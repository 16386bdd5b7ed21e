use std::collections::HashMap;

use crate::error::Result;
use crate::render::{AttributeLayout, Backend};
use crate::shapes::ShapeKind;

use super::ShaderSource;

/// Handle to a compiled program inside a [`ShaderRegistry`].
///
/// Slots are reused once their program is released; the generation tells a
/// stale id apart from the slot's current occupant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId {
    index: u32,
    generation: u32,
}

impl ProgramId {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

struct Slot<P> {
    generation: u32,
    program: Option<P>,
}

/// Compiled programs, and which one each shape kind draws with.
///
/// A program lives as long as some kind is assigned to it. Replacing the last
/// assignment releases it, and its id stops resolving. Shapes compare the id
/// they last bound against the current one on every draw.
pub struct ShaderRegistry<B: Backend> {
    slots: Vec<Slot<B::Program>>,
    free: Vec<u32>,
    by_kind: HashMap<ShapeKind, ProgramId>,
}

impl<B: Backend> ShaderRegistry<B> {
    /// Compiles the built-in solid-fill program and assigns it to every kind.
    pub fn load(backend: &mut B) -> Result<Self> {
        let source = ShaderSource::solid_fill();
        let program = backend.create_program(&source, &AttributeLayout::POSITION)?;

        let id = ProgramId {
            index: 0,
            generation: 0,
        };
        let by_kind = ShapeKind::ALL.iter().map(|&kind| (kind, id)).collect();

        log::debug!("shader registry loaded `{}` for {} shape kinds", source.label, ShapeKind::ALL.len());

        Ok(Self {
            slots: vec![Slot {
                generation: 0,
                program: Some(program),
            }],
            free: Vec::new(),
            by_kind,
        })
    }

    /// Compiles `source` and makes it the program for `kind`.
    ///
    /// On failure the previous assignment is kept. On success the previous
    /// program is released if no other kind still uses it.
    pub fn register(&mut self, backend: &mut B, kind: ShapeKind, source: &ShaderSource) -> Result<ProgramId> {
        let program = backend.create_program(source, &AttributeLayout::POSITION)?;

        let id = self.insert(program);
        if let Some(previous) = self.by_kind.insert(kind, id) {
            if !self.by_kind.values().any(|&assigned| assigned == previous) {
                self.release(previous);
            }
        }

        log::info!("shader `{}` registered for {kind}", source.label);
        Ok(id)
    }

    /// Program currently assigned to `kind`.
    #[inline]
    pub fn program_id(&self, kind: ShapeKind) -> ProgramId {
        // `load` fills every kind, `register` only overwrites.
        self.by_kind.get(&kind).copied().unwrap_or(ProgramId {
            index: 0,
            generation: 0,
        })
    }

    /// The live program behind `id`; `None` once it has been released.
    #[inline]
    pub fn program(&self, id: ProgramId) -> Option<&B::Program> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.program.as_ref())
    }

    /// Live programs.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.program.is_some()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, program: B::Program) -> ProgramId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.program = Some(program);
                ProgramId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    program: Some(program),
                });
                ProgramId { index, generation: 0 }
            }
        }
    }

    fn release(&mut self, id: ProgramId) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        if slot.generation == id.generation && slot.program.take().is_some() {
            log::debug!("released program {}", id.index);
            self.free.push(id.index);
        }
    }
}
