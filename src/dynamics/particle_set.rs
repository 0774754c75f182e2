use crate::dynamics::{Particle, ParticleId};
use rustc_hash::FxHashMap;
use std::ops::{Index, IndexMut};

/// The slot of a particle inside a [`ParticleSet`].
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParticleIndex {
    /// A particle owned by this node.
    Local(usize),
    /// A read-through mirror of a particle owned by a neighbor node.
    Ghost(usize),
}

impl ParticleIndex {
    /// True for locally-owned particles.
    pub fn is_local(self) -> bool {
        matches!(self, ParticleIndex::Local(_))
    }
}

/// The particle population visible to one node: the particles it owns plus
/// ghost mirrors of neighbors' particles.
///
/// Identities must be unique across locals and ghosts of one set. Bonds are
/// always walked from a locally-owned endpoint; the partner is resolved with
/// [`ParticleSet::resolve`] and may land on either side.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct ParticleSet {
    locals: Vec<Particle>,
    ghosts: Vec<Particle>,
    lookup: FxHashMap<ParticleId, ParticleIndex>,
}

impl ParticleSet {
    /// An empty population.
    pub fn new() -> Self {
        ParticleSet::default()
    }

    /// Inserts a locally-owned particle.
    pub fn insert(&mut self, particle: Particle) -> ParticleIndex {
        debug_assert!(!self.lookup.contains_key(&particle.id));
        let index = ParticleIndex::Local(self.locals.len());
        self.lookup.insert(particle.id, index);
        self.locals.push(particle);
        index
    }

    /// Inserts a ghost mirror of a particle owned by a neighbor node.
    pub fn insert_ghost(&mut self, particle: Particle) -> ParticleIndex {
        debug_assert!(!self.lookup.contains_key(&particle.id));
        let index = ParticleIndex::Ghost(self.ghosts.len());
        self.lookup.insert(particle.id, index);
        self.ghosts.push(particle);
        index
    }

    /// Resolves an identity to its slot, if the particle is stored on this
    /// node. `None` is the broken-bond condition: the particle lives on a
    /// non-neighbor node.
    pub fn resolve(&self, id: ParticleId) -> Option<ParticleIndex> {
        self.lookup.get(&id).copied()
    }

    /// Number of locally-owned particles.
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// Number of ghost mirrors.
    pub fn ghost_count(&self) -> usize {
        self.ghosts.len()
    }

    /// The `i`-th locally-owned particle.
    pub fn local(&self, i: usize) -> &Particle {
        &self.locals[i]
    }

    /// Iterates over the locally-owned particles.
    pub fn locals(&self) -> impl Iterator<Item = &Particle> {
        self.locals.iter()
    }

    /// Iterates mutably over the locally-owned particles.
    pub fn locals_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.locals.iter_mut()
    }

    /// Iterates over the ghost mirrors, in insertion order.
    pub fn ghosts(&self) -> impl Iterator<Item = &Particle> {
        self.ghosts.iter()
    }

    /// Iterates mutably over the ghost mirrors, in insertion order.
    pub fn ghosts_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.ghosts.iter_mut()
    }

    /// Iterates mutably over every particle stored on this node, locals
    /// first.
    pub fn particles_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.locals.iter_mut().chain(self.ghosts.iter_mut())
    }
}

impl Index<ParticleIndex> for ParticleSet {
    type Output = Particle;

    fn index(&self, index: ParticleIndex) -> &Particle {
        match index {
            ParticleIndex::Local(i) => &self.locals[i],
            ParticleIndex::Ghost(i) => &self.ghosts[i],
        }
    }
}

impl IndexMut<ParticleIndex> for ParticleSet {
    fn index_mut(&mut self, index: ParticleIndex) -> &mut Particle {
        match index {
            ParticleIndex::Local(i) => &mut self.locals[i],
            ParticleIndex::Ghost(i) => &mut self.ghosts[i],
        }
    }
}
