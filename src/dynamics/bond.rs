use crate::dynamics::ParticleId;
use crate::math::Real;
use std::ops::Index;

/// Identifier of a bonded-interaction record in a [`BondedInteractionSet`].
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InteractionId(pub u32);

/// A rigid pair-distance constraint.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigidBond {
    /// Target squared bond length.
    pub sq_length: Real,
    /// Relative tolerance on the positional residual.
    pub pos_tolerance: Real,
    /// Absolute tolerance on the radial relative velocity.
    pub vel_tolerance: Real,
}

impl RigidBond {
    /// A rigid bond with the given target squared length and tolerances.
    pub fn new(sq_length: Real, pos_tolerance: Real, vel_tolerance: Real) -> Self {
        RigidBond {
            sq_length,
            pos_tolerance,
            vel_tolerance,
        }
    }
}

/// A harmonic pair bond.
///
/// Its force evaluation belongs to the integrator; the record exists so
/// packed bond lists mixing bond kinds can be walked past it.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HarmonicBond {
    /// Spring constant.
    pub stiffness: Real,
    /// Rest length.
    pub rest_length: Real,
}

/// A harmonic angle bond between a particle and two partners.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AngleHarmonicBond {
    /// Bending constant.
    pub bend: Real,
    /// Rest angle, in radians.
    pub rest_angle: Real,
}

/// A bonded-interaction record: the kind of interaction plus its parameters.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BondedInteraction {
    /// A rigid pair-distance constraint, enforced by the solver.
    RigidBond(RigidBond),
    /// A harmonic pair bond, skipped by the solver.
    Harmonic(HarmonicBond),
    /// A harmonic angle bond, skipped by the solver.
    AngleHarmonic(AngleHarmonicBond),
}

impl BondedInteraction {
    /// Number of partner ids following this interaction's id in a packed
    /// bond list.
    pub fn arity(&self) -> usize {
        match self {
            BondedInteraction::RigidBond(_) | BondedInteraction::Harmonic(_) => 1,
            BondedInteraction::AngleHarmonic(_) => 2,
        }
    }

    /// The rigid-bond parameters, if this is a rigid bond.
    pub fn as_rigid_bond(&self) -> Option<&RigidBond> {
        match self {
            BondedInteraction::RigidBond(bond) => Some(bond),
            _ => None,
        }
    }
}

/// Registry of bonded-interaction parameters, indexed by [`InteractionId`].
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct BondedInteractionSet {
    params: Vec<BondedInteraction>,
}

impl BondedInteractionSet {
    /// An empty registry.
    pub fn new() -> Self {
        BondedInteractionSet::default()
    }

    /// Registers an interaction and returns its id.
    pub fn insert(&mut self, interaction: BondedInteraction) -> InteractionId {
        let id = InteractionId(self.params.len() as u32);
        self.params.push(interaction);
        id
    }

    /// The interaction registered under `id`, if any.
    pub fn get(&self, id: InteractionId) -> Option<&BondedInteraction> {
        self.params.get(id.0 as usize)
    }

    /// Number of registered interactions.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Index<InteractionId> for BondedInteractionSet {
    type Output = BondedInteraction;

    fn index(&self, id: InteractionId) -> &BondedInteraction {
        &self.params[id.0 as usize]
    }
}

/// The packed bond list of one particle: `(interaction id, partner ids…)`
/// tuples flattened into a single integer sequence, where the number of
/// partner ids per tuple is the interaction's arity.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BondList {
    entries: Vec<u32>,
}

impl BondList {
    /// An empty bond list.
    pub fn new() -> Self {
        BondList::default()
    }

    /// Appends one bond. `partners.len()` must match the arity of the
    /// interaction; the list itself does not know the registry, so this is
    /// checked when the list is walked.
    pub fn push(&mut self, interaction: InteractionId, partners: &[ParticleId]) {
        self.entries.push(interaction.0);
        self.entries.extend(partners.iter().map(|p| p.0));
    }

    /// True if the particle carries no bonds.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw packed entries.
    pub fn raw(&self) -> &[u32] {
        &self.entries
    }

    /// Walks the list, resolving every tuple's kind through `registry`.
    ///
    /// The walk ends early if an entry references an unregistered interaction
    /// or the list is truncated mid-tuple.
    pub fn iter<'a>(&'a self, registry: &'a BondedInteractionSet) -> BondIter<'a> {
        BondIter {
            entries: &self.entries,
            registry,
            cursor: 0,
        }
    }
}

/// One bond yielded by [`BondIter`].
#[derive(Copy, Clone, Debug)]
pub struct Bond<'a> {
    /// Registry id of the interaction.
    pub interaction_id: InteractionId,
    /// The interaction record.
    pub interaction: &'a BondedInteraction,
    partners: &'a [u32],
}

impl Bond<'_> {
    /// The `i`-th partner of this bond.
    pub fn partner(&self, i: usize) -> ParticleId {
        ParticleId(self.partners[i])
    }

    /// Number of partners (the interaction's arity).
    pub fn partner_count(&self) -> usize {
        self.partners.len()
    }
}

/// Iterator over a packed bond list.
pub struct BondIter<'a> {
    entries: &'a [u32],
    registry: &'a BondedInteractionSet,
    cursor: usize,
}

impl<'a> Iterator for BondIter<'a> {
    type Item = Bond<'a>;

    fn next(&mut self) -> Option<Bond<'a>> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        let interaction_id = InteractionId(self.entries[self.cursor]);
        let interaction = self.registry.get(interaction_id)?;
        let start = self.cursor + 1;
        let end = start + interaction.arity();
        if end > self.entries.len() {
            debug_assert!(false, "truncated bond tuple");
            return None;
        }
        self.cursor = end;
        Some(Bond {
            interaction_id,
            interaction,
            partners: &self.entries[start..end],
        })
    }
}
