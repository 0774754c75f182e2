use crate::comm::DomainComm;
use crate::dynamics::solver::CorrectionBuffer;
use crate::dynamics::{ParticleId, ParticleIndex, ParticleSet};
use crate::math::{Point, Vector};
use crossbeam::channel::{unbounded, Receiver, Sender};

#[derive(Clone, Debug)]
struct Mirror {
    id: ParticleId,
    position: Point,
    velocity: Vector,
}

#[derive(Clone, Debug)]
enum Message {
    Corrections(Vec<(ParticleId, Vector)>),
    Mirrors(Vec<Mirror>),
    Flag(bool),
}

/// A full-mesh communicator connecting the nodes of one process.
///
/// Every collective is realized as an all-to-all exchange over unbounded
/// channels, so each call blocks until the slowest node arrives — the same
/// lockstep a message-passing runtime gives. Intended for running one domain
/// per thread: create the mesh up front with [`ChannelComm::mesh`] and hand
/// one communicator to each worker.
pub struct ChannelComm {
    rank: usize,
    txs: Vec<Option<Sender<Message>>>,
    rxs: Vec<Option<Receiver<Message>>>,
}

impl ChannelComm {
    /// Creates a fully-connected mesh of `nodes` communicators, one per
    /// rank.
    pub fn mesh(nodes: usize) -> Vec<ChannelComm> {
        let mut tx_slots: Vec<Vec<Option<Sender<Message>>>> =
            (0..nodes).map(|_| (0..nodes).map(|_| None).collect()).collect();
        let mut rx_slots: Vec<Vec<Option<Receiver<Message>>>> =
            (0..nodes).map(|_| (0..nodes).map(|_| None).collect()).collect();

        for from in 0..nodes {
            for to in 0..nodes {
                if from != to {
                    let (tx, rx) = unbounded();
                    tx_slots[from][to] = Some(tx);
                    rx_slots[to][from] = Some(rx);
                }
            }
        }

        tx_slots
            .into_iter()
            .zip(rx_slots)
            .enumerate()
            .map(|(rank, (txs, rxs))| ChannelComm { rank, txs, rxs })
            .collect()
    }

    /// The rank of this node in the mesh.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of nodes in the mesh.
    pub fn nodes(&self) -> usize {
        self.txs.len()
    }

    /// Sends `message` to every peer and receives one message from each, in
    /// rank order. Panics if a peer dropped out of the collective: per the
    /// protocol, that is an unrecoverable divergence.
    fn all_to_all(&mut self, message: Message) -> Vec<Message> {
        for tx in self.txs.iter().flatten() {
            tx.send(message.clone())
                .expect("peer node left the collective");
        }
        self.rxs
            .iter()
            .flatten()
            .map(|rx| rx.recv().expect("peer node left the collective"))
            .collect()
    }
}

impl DomainComm for ChannelComm {
    fn collect_ghost_corrections(
        &mut self,
        particles: &ParticleSet,
        corrections: &mut CorrectionBuffer,
    ) {
        let outgoing = corrections.take_ghost_corrections(particles);
        for message in self.all_to_all(Message::Corrections(outgoing)) {
            match message {
                Message::Corrections(entries) => {
                    for (id, value) in entries {
                        if let Some(index @ ParticleIndex::Local(_)) = particles.resolve(id) {
                            corrections.add(index, value);
                        }
                    }
                }
                _ => unreachable!("collective out of order"),
            }
        }
    }

    fn update_ghost_particles(&mut self, particles: &mut ParticleSet) {
        let mirrors: Vec<Mirror> = particles
            .locals()
            .map(|p| Mirror {
                id: p.id,
                position: p.position,
                velocity: p.velocity,
            })
            .collect();
        for message in self.all_to_all(Message::Mirrors(mirrors)) {
            match message {
                Message::Mirrors(entries) => {
                    for mirror in entries {
                        if let Some(index @ ParticleIndex::Ghost(_)) = particles.resolve(mirror.id)
                        {
                            let ghost = &mut particles[index];
                            ghost.position = mirror.position;
                            ghost.velocity = mirror.velocity;
                        }
                    }
                }
                _ => unreachable!("collective out of order"),
            }
        }
    }

    fn reduce_or(&mut self, flag: bool) -> bool {
        let mut reduced = flag;
        for message in self.all_to_all(Message::Flag(flag)) {
            match message {
                Message::Flag(other) => reduced = reduced || other,
                _ => unreachable!("collective out of order"),
            }
        }
        reduced
    }
}
