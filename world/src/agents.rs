//! Identifier registry for agents living on the board.

use std::collections::BTreeSet;

use tile_defence_core::AgentId;

/// Issues agent identifiers and accepts them back on arrival.
///
/// The registry never stores motion state; it only remembers which
/// identifiers it handed out so reclamation can be checked.
#[derive(Debug)]
pub(crate) struct AgentRegistry {
    next_agent_id: AgentId,
    live: BTreeSet<AgentId>,
}

impl AgentRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            next_agent_id: AgentId::new(0),
            live: BTreeSet::new(),
        }
    }

    pub(crate) fn allocate(&mut self) -> AgentId {
        let agent = self.next_agent_id;
        self.next_agent_id = AgentId::new(agent.get().wrapping_add(1));
        let _ = self.live.insert(agent);
        agent
    }

    /// Accepts an agent back from the motion system.
    ///
    /// # Panics
    ///
    /// Panics when the agent was not issued by this registry or was already
    /// reclaimed.
    pub(crate) fn reclaim(&mut self, agent: AgentId) {
        assert!(
            self.live.remove(&agent),
            "agent {agent} was not issued by this registry"
        );
    }

    pub(crate) fn live(&self) -> usize {
        self.live.len()
    }
}
