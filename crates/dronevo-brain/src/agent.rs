use dronevo_genetics::Genotype;

use crate::network::{FeedForwardNetwork, ParameterCountError};

/// Binds one genotype to one decoded feed-forward network for the duration
/// of a generation's evaluation, and tracks whether the agent is alive.
///
/// Agents are not persisted; they are rebuilt (or [`reset`](Self::reset))
/// every generation from the current population.
#[derive(Debug)]
pub struct Agent {
    genotype: Genotype,
    network: FeedForwardNetwork,
    alive: bool,
}

impl Agent {
    /// Decodes the genotype into a network once. A parameter-count mismatch
    /// against the topology is a fatal construction error.
    pub fn new(genotype: Genotype, topology: &[usize]) -> Result<Self, ParameterCountError> {
        let network = FeedForwardNetwork::new(topology, genotype.parameters())?;
        Ok(Self {
            genotype,
            network,
            alive: true,
        })
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    pub fn genotype_mut(&mut self) -> &mut Genotype {
        &mut self.genotype
    }

    /// Hands the genotype back once the generation is over.
    #[must_use]
    pub fn into_genotype(self) -> Genotype {
        self.genotype
    }

    /// Maps sensor readings to a control vector via the network, or `None`
    /// once the agent is dead.
    #[must_use]
    pub fn decide(&self, sensor_readings: &[f32]) -> Option<Vec<f32>> {
        self.alive
            .then(|| self.network.process(sensor_readings))
    }

    /// Marks the agent dead. Idempotent: returns `true` exactly once, on the
    /// transition from alive to dead, so the caller gets the one-shot death
    /// notification even if `kill` is called repeatedly.
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    /// Clears the dead flag so the owning controller can reuse this agent in
    /// a new generation.
    pub fn reset(&mut self) {
        self.alive = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_agent() -> Agent {
        // topology [2, 2]: 2*2 + 2 = 6 parameters
        Agent::new(Genotype::new(vec![0.5; 6]), &[2, 2]).unwrap()
    }

    #[test]
    fn test_parameter_mismatch_is_fatal() {
        let err = Agent::new(Genotype::new(vec![0.5; 5]), &[2, 2]).unwrap_err();
        assert_eq!(err.expected, 6);
        assert_eq!(err.actual, 5);
    }

    #[test]
    fn test_decide_delegates_while_alive() {
        let agent = test_agent();
        let controls = agent.decide(&[1.0, 0.0]).unwrap();
        assert_eq!(controls.len(), 2);
    }

    #[test]
    fn test_decide_is_noop_once_dead() {
        let mut agent = test_agent();
        assert!(agent.kill());
        assert!(agent.decide(&[1.0, 0.0]).is_none());
    }

    #[test]
    fn test_kill_notifies_exactly_once() {
        let mut agent = test_agent();
        assert!(agent.kill());
        assert!(!agent.kill());
        assert!(!agent.kill());
    }

    #[test]
    fn test_reset_revives_agent() {
        let mut agent = test_agent();
        agent.kill();
        agent.reset();
        assert!(agent.is_alive());
        assert!(agent.decide(&[0.0, 0.0]).is_some());
        // the next kill is a fresh one-shot notification
        assert!(agent.kill());
    }
}
