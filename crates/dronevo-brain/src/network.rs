/// Total parameter count a genotype must supply for the given topology:
/// one weight per input/output pair plus one bias per output, summed over
/// consecutive layer pairs.
///
/// # Examples
///
/// ```
/// # use dronevo_brain::parameter_count;
/// assert_eq!(parameter_count(&[2, 3, 4]), 2 * 3 + 3 + 3 * 4 + 4);
/// ```
#[must_use]
pub fn parameter_count(topology: &[usize]) -> usize {
    topology.windows(2).map(|pair| pair[0] * pair[1] + pair[1]).sum()
}

/// Fatal construction error: the parameter vector does not match the
/// topology's decodable parameter count.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("topology {topology:?} decodes {expected} parameters, genotype supplies {actual}")]
pub struct ParameterCountError {
    pub topology: Vec<usize>,
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone)]
struct Layer {
    inputs: usize,
    outputs: usize,
    /// Row-major, one row of `inputs` weights per output unit.
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    fn process(&self, input: &[f32]) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.inputs);
        (0..self.outputs)
            .map(|o| {
                let row = &self.weights[o * self.inputs..(o + 1) * self.inputs];
                let sum = std::iter::zip(row, input).map(|(w, x)| w * x).sum::<f32>();
                sigmoid(sum + self.biases[o])
            })
            .collect()
    }
}

/// Standard logistic function; outputs lie in `(0, 1)`.
#[must_use]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// A stateless layered decision function decoded from a flat parameter
/// vector.
///
/// The parameter vector is sliced sequentially into per-layer weight
/// matrices (row-major, next-layer-size × previous-layer-size) and bias
/// vectors. Processing applies `sigmoid(weights · input + bias)` per layer.
/// The network holds no mutable state: the same parameters and input always
/// produce the same output.
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    topology: Vec<usize>,
    layers: Vec<Layer>,
}

impl FeedForwardNetwork {
    /// Decodes a network from a topology and a parameter vector.
    ///
    /// # Panics
    ///
    /// Panics if the topology has fewer than two layers.
    pub fn new(topology: &[usize], parameters: &[f32]) -> Result<Self, ParameterCountError> {
        assert!(topology.len() >= 2, "topology needs input and output widths");
        let expected = parameter_count(topology);
        if parameters.len() != expected {
            return Err(ParameterCountError {
                topology: topology.to_vec(),
                expected,
                actual: parameters.len(),
            });
        }

        let mut layers = Vec::with_capacity(topology.len() - 1);
        let mut offset = 0;
        for pair in topology.windows(2) {
            let (inputs, outputs) = (pair[0], pair[1]);
            let weights = parameters[offset..offset + inputs * outputs].to_vec();
            offset += inputs * outputs;
            let biases = parameters[offset..offset + outputs].to_vec();
            offset += outputs;
            layers.push(Layer {
                inputs,
                outputs,
                weights,
                biases,
            });
        }

        Ok(Self {
            topology: topology.to_vec(),
            layers,
        })
    }

    #[must_use]
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    #[must_use]
    pub fn input_len(&self) -> usize {
        *self.topology.first().unwrap()
    }

    #[must_use]
    pub fn output_len(&self) -> usize {
        *self.topology.last().unwrap()
    }

    /// Runs the input vector through every layer.
    ///
    /// # Panics
    ///
    /// Panics if `input` does not match the topology's input width.
    #[must_use]
    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        assert_eq!(input.len(), self.input_len(), "input width mismatch");
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.process(&current);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: [usize; 3] = [2, 3, 4];

    #[test]
    fn test_parameter_count_for_three_layer_topology() {
        assert_eq!(parameter_count(&TOPOLOGY), 28);
    }

    #[test]
    fn test_wrong_parameter_count_is_fatal() {
        let err = FeedForwardNetwork::new(&TOPOLOGY, &vec![0.0; 27]).unwrap_err();
        assert_eq!(err.expected, 28);
        assert_eq!(err.actual, 27);
        assert_eq!(err.topology, TOPOLOGY);
    }

    #[test]
    fn test_output_width_matches_last_layer() {
        let network = FeedForwardNetwork::new(&TOPOLOGY, &vec![0.1; 28]).unwrap();
        let output = network.process(&[1.0, -1.0]);
        assert_eq!(output.len(), 4);
        assert!(output.iter().all(|y| (0.0..1.0).contains(y)));
    }

    #[test]
    fn test_process_is_deterministic() {
        let parameters: Vec<f32> = (0..28u16).map(|i| f32::from(i) * 0.05 - 0.7).collect();
        let network = FeedForwardNetwork::new(&TOPOLOGY, &parameters).unwrap();
        let input = [0.3, 0.7];
        assert_eq!(network.process(&input), network.process(&input));
    }

    #[test]
    fn test_single_unit_network_matches_hand_computation() {
        // topology [1, 1]: one weight, one bias
        let network = FeedForwardNetwork::new(&[1, 1], &[2.0, -1.0]).unwrap();
        let output = network.process(&[0.5]);
        let expected = sigmoid(2.0 * 0.5 - 1.0);
        assert!((output[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_zero_parameters_give_midpoint_outputs() {
        let network = FeedForwardNetwork::new(&TOPOLOGY, &vec![0.0; 28]).unwrap();
        let output = network.process(&[5.0, -5.0]);
        assert!(output.iter().all(|y| (y - 0.5).abs() < 1e-6));
    }
}
