/// Fixed topology of the controller network: one hidden layer, sigmoid
/// activations, a bias term per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkShape {
    pub inputs: usize,
    pub hidden: usize,
    pub outputs: usize,
}

impl NetworkShape {
    /// Shape used for Melee agents: 19 state features in, 14 discrete
    /// controller actions out.
    pub const MELEE: NetworkShape = NetworkShape {
        inputs: 19,
        hidden: 30,
        outputs: 14,
    };

    /// Number of weights a genome must carry for this shape:
    /// `(inputs + 1) * hidden + (hidden + 1) * outputs` (the `+ 1` is the
    /// bias input of each layer).
    #[must_use]
    pub fn weight_count(&self) -> usize {
        (self.inputs + 1) * self.hidden + (self.hidden + 1) * self.outputs
    }
}

/// The genome length does not match the network shape.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("genome has {actual} genes, shape needs {expected}")]
pub struct ShapeError {
    pub expected: usize,
    pub actual: usize,
}

/// Feedforward network reading its weights straight from a genome.
///
/// Genome values live in `[0, 1]`; they are rescaled to `[-1, 1]` so the
/// network can express inhibitory connections. The genome itself is never
/// modified.
#[derive(Debug, Clone)]
pub struct Network {
    shape: NetworkShape,
    weights: Vec<f32>,
}

impl Network {
    pub fn from_genome(shape: NetworkShape, genome: &[f32]) -> Result<Self, ShapeError> {
        if genome.len() != shape.weight_count() {
            return Err(ShapeError {
                expected: shape.weight_count(),
                actual: genome.len(),
            });
        }
        let weights = genome.iter().map(|g| g.mul_add(2.0, -1.0)).collect();
        Ok(Self { shape, weights })
    }

    #[must_use]
    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    /// Runs one forward pass. Output activations are sigmoid, so every value
    /// lies in `(0, 1)`.
    #[must_use]
    pub fn forward(&self, inputs: &[f32]) -> Vec<f32> {
        assert_eq!(inputs.len(), self.shape.inputs);
        let hidden_weights = &self.weights[..(self.shape.inputs + 1) * self.shape.hidden];
        let output_weights = &self.weights[(self.shape.inputs + 1) * self.shape.hidden..];

        let hidden: Vec<f32> = (0..self.shape.hidden)
            .map(|j| {
                let row = &hidden_weights[j * (self.shape.inputs + 1)..][..self.shape.inputs + 1];
                let sum: f32 = inputs
                    .iter()
                    .zip(row)
                    .map(|(x, w)| x * w)
                    .sum::<f32>()
                    + row[self.shape.inputs];
                sigmoid(sum)
            })
            .collect();

        (0..self.shape.outputs)
            .map(|k| {
                let row = &output_weights[k * (self.shape.hidden + 1)..][..self.shape.hidden + 1];
                let sum: f32 = hidden
                    .iter()
                    .zip(row)
                    .map(|(h, w)| h * w)
                    .sum::<f32>()
                    + row[self.shape.hidden];
                sigmoid(sum)
            })
            .collect()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
