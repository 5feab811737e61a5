/// Supplies the step size used each time accumulated gradients are applied.
///
/// The training loop asks for a rate once per completed batch, so stateful
/// schedules advance one step per weight update.
pub trait LearningRate {
    fn next_rate(&mut self) -> f64;
}

/// The same rate for every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantLearningRate {
    pub learning_rate: f64,
}

impl ConstantLearningRate {
    pub fn new(learning_rate: f64) -> ConstantLearningRate {
        ConstantLearningRate { learning_rate }
    }
}

impl Default for ConstantLearningRate {
    fn default() -> Self {
        ConstantLearningRate::new(0.1)
    }
}

impl LearningRate for ConstantLearningRate {
    fn next_rate(&mut self) -> f64 {
        self.learning_rate
    }
}

/// `initial * decay^step`, never going below `floor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    pub initial: f64,
    pub decay: f64,
    pub floor: f64,
    step: i32,
}

impl ExponentialDecay {
    pub fn new(initial: f64, decay: f64, floor: f64) -> ExponentialDecay {
        ExponentialDecay { initial, decay, floor, step: 0 }
    }
}

impl LearningRate for ExponentialDecay {
    fn next_rate(&mut self) -> f64 {
        let rate = self.initial * self.decay.powi(self.step);
        self.step = self.step.saturating_add(1);
        rate.max(self.floor)
    }
}

/// Any closure returning a rate is a schedule.
impl<F> LearningRate for F
where
    F: FnMut() -> f64,
{
    fn next_rate(&mut self) -> f64 {
        self()
    }
}
