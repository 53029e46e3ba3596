use super::StreamingMetric;
use num_traits::ToPrimitive;

/// The streaming mean of the inputs, `None` if there were no inputs.
#[derive(Clone, Debug, Default)]
pub struct Mean {
	n: u64,
	sum: f64,
}

impl Mean {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric<'_> for Mean {
	type Input = f32;
	type Output = Option<f32>;

	fn update(&mut self, input: Self::Input) {
		self.n += 1;
		self.sum += input.to_f64().unwrap();
	}

	fn merge(&mut self, other: Self) {
		self.n += other.n;
		self.sum += other.sum;
	}

	fn finalize(self) -> Self::Output {
		if self.n == 0 {
			None
		} else {
			Some((self.sum / self.n.to_f64().unwrap()).to_f32().unwrap())
		}
	}
}

#[test]
fn test_mean() {
	let mut mean = Mean::new();
	assert_eq!(mean.clone().finalize(), None);
	mean.update(1.0);
	mean.update(2.0);
	let mut other = Mean::new();
	other.update(6.0);
	mean.merge(other);
	assert_eq!(mean.finalize(), Some(3.0));
}
