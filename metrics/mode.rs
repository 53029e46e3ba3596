use super::Metric;
use std::collections::BTreeMap;

/// The most frequent value in the input, `None` if the input is empty. Ties resolve to the smallest value.
#[derive(Debug, Clone, Default)]
pub struct Mode;

impl<'a> Metric<'a> for Mode {
	type Input = &'a [usize];
	type Output = Option<usize>;
	fn compute(input: Self::Input) -> Self::Output {
		let mut histogram = BTreeMap::new();
		for value in input.iter() {
			*histogram.entry(*value).or_insert(0usize) += 1;
		}
		histogram
			.into_iter()
			.max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
			.map(|(value, _)| value)
	}
}

#[test]
fn test_mode() {
	assert_eq!(Mode::compute(&[0, 1, 1, 2]), Some(1));
	assert_eq!(Mode::compute(&[]), None);
}

#[test]
fn test_mode_ties_resolve_to_the_smallest_value() {
	assert_eq!(Mode::compute(&[5, 2, 5, 2]), Some(2));
}
