use super::{train, TrainOptions, TrainProgress, Tree};
use agron_dataframe::EnumColumnView;
use agron_metrics::{Metric, Mode};
use itertools::izip;
use ndarray::prelude::*;

/// This struct represents a random forest multiclass classifier model. Multiclass classifier models are used to predict multiclass target values, for example which of several fertilizers to apply to a field.
#[derive(Debug)]
pub struct MulticlassClassifier {
	/// The trees for this model. Each tree is trained on its own bootstrap sample of the training data.
	pub trees: Vec<Tree>,
	/// The number of classes.
	pub n_classes: usize,
	/// The names of the unique values in the target column.
	pub classes: Vec<String>,
}

impl MulticlassClassifier {
	/// Train a multiclass classifier.
	pub fn train(
		features: ArrayView2<f32>,
		labels: EnumColumnView,
		options: TrainOptions,
		update_progress: &mut dyn FnMut(TrainProgress),
	) -> Self {
		let n_classes = labels.options.len();
		let classes = labels.options.to_owned();
		// labels are 1-indexed, convert to 0-indexed
		let labels: Vec<usize> = labels
			.data
			.iter()
			.map(|label| label.unwrap().get() - 1)
			.collect();
		let trees = train::train(features, &labels, n_classes, &options, update_progress);
		Self {
			trees,
			n_classes,
			classes,
		}
	}

	/// Make predictions. Each example is sent through every tree and the class with the most votes wins. Ties resolve to the class with the lowest index.
	pub fn predict(&self, features: ArrayView2<f32>, mut predictions: ArrayViewMut1<usize>) {
		let mut votes = vec![0; self.trees.len()];
		for (example, prediction) in izip!(features.axis_iter(Axis(0)), predictions.iter_mut()) {
			for (vote, tree) in votes.iter_mut().zip(self.trees.iter()) {
				*vote = tree.predict(example);
			}
			*prediction = Mode::compute(votes.as_slice()).unwrap();
		}
	}
}

#[cfg(test)]
fn test_labels() -> agron_dataframe::EnumColumn {
	use std::num::NonZeroUsize;
	agron_dataframe::EnumColumn {
		name: "Fertilizer Name".to_owned(),
		options: vec!["DAP".to_owned(), "Urea".to_owned()],
		data: (0..8)
			.map(|_| NonZeroUsize::new(1))
			.chain((0..8).map(|_| NonZeroUsize::new(2)))
			.collect(),
	}
}

#[cfg(test)]
fn test_features() -> Array2<f32> {
	arr2(&[
		[1.0, 0.5],
		[1.5, 0.5],
		[2.0, 0.5],
		[2.5, 0.5],
		[3.0, 0.5],
		[3.5, 0.5],
		[4.0, 0.5],
		[2.0, 0.5],
		[10.0, 0.5],
		[10.5, 0.5],
		[11.0, 0.5],
		[11.5, 0.5],
		[12.0, 0.5],
		[12.5, 0.5],
		[13.0, 0.5],
		[11.0, 0.5],
	])
}

#[test]
fn test_train_separates_the_classes() {
	let features = test_features();
	let labels = test_labels();
	let options = TrainOptions {
		max_features: crate::MaxFeatures::All,
		..Default::default()
	};
	let model = MulticlassClassifier::train(features.view(), labels.view(), options, &mut |_| {});
	assert_eq!(model.n_classes, 2);
	assert_eq!(model.classes, vec!["DAP".to_owned(), "Urea".to_owned()]);
	let mut predictions = Array::zeros(features.nrows());
	model.predict(features.view(), predictions.view_mut());
	let expected = arr1(&[0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1]);
	assert_eq!(predictions, expected);
}

#[test]
fn test_train_is_deterministic() {
	let features = test_features();
	let labels = test_labels();
	let options = TrainOptions {
		n_trees: 8,
		..Default::default()
	};
	let model_a = MulticlassClassifier::train(
		features.view(),
		labels.view(),
		options.clone(),
		&mut |_| {},
	);
	let model_b =
		MulticlassClassifier::train(features.view(), labels.view(), options, &mut |_| {});
	assert_eq!(
		format!("{:?}", model_a.trees),
		format!("{:?}", model_b.trees)
	);
}

#[test]
fn test_train_respects_max_depth() {
	let features = test_features();
	let labels = test_labels();
	let options = TrainOptions {
		max_depth: Some(1),
		n_trees: 8,
		..Default::default()
	};
	let model = MulticlassClassifier::train(features.view(), labels.view(), options, &mut |_| {});
	// A tree of depth one is a single branch with two leaves, or a lone leaf.
	assert!(model.trees.iter().all(|tree| tree.nodes.len() <= 3));
}
