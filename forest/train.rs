use super::{BranchNode, LeafNode, MaxFeatures, Node, TrainOptions, TrainProgress, Tree};
use agron_metrics::{Metric, Mode};
use agron_util::progress_counter::ProgressCounter;
use itertools::Itertools;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;

/// Train a forest of `options.n_trees` trees. `labels` are 0-indexed class indexes.
pub fn train(
	features: ArrayView2<f32>,
	labels: &[usize],
	n_classes: usize,
	options: &TrainOptions,
	update_progress: &mut dyn FnMut(TrainProgress),
) -> Vec<Tree> {
	let n_features = features.ncols();
	let n_candidate_features = match options.max_features {
		MaxFeatures::All => n_features,
		MaxFeatures::Count(count) => count.min(n_features),
		MaxFeatures::Sqrt => n_features
			.to_f32()
			.unwrap()
			.sqrt()
			.floor()
			.to_usize()
			.unwrap()
			.max(1),
	};
	// Draw each tree's seed up front so the result does not depend on how rayon schedules the trees.
	let mut rng = Xoshiro256Plus::seed_from_u64(options.seed);
	let seeds: Vec<u64> = (0..options.n_trees).map(|_| rng.gen()).collect();
	let progress_counter = ProgressCounter::new(options.n_trees.to_u64().unwrap());
	update_progress(TrainProgress {
		tree: progress_counter.clone(),
	});
	seeds
		.par_iter()
		.map(|seed| {
			let mut rng = Xoshiro256Plus::seed_from_u64(*seed);
			let tree = train_tree(
				features,
				labels,
				n_classes,
				n_candidate_features,
				options,
				&mut rng,
			);
			progress_counter.inc(1);
			tree
		})
		.collect()
}

/// Train a single tree on a bootstrap sample, drawn from the training data with replacement.
fn train_tree(
	features: ArrayView2<f32>,
	labels: &[usize],
	n_classes: usize,
	n_candidate_features: usize,
	options: &TrainOptions,
	rng: &mut Xoshiro256Plus,
) -> Tree {
	let n_examples = features.nrows();
	let examples: Vec<usize> = (0..n_examples)
		.map(|_| rng.gen_range(0, n_examples))
		.collect();
	let mut nodes = Vec::new();
	grow(
		&mut nodes,
		features,
		labels,
		examples,
		n_classes,
		n_candidate_features,
		0,
		options,
		rng,
	);
	Tree { nodes }
}

/// Add a node classifying `examples` to the tree and return its index. The node is a branch whose children are grown recursively, or a leaf with the majority class if a stopping criterion is met or no valid split exists.
fn grow(
	nodes: &mut Vec<Node>,
	features: ArrayView2<f32>,
	labels: &[usize],
	examples: Vec<usize>,
	n_classes: usize,
	n_candidate_features: usize,
	depth: usize,
	options: &TrainOptions,
	rng: &mut Xoshiro256Plus,
) -> usize {
	let should_stop = examples.len() < options.min_examples_per_split
		|| options
			.max_depth
			.map_or(false, |max_depth| depth >= max_depth)
		|| examples.iter().map(|&example| labels[example]).all_equal();
	let split = if should_stop {
		None
	} else {
		let candidate_features =
			rand::seq::index::sample(rng, features.ncols(), n_candidate_features).into_vec();
		find_best_split(
			features,
			labels,
			&examples,
			&candidate_features,
			n_classes,
			options.min_examples_per_leaf,
		)
	};
	let (feature_index, split_value) = match split {
		Some(split) => split,
		None => {
			let node_labels: Vec<usize> =
				examples.iter().map(|&example| labels[example]).collect();
			let class_index = Mode::compute(node_labels.as_slice()).unwrap();
			nodes.push(Node::Leaf(LeafNode { class_index }));
			return nodes.len() - 1;
		}
	};
	let (left_examples, right_examples): (Vec<usize>, Vec<usize>) = examples
		.iter()
		.partition(|&&example| features[(example, feature_index)] <= split_value);
	// Push the branch now to claim its index, then patch in the child indexes after the children are grown.
	let node_index = nodes.len();
	nodes.push(Node::Branch(BranchNode {
		feature_index,
		split_value,
		left_child_index: 0,
		right_child_index: 0,
	}));
	let left_child_index = grow(
		nodes,
		features,
		labels,
		left_examples,
		n_classes,
		n_candidate_features,
		depth + 1,
		options,
		rng,
	);
	let right_child_index = grow(
		nodes,
		features,
		labels,
		right_examples,
		n_classes,
		n_candidate_features,
		depth + 1,
		options,
		rng,
	);
	match &mut nodes[node_index] {
		Node::Branch(branch) => {
			branch.left_child_index = left_child_index;
			branch.right_child_index = right_child_index;
		}
		Node::Leaf(_) => unreachable!(),
	}
	node_index
}

/// Find the split of `examples` with the lowest weighted gini impurity across the candidate features. The split value is halfway between two adjacent feature values. Returns `None` if no split sends at least `min_examples_per_leaf` examples to each child.
fn find_best_split(
	features: ArrayView2<f32>,
	labels: &[usize],
	examples: &[usize],
	candidate_features: &[usize],
	n_classes: usize,
	min_examples_per_leaf: usize,
) -> Option<(usize, f32)> {
	let n_examples = examples.len();
	let mut best: Option<(usize, f32, f32)> = None;
	for &feature_index in candidate_features {
		let mut pairs: Vec<(f32, usize)> = examples
			.iter()
			.map(|&example| (features[(example, feature_index)], labels[example]))
			.collect();
		pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
		let mut left_counts = vec![0u64; n_classes];
		let mut right_counts = vec![0u64; n_classes];
		for (_, label) in pairs.iter() {
			right_counts[*label] += 1;
		}
		for i in 1..n_examples {
			let (value, label) = pairs[i - 1];
			left_counts[label] += 1;
			right_counts[label] -= 1;
			let next_value = pairs[i].0;
			// Only split between distinct values.
			if next_value == value {
				continue;
			}
			let n_left = i;
			let n_right = n_examples - i;
			if n_left < min_examples_per_leaf || n_right < min_examples_per_leaf {
				continue;
			}
			let score = (n_left.to_f32().unwrap() * gini(&left_counts, n_left)
				+ n_right.to_f32().unwrap() * gini(&right_counts, n_right))
				/ n_examples.to_f32().unwrap();
			if best.map_or(true, |(_, _, best_score)| score < best_score) {
				best = Some((feature_index, (value + next_value) / 2.0, score));
			}
		}
	}
	best.map(|(feature_index, split_value, _)| (feature_index, split_value))
}

/// Compute the gini impurity of a node with the given class counts.
fn gini(counts: &[u64], n_examples: usize) -> f32 {
	let n_examples = n_examples.to_f32().unwrap();
	1.0 - counts
		.iter()
		.map(|count| {
			let p = count.to_f32().unwrap() / n_examples;
			p * p
		})
		.sum::<f32>()
}

#[test]
fn test_find_best_split_prefers_the_purest_split() {
	let features = arr2(&[
		[1.0, 5.0],
		[2.0, 6.0],
		[3.0, 5.0],
		[4.0, 6.0],
	]);
	let labels = vec![0, 0, 1, 1];
	let examples = vec![0, 1, 2, 3];
	// Feature 0 separates the classes perfectly, feature 1 does not.
	let (feature_index, split_value) =
		find_best_split(features.view(), &labels, &examples, &[0, 1], 2, 1).unwrap();
	assert_eq!(feature_index, 0);
	assert!((split_value - 2.5).abs() < std::f32::EPSILON);
}

#[test]
fn test_find_best_split_returns_none_for_constant_features() {
	let features = arr2(&[[1.0], [1.0], [1.0], [1.0]]);
	let labels = vec![0, 0, 1, 1];
	let examples = vec![0, 1, 2, 3];
	assert!(find_best_split(features.view(), &labels, &examples, &[0], 2, 1).is_none());
}

#[test]
fn test_find_best_split_respects_min_examples_per_leaf() {
	let features = arr2(&[[1.0], [2.0], [3.0], [4.0]]);
	let labels = vec![0, 1, 1, 1];
	let examples = vec![0, 1, 2, 3];
	// The only split isolating class 0 sends one example left.
	let (_, split_value) =
		find_best_split(features.view(), &labels, &examples, &[0], 2, 2).unwrap();
	assert!((split_value - 2.5).abs() < std::f32::EPSILON);
}
