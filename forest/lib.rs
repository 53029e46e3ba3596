/*!
This crate implements random forest models for multiclass classification. A forest is an ensemble of decision trees, each trained on a bootstrap sample of the training data, that classifies an example by majority vote over the trees.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod multiclass_classifier;
mod train;

pub use multiclass_classifier::MulticlassClassifier;

use agron_util::progress_counter::ProgressCounter;
use ndarray::prelude::*;

/// These are the options passed to `MulticlassClassifier::train`.
#[derive(Clone, Debug)]
pub struct TrainOptions {
	/// The depth of a single tree will never exceed this value if it is `Some`. If it is `None`, trees are grown until the other stopping criteria are met.
	pub max_depth: Option<usize>,
	/// This is the number of features considered as candidates for each split.
	pub max_features: MaxFeatures,
	/// A split will only be considered valid if the number of training examples sent to each of the resulting children is at least this value.
	pub min_examples_per_leaf: usize,
	/// A node will only be split if the number of training examples it received is at least this value.
	pub min_examples_per_split: usize,
	/// This is the number of trees to train.
	pub n_trees: usize,
	/// This is the seed used to draw the bootstrap samples and the candidate features for each split.
	pub seed: u64,
}

impl Default for TrainOptions {
	fn default() -> Self {
		Self {
			max_depth: None,
			max_features: MaxFeatures::Sqrt,
			min_examples_per_leaf: 1,
			min_examples_per_split: 2,
			n_trees: 100,
			seed: 42,
		}
	}
}

/// This enum controls the number of features considered as candidates for each split.
#[derive(Clone, Copy, Debug)]
pub enum MaxFeatures {
	/// Consider every feature.
	All,
	/// Consider this many features, or every feature if there are fewer.
	Count(usize),
	/// Consider the square root of the number of features, rounded down.
	Sqrt,
}

/// This struct reports the training progress. `tree` counts the trees that have finished training.
#[derive(Clone, Debug)]
pub struct TrainProgress {
	pub tree: ProgressCounter,
}

/// Trees are stored as a `Vec` of `Node`s. Each branch in the tree has two indexes into the `Vec`, one for each of its children.
#[derive(Debug)]
pub struct Tree {
	pub nodes: Vec<Node>,
}

impl Tree {
	/// Make a prediction for a given example.
	pub fn predict(&self, example: ArrayView1<f32>) -> usize {
		// Start at the root node.
		let mut node_index = 0;
		// Traverse the tree until we get to a leaf.
		loop {
			match &self.nodes[node_index] {
				Node::Branch(BranchNode {
					feature_index,
					split_value,
					left_child_index,
					right_child_index,
				}) => {
					node_index = if example[*feature_index] <= *split_value {
						*left_child_index
					} else {
						*right_child_index
					};
				}
				// We made it to a leaf! The prediction is the leaf's class.
				Node::Leaf(LeafNode { class_index }) => return *class_index,
			}
		}
	}
}

/// A node is either a branch or a leaf.
#[derive(Debug)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

/// A `BranchNode` is a branch in a tree. It takes the value of a single feature, compares it with a `split_value`, and if the value is <= `split_value`, the example is sent left, and if it is > `split_value`, it is sent right.
#[derive(Debug)]
pub struct BranchNode {
	/// This is the index of the feature to get the value for.
	pub feature_index: usize,
	/// This is the threshold value of the split.
	pub split_value: f32,
	/// This is the index in the tree's node vector for this node's left child.
	pub left_child_index: usize,
	/// This is the index in the tree's node vector for this node's right child.
	pub right_child_index: usize,
}

/// The leaves in a tree hold the class to output for examples that get sent to them.
#[derive(Debug)]
pub struct LeafNode {
	/// This is the index of the class to output, which is the majority class of the training examples that were sent to this leaf.
	pub class_index: usize,
}

#[test]
fn test_predict_with_a_hand_built_tree() {
	let tree = Tree {
		nodes: vec![
			Node::Branch(BranchNode {
				feature_index: 1,
				split_value: 2.0,
				left_child_index: 1,
				right_child_index: 2,
			}),
			Node::Leaf(LeafNode { class_index: 0 }),
			Node::Branch(BranchNode {
				feature_index: 0,
				split_value: 0.5,
				left_child_index: 3,
				right_child_index: 4,
			}),
			Node::Leaf(LeafNode { class_index: 1 }),
			Node::Leaf(LeafNode { class_index: 2 }),
		],
	};
	let examples = arr2(&[[0.0, 1.0], [0.0, 3.0], [1.0, 3.0], [0.0, 2.0]]);
	let predictions: Vec<usize> = examples
		.axis_iter(Axis(0))
		.map(|example| tree.predict(example))
		.collect();
	assert_eq!(predictions, vec![0, 1, 2, 0]);
}
