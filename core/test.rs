use agron_dataframe::EnumColumnView;
use agron_forest::MulticlassClassifier;
use agron_metrics::{
	ClassificationMetrics, ClassificationMetricsInput, ClassificationMetricsOutput, StreamingMetric,
};
use agron_util::progress_counter::ProgressCounter;
use itertools::izip;
use ndarray::prelude::*;
use num_traits::ToPrimitive;

/// Run a trained model over the held out test data in batches and compute classification metrics.
pub fn test_multiclass_classifier(
	features: ArrayView2<f32>,
	labels: EnumColumnView,
	model: &MulticlassClassifier,
	progress: &ProgressCounter,
) -> ClassificationMetricsOutput {
	let n_examples_per_batch = 256;
	// labels are 1-indexed
	let labels: Vec<usize> = labels
		.data
		.iter()
		.map(|label| label.unwrap().get())
		.collect();
	let mut test_metrics = ClassificationMetrics::new(model.n_classes);
	let mut predictions = Array::zeros(n_examples_per_batch);
	for (features, labels) in izip!(
		features.axis_chunks_iter(Axis(0), n_examples_per_batch),
		labels.chunks(n_examples_per_batch),
	) {
		let slice = s![0..features.nrows()];
		model.predict(features, predictions.slice_mut(slice));
		test_metrics.update(ClassificationMetricsInput {
			predictions: predictions.slice(slice),
			labels: ArrayView1::from(labels),
		});
		progress.inc(features.nrows().to_u64().unwrap());
	}
	test_metrics.finalize()
}
