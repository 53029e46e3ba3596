use num_traits::ToPrimitive;
use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};

/// A counter that can be incremented from multiple threads and polled from another, used to report the progress of long running operations such as loading and training.
#[derive(Clone, Debug)]
pub struct ProgressCounter {
	current: Arc<AtomicU64>,
	total: u64,
}

impl ProgressCounter {
	pub fn new(total: u64) -> Self {
		Self {
			current: Arc::new(AtomicU64::new(0)),
			total,
		}
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn get(&self) -> u64 {
		self.current.load(Ordering::Relaxed)
	}

	pub fn set(&self, value: u64) {
		self.current.store(value, Ordering::Relaxed);
	}

	pub fn inc(&self, amount: u64) {
		self.current.fetch_add(amount, Ordering::Relaxed);
	}

	/// The fraction of the work completed so far, between 0 and 1.
	pub fn fraction(&self) -> f32 {
		if self.total == 0 {
			return 1.0;
		}
		self.get().to_f32().unwrap() / self.total.to_f32().unwrap()
	}
}

#[test]
fn test_progress_counter() {
	let counter = ProgressCounter::new(4);
	assert_eq!(counter.get(), 0);
	counter.inc(1);
	let clone = counter.clone();
	clone.inc(1);
	assert_eq!(counter.get(), 2);
	assert!((counter.fraction() - 0.5).abs() < std::f32::EPSILON);
	counter.set(4);
	assert_eq!(counter.get(), 4);
}
