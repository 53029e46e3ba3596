/*!
This crate trains a fertilizer recommender from a csv of soil, crop, and weather readings, then answers "which fertilizer should I apply?" for one reading at a time.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod config;
mod info;
mod test;

pub mod progress;
pub mod recommend;
pub mod train;

pub use self::{
	config::ColumnNames,
	recommend::{RecommendError, RecommendInput, Recommendation, Recommender},
	train::{train, TrainOutput},
};
