use agron_util::progress_counter::ProgressCounter;

#[derive(Debug)]
pub enum Progress {
	Loading(ProgressCounter),
	Shuffling,
	Training(agron_forest::TrainProgress),
	Testing(ProgressCounter),
}
