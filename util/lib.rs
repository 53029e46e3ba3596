pub mod progress_counter;
pub mod serve;

pub use self::serve::serve;
