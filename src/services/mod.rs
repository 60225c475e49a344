pub mod clock;
pub mod debounce;
pub mod features;
pub mod recommendations;
pub mod search;
pub mod threads;
pub mod trending;
