pub mod glob;
pub mod scanner;
pub mod watcher;

pub use scanner::Scanner;
