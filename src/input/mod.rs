mod completer;

pub use completer::ShellHelper;
