/// One command-line action, in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Startup {
    /// Enter the interactive loop after the batch units.
    Shell,
    NoShell,
    /// `-e <source>`; also disables the interactive loop.
    Inline(String),
    /// `-f`, accepted for compatibility and otherwise ignored.
    Ignored(String),
    Help,
    Version,
    /// Turns on debug logging.
    Debug,
    Unknown(String),
    File(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagKind {
    Shell,
    NoShell,
    Inline,
    Ignored,
    Help,
    Version,
    Debug,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: Option<&'static str>,
    pub long: &'static str,
    pub description: &'static str,
    kind: FlagKind,
}

#[derive(Debug, Clone)]
pub struct Flags {
    flags: Vec<Flag>,
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let flags = vec![
            Flag {
                short: Some("-h"),
                long: "--help",
                description: "Print this help message",
                kind: FlagKind::Help,
            },
            Flag {
                short: Some("-v"),
                long: "--version",
                description: "Show version information",
                kind: FlagKind::Version,
            },
            Flag {
                short: None,
                long: "--shell",
                description: "Start the interactive shell after running scripts",
                kind: FlagKind::Shell,
            },
            Flag {
                short: None,
                long: "--no-shell",
                description: "Do not start the interactive shell",
                kind: FlagKind::NoShell,
            },
            Flag {
                short: Some("-e"),
                long: "--execute",
                description: "Run the given Lua source",
                kind: FlagKind::Inline,
            },
            Flag {
                short: Some("-f"),
                long: "--file",
                description: "Ignored; plain arguments are run as script files",
                kind: FlagKind::Ignored,
            },
            Flag {
                short: Some("-d"),
                long: "--debug",
                description: "Enable debug output",
                kind: FlagKind::Debug,
            },
        ];

        Flags { flags }
    }

    fn find(&self, arg: &str) -> Option<&Flag> {
        self.flags
            .iter()
            .find(|flag| flag.short == Some(arg) || flag.long == arg)
    }

    pub fn parse(&self, args: &[String]) -> Vec<Startup> {
        let mut startup = Vec::with_capacity(args.len());
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            let action = match self.find(arg).map(|flag| flag.kind) {
                Some(FlagKind::Shell) => Startup::Shell,
                Some(FlagKind::NoShell) => Startup::NoShell,
                Some(FlagKind::Inline) if i + 1 < args.len() => {
                    i += 1;
                    Startup::Inline(args[i].clone())
                }
                Some(FlagKind::Inline) => Startup::Unknown(arg.clone()),
                Some(FlagKind::Ignored) => Startup::Ignored(arg.clone()),
                Some(FlagKind::Help) => Startup::Help,
                Some(FlagKind::Version) => Startup::Version,
                Some(FlagKind::Debug) => Startup::Debug,
                None if arg.starts_with('-') => Startup::Unknown(arg.clone()),
                None => Startup::File(arg.clone()),
            };
            startup.push(action);
            i += 1;
        }
        startup
    }

    pub fn print_help(&self) {
        println!("Usage: luash [OPTIONS] [SCRIPT...]");
        println!("\nOptions:");
        for flag in &self.flags {
            let short = flag.short.map(|s| format!("{},", s)).unwrap_or_default();
            println!("  {:<4} {:<15} {}", short, flag.long, flag.description);
        }
    }
}
