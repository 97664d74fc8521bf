use luash::flags::{Flags, Startup};
use luash::highlight::Palette;
use luash::shell::{Settings, Shell};
use std::env;
use std::process;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("LUASH_LOG", default_level))
        .format_timestamp(None)
        .init();
}

fn run(args: &[String]) -> i32 {
    let startup = Flags::new().parse(args);
    init_logging(startup.contains(&Startup::Debug));

    let mut shell = match Shell::new(Settings::for_arguments(args)) {
        Ok(shell) => shell,
        Err(e) => {
            eprintln!("{} Failed to start the shell: {}", Palette::new().error_tag(), e);
            return 1;
        }
    };

    match shell.run(&startup) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", Palette::new().error_tag(), e);
            1
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let code = run(&args);
    process::exit(code);
}
