use std::fs;
use std::rc::Rc;

use mlua::{Lua, MultiValue};

mod repl;

use crate::{
    core::{HookFn, HookRegistry, Session},
    error::ShellError,
    flags::{Flags, Startup},
    highlight::Palette,
    path::ShellState,
    process::{default_spawner, ProcessSpawner},
    script::{self, ExecuteOptions, Execution, ScriptError, INLINE_ORIGIN},
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Startup-time switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub run_shell: bool,
}

impl Settings {
    /// The interactive loop runs by default only when no arguments were
    /// given.
    pub fn for_arguments(args: &[String]) -> Self {
        Self {
            run_shell: args.is_empty(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self { run_shell: true }
    }
}

/// What a batch unit asks the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Failed,
    Exit(i32),
}

/// An embedded Lua state plus the native commands bound into it.
pub struct Shell {
    lua: Lua,
    session: Rc<Session>,
    registry: HookRegistry,
    settings: Settings,
}

pub struct ShellBuilder {
    registry: HookRegistry,
    state: Option<ShellState>,
    spawner: Option<Box<dyn ProcessSpawner>>,
    palette: Option<Palette>,
    settings: Settings,
}

impl Default for ShellBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellBuilder {
    pub fn new() -> Self {
        Self {
            registry: HookRegistry::with_defaults(),
            state: None,
            spawner: None,
            palette: None,
            settings: Settings::default(),
        }
    }

    /// Replaces the default command set.
    pub fn registry(mut self, registry: HookRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn working_directory(mut self, state: ShellState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn spawner(mut self, spawner: Box<dyn ProcessSpawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<Shell, ShellError> {
        let state = match self.state {
            Some(state) => state,
            None => ShellState::new()?,
        };
        let session = Session::new(
            state,
            self.spawner.unwrap_or_else(default_spawner),
            self.palette.unwrap_or_default(),
        );

        let shell = Shell {
            lua: Lua::new(),
            session: Rc::new(session),
            registry: self.registry,
            settings: self.settings,
        };
        for hook in shell.registry.hooks() {
            shell.bind(hook.name(), hook.callback())?;
        }
        log::debug!("bound {} hooks", shell.registry.len());
        Ok(shell)
    }
}

impl Shell {
    pub fn new(settings: Settings) -> Result<Self, ShellError> {
        ShellBuilder::new().settings(settings).build()
    }

    pub fn builder() -> ShellBuilder {
        ShellBuilder::new()
    }

    /// Exposes `callback` to scripts as the global `name`.
    fn bind(&self, name: &str, callback: HookFn) -> Result<(), ShellError> {
        let session = Rc::clone(&self.session);
        let function = self
            .lua
            .create_function(move |lua, args: MultiValue| callback(lua, &session, args))?;
        self.lua.globals().set(name, function)?;
        Ok(())
    }

    fn unbind(&self, name: &str) -> Result<(), ShellError> {
        self.lua.globals().set(name, mlua::Value::Nil)?;
        Ok(())
    }

    /// False when `name` is already taken.
    pub fn add_hook(&mut self, name: &str, callback: HookFn) -> Result<bool, ShellError> {
        if !self.registry.register(name, callback) {
            return Ok(false);
        }
        self.bind(name, callback)?;
        Ok(true)
    }

    pub fn remove_hook(&mut self, name: &str) -> Result<bool, ShellError> {
        match self.registry.take(name) {
            Some(hook) => {
                self.unbind(hook.name())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_hook_callback(&mut self, callback: HookFn) -> Result<bool, ShellError> {
        match self.registry.take_callback(callback) {
            Some(hook) => {
                self.unbind(hook.name())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// `Lua 5.4` or whatever the embedded engine reports.
    pub fn engine_version(&self) -> String {
        self.lua
            .globals()
            .get::<String>("_VERSION")
            .unwrap_or_else(|_| "Lua".to_string())
    }

    pub fn banner(&self) -> String {
        format!("[luash {}] {}", VERSION, self.engine_version())
    }

    pub fn execute(
        &self,
        source: &str,
        origin: &str,
        options: ExecuteOptions,
    ) -> Result<Execution, ScriptError> {
        script::execute_source(&self.lua, source, origin, options, self.session.palette())
    }

    /// Reads and runs one script file, resolved against the shell directory.
    pub fn run_file(&self, path: &str) -> Result<Execution, ShellError> {
        let resolved = self.session.resolve(path);
        let source = fs::read_to_string(&resolved).map_err(|source| ShellError::Unreadable {
            path: path.to_string(),
            source,
        })?;
        Ok(self.execute(&source, path, ExecuteOptions::BATCH)?)
    }

    fn run_unit(&self, unit: Result<Execution, ShellError>) -> Flow {
        match unit {
            Ok(_) => Flow::Continue,
            Err(ShellError::Script(ScriptError::Exit(code))) => Flow::Exit(code),
            Err(ShellError::Script(ScriptError::Failed(_))) => Flow::Failed,
            Err(err) => {
                self.session.report_error(err);
                Flow::Failed
            }
        }
    }

    fn apply(&mut self, action: &Startup) -> Flow {
        match action {
            Startup::Shell => self.settings.run_shell = true,
            Startup::NoShell => self.settings.run_shell = false,
            Startup::Ignored(_) | Startup::Debug => {}
            Startup::Help => Flags::new().print_help(),
            Startup::Version => println!("{}", self.banner()),
            Startup::Unknown(flag) => self.session.report_warning(format!(
                "used unknown flag {}\nTry --help for options",
                flag
            )),
            Startup::Inline(source) => {
                self.settings.run_shell = false;
                let unit = self
                    .execute(source, INLINE_ORIGIN, ExecuteOptions::BATCH)
                    .map_err(ShellError::from);
                return self.run_unit(unit);
            }
            Startup::File(path) => {
                log::info!("running {}", path);
                return self.run_unit(self.run_file(path));
            }
        }
        Flow::Continue
    }

    /// Runs the startup actions in order, then the interactive loop if it
    /// is still enabled. Returns the process exit code.
    pub fn run(&mut self, startup: &[Startup]) -> Result<i32, ShellError> {
        for action in startup {
            let flow = self.apply(action);
            script::settle();

            match flow {
                Flow::Continue => {}
                Flow::Failed => return Ok(1),
                Flow::Exit(code) => return Ok(code),
            }
        }

        if self.settings.run_shell {
            if let Some(code) = repl::run(self)? {
                return Ok(code);
            }
        }
        Ok(0)
    }
}
