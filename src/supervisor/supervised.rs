use crate::Error;
use crate::Result;
use chrono::DateTime;
use chrono::Utc;
use tokio::process::Child;
use tokio::process::Command;

/// A command to run under supervision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl Program {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        self.args.iter().try_for_each(|a| write!(f, " {}", a))
    }
}

/// A launched child. Dropping it kills the process.
#[derive(Debug)]
pub struct Supervised {
    program: Program,
    pid: Option<u32>,
    started: DateTime<Utc>,
    child: Child,
}

impl Supervised {
    pub fn spawn(program: Program) -> Result<Self> {
        let child = Command::new(&program.program)
            .args(&program.args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Launch {
                name: program.name.clone(),
                source,
            })?;
        let pid = child.id().filter(|pid| *pid != 0);
        log::info!("{:<32}{:<32}", format!("launched {}", program.name), format!("pid {:?}", pid));
        Ok(Self {
            program,
            pid,
            started: Utc::now(),
            child,
        })
    }
    pub fn name(&self) -> &str {
        &self.program.name
    }
    /// None when the OS reported no usable process id.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }
    pub(crate) fn child(&mut self) -> &mut Child {
        &mut self.child
    }
}
