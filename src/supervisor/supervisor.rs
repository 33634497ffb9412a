use super::*;
use crate::Error;
use crate::Result;
use crate::SHUTDOWN_GRACE;
use std::future::Future;
use std::process::ExitStatus;
use std::time::Duration;

/// Why [`Supervisor::watch`] returned.
#[derive(Debug)]
pub enum Watch {
    /// A child exited on its own.
    Exited {
        name: String,
        status: std::io::Result<ExitStatus>,
    },
    /// The shutdown future resolved.
    Shutdown,
}

/// Owns every launched child, in launch order, until it is reaped.
///
/// Termination asks politely first (SIGTERM), waits up to the grace period,
/// then kills. Every child is visited even when an earlier one fails to
/// stop; those failures are logged and returned together.
#[derive(Debug)]
pub struct Supervisor {
    children: Vec<Supervised>,
    grace: Duration,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(SHUTDOWN_GRACE)
    }
}

impl Supervisor {
    pub fn new(grace: Duration) -> Self {
        Self {
            children: Vec::new(),
            grace,
        }
    }
    pub fn children(&self) -> &[Supervised] {
        &self.children
    }

    pub fn launch(&mut self, program: Program) -> Result<Option<u32>> {
        let child = Supervised::spawn(program)?;
        let pid = child.pid();
        self.children.push(child);
        Ok(pid)
    }

    /// Blocks until any child exits or `shutdown` resolves.
    pub async fn watch(&mut self, shutdown: impl Future<Output = ()>) -> Watch {
        if self.children.is_empty() {
            shutdown.await;
            return Watch::Shutdown;
        }
        let exited = {
            let waits = futures::future::select_all(
                self.children
                    .iter_mut()
                    .map(|c| Box::pin(c.child().wait())),
            );
            tokio::select! {
                (status, i, _) = waits => Some((i, status)),
                _ = shutdown => None,
            }
        };
        match exited {
            Some((i, status)) => {
                let name = self.children[i].name().to_string();
                match status.as_ref() {
                    Ok(s) => log::warn!("{} exited unexpectedly ({})", name, s),
                    Err(e) => log::error!("lost track of {}: {}", name, e),
                }
                Watch::Exited { name, status }
            }
            None => {
                log::info!("shutdown requested, stopping {} children", self.children.len());
                Watch::Shutdown
            }
        }
    }

    /// Stops and reaps every child in launch order.
    pub async fn terminate(&mut self) -> Vec<Error> {
        let mut errors = Vec::new();
        for child in std::mem::take(&mut self.children) {
            if let Err(e) = self.stop(child).await {
                log::error!("{}", e);
                errors.push(e);
            }
        }
        errors
    }

    /// Launches `programs` in order, watches them, then terminates them all.
    /// If one fails to launch, the ones already running are terminated
    /// before the launch error is returned.
    pub async fn run(
        &mut self,
        programs: Vec<Program>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<Watch> {
        for program in programs {
            if let Err(e) = self.launch(program) {
                log::error!("{}", e);
                self.terminate().await;
                return Err(e);
            }
        }
        let watch = self.watch(shutdown).await;
        let errors = self.terminate().await;
        if errors.is_empty() {
            log::info!("all children stopped");
        } else {
            log::warn!("{} children did not stop cleanly", errors.len());
        }
        Ok(watch)
    }

    async fn stop(&self, mut child: Supervised) -> Result<()> {
        use tokio::time::timeout;
        let name = child.name().to_string();
        let fail = |source: std::io::Error| Error::Terminate {
            name: name.clone(),
            source,
        };
        match child.child().try_wait() {
            Ok(Some(status)) => {
                log::info!("{:<32}{:<32}", format!("reaped {}", name), status);
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => log::warn!("cannot poll {}: {}", name, e),
        }
        match polite(child.pid()).await {
            Ok(()) => match timeout(self.grace, child.child().wait()).await {
                Ok(status) => {
                    let status = status.map_err(fail)?;
                    let uptime = chrono::Utc::now() - child.started();
                    log::info!(
                        "{:<32}{:<32}",
                        format!("stopped {}", name),
                        format!("{} after {}s", status, uptime.num_seconds())
                    );
                    return Ok(());
                }
                Err(_) => log::warn!("{} still running after {:?}, killing", name, self.grace),
            },
            Err(e) => log::warn!("cannot signal {}: {}, killing", name, e),
        }
        child.child().start_kill().map_err(fail)?;
        let status = timeout(self.grace, child.child().wait())
            .await
            .map_err(|_| {
                fail(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "still running after kill",
                ))
            })?
            .map_err(fail)?;
        log::info!("{:<32}{:<32}", format!("killed {}", name), status);
        Ok(())
    }
}

/// Sends SIGTERM so the child can shut down on its own terms. Without a
/// positive pid there is nobody to signal: `kill 0` would hit our own group.
async fn polite(pid: Option<u32>) -> std::io::Result<()> {
    let pid = pid.filter(|pid| *pid != 0).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "no process id recorded")
    })?;
    #[cfg(unix)]
    {
        let status = tokio::process::Command::new("kill")
            .arg("-TERM")
            .arg(pid.to_string())
            .status()
            .await?;
        match status.success() {
            true => Ok(()),
            false => Err(std::io::Error::other(format!("kill exited with {}", status))),
        }
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "no termination signal on this platform",
        ))
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    fn alive(pid: Option<u32>) -> bool {
        pid.is_some_and(|pid| std::path::Path::new(&format!("/proc/{}", pid)).exists())
    }

    fn sleeper(name: &str) -> Program {
        Program::new(name, "sleep").arg("30")
    }

    #[tokio::test]
    async fn shutdown_stops_every_child() {
        let mut supervisor = Supervisor::new(Duration::from_secs(2));
        let a = supervisor.launch(sleeper("inference")).unwrap();
        let b = supervisor.launch(sleeper("dashboard")).unwrap();
        assert_eq!(supervisor.children().len(), 2);
        assert!(alive(a) && alive(b));
        let watch = supervisor
            .watch(tokio::time::sleep(Duration::from_millis(50)))
            .await;
        assert!(matches!(watch, Watch::Shutdown));
        let start = std::time::Instant::now();
        assert!(supervisor.terminate().await.is_empty());
        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(!alive(a) && !alive(b));
        assert!(supervisor.children().is_empty());
    }

    #[tokio::test]
    async fn dead_child_does_not_block_the_rest() {
        let mut supervisor = Supervisor::new(Duration::from_secs(2));
        let quick = supervisor.launch(Program::new("quick", "true")).unwrap();
        let slow = supervisor.launch(sleeper("slow")).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(supervisor.terminate().await.is_empty());
        assert!(!alive(quick) && !alive(slow));
    }

    #[tokio::test]
    async fn child_exit_ends_the_watch() {
        let mut supervisor = Supervisor::new(Duration::from_secs(2));
        let slow = supervisor.launch(sleeper("slow")).unwrap();
        supervisor.launch(Program::new("quick", "true")).unwrap();
        match supervisor.watch(std::future::pending()).await {
            Watch::Exited { name, status } => {
                assert_eq!(name, "quick");
                assert!(status.unwrap().success());
            }
            Watch::Shutdown => panic!("nothing requested shutdown"),
        }
        assert!(supervisor.terminate().await.is_empty());
        assert!(!alive(slow));
    }

    #[tokio::test]
    async fn missing_pid_is_never_signalled() {
        let none = polite(None).await.unwrap_err();
        let zero = polite(Some(0)).await.unwrap_err();
        assert_eq!(none.kind(), std::io::ErrorKind::NotFound);
        assert_eq!(zero.kind(), std::io::ErrorKind::NotFound);
        assert!(alive(Some(std::process::id())));
    }

    #[tokio::test]
    async fn failed_launch_stops_earlier_children() {
        let mut supervisor = Supervisor::new(Duration::from_secs(2));
        let first = supervisor.launch(sleeper("inference")).unwrap();
        let result = supervisor
            .run(
                vec![Program::new("dashboard", "/nonexistent/segments-dashboard")],
                std::future::pending(),
            )
            .await;
        assert!(matches!(result, Err(Error::Launch { .. })));
        assert!(!alive(first));
        assert!(supervisor.children().is_empty());
    }
}
