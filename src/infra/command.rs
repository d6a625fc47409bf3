//! # Process Execution Module / 进程执行模块
//!
//! This module owns the lifecycle of one child process: spawning it,
//! draining stdout and stderr concurrently, answering liveness queries,
//! forcing termination and handing out the final result.
//!
//! 此模块负责单个子进程的生命周期：派生进程、并发读取 stdout 和 stderr、
//! 响应存活查询、强制终止以及交付最终结果。
//!
//! A supervising tokio task owns the `Child`. It reports exactly once through
//! a one-shot channel, either with the natural exit or with an acknowledgement
//! of a forced stop.
//!
//! 一个监管 tokio 任务拥有 `Child`。它通过 one-shot 通道恰好报告一次：
//! 要么是自然退出，要么是对强制停止的确认。

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::core::models::{CapturedOutput, ExecutionResult};

/// How long a child gets to exit after the polite termination signal before
/// it is killed outright.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Upper bound for `ProcessExecutor::stop`. After this the supervising task
/// is aborted, which drops and kills the child.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 8 * 1024;

/// Bytes read so far from one stream. Shared between the reader task and
/// the supervisor so a forced stop can keep whatever was buffered.
type StreamBuffer = Arc<Mutex<Vec<u8>>>;

#[derive(Clone, Default)]
struct CaptureBuffers {
    stdout: StreamBuffer,
    stderr: StreamBuffer,
}

impl CaptureBuffers {
    async fn snapshot(&self) -> CapturedOutput {
        let stdout = self.stdout.lock().await;
        let stderr = self.stderr.lock().await;
        CapturedOutput::from_bytes(&stdout, &stderr)
    }
}

/// What the supervising task reports back.
enum Completion {
    Exited(ExecutionResult),
    Stopped(CapturedOutput),
}

struct RunningProcess {
    cancel: CancellationToken,
    completion: oneshot::Receiver<Completion>,
    supervisor: JoinHandle<()>,
    buffers: CaptureBuffers,
    pid: Option<u32>,
}

enum ExecutorState {
    Idle,
    Running(RunningProcess),
    Exited(ExecutionResult),
    Stopped(CapturedOutput),
}

/// Runs one command line as a child process.
/// Single-owner and single-use: start it once, then wait for it or stop it.
///
/// 以子进程方式运行一条命令行。单一所有者、单次使用：启动一次，然后等待或停止它。
pub struct ProcessExecutor {
    command_line: String,
    state: ExecutorState,
}

impl ProcessExecutor {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            state: ExecutorState::Idle,
        }
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Starts the process without blocking the caller.
    /// Launch problems never surface here; they become an
    /// `ExecutionResult::LaunchFailure` available through [`Self::result`].
    /// Calling `start` more than once has no effect.
    ///
    /// 启动进程而不阻塞调用者。启动问题不会在此处抛出，而是成为
    /// 可通过 [`Self::result`] 获取的 `ExecutionResult::LaunchFailure`。
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if !matches!(self.state, ExecutorState::Idle) {
            warn!(command = %self.command_line, "executor already started");
            return;
        }

        let mut cmd = match build_command(&self.command_line) {
            Ok(cmd) => cmd,
            Err(e) => {
                debug!(command = %self.command_line, error = %e, "launch failed");
                self.state = ExecutorState::Exited(ExecutionResult::LaunchFailure {
                    cause: format!("{e:#}"),
                });
                return;
            }
        };

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(command = %self.command_line, error = %e, "spawn failed");
                self.state = ExecutorState::Exited(ExecutionResult::LaunchFailure {
                    cause: format!("failed to start '{}': {e}", self.command_line),
                });
                return;
            }
        };
        let pid = child.id();
        trace!(command = %self.command_line, ?pid, "process started");

        let buffers = CaptureBuffers::default();
        let readers = (
            spawn_reader(child.stdout.take(), Arc::clone(&buffers.stdout)),
            spawn_reader(child.stderr.take(), Arc::clone(&buffers.stderr)),
        );

        let cancel = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();
        let supervisor = tokio::spawn(supervise(
            child,
            pid,
            readers,
            buffers.clone(),
            cancel.clone(),
            done_tx,
        ));

        self.state = ExecutorState::Running(RunningProcess {
            cancel,
            completion: done_rx,
            supervisor,
            buffers,
            pid,
        });
    }

    /// Non-blocking liveness probe.
    /// 非阻塞的存活探测。
    pub fn is_running(&mut self) -> bool {
        let ExecutorState::Running(running) = &mut self.state else {
            return false;
        };
        match running.completion.try_recv() {
            Ok(completion) => {
                self.finish(completion);
                false
            }
            Err(oneshot::error::TryRecvError::Empty) => true,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.finish(lost_supervisor());
                false
            }
        }
    }

    /// Waits until the supervising task reports completion.
    /// Cancel-safe: dropping the future leaves the executor running, so it can
    /// be raced against a deadline and followed by [`Self::stop`].
    ///
    /// 等待监管任务报告完成。该方法是取消安全的。
    pub async fn wait(&mut self) {
        let ExecutorState::Running(running) = &mut self.state else {
            return;
        };
        let completion = (&mut running.completion)
            .await
            .unwrap_or_else(|_| lost_supervisor());
        self.finish(completion);
    }

    /// Forces the process to terminate. Idempotent.
    /// Returns once the supervising task acknowledged the shutdown, or after
    /// [`STOP_TIMEOUT`] at the latest.
    ///
    /// 强制终止进程。幂等。
    /// 在监管任务确认关闭后返回，最迟在 [`STOP_TIMEOUT`] 之后返回。
    pub async fn stop(&mut self) {
        let ExecutorState::Running(running) = &mut self.state else {
            return;
        };
        debug!(command = %self.command_line, "stopping process");
        running.cancel.cancel();

        let completion =
            match tokio::time::timeout(STOP_TIMEOUT, &mut running.completion).await {
                Ok(Ok(completion)) => completion,
                Ok(Err(_)) | Err(_) => {
                    warn!(
                        command = %self.command_line,
                        "supervisor did not acknowledge stop, aborting it"
                    );
                    running.supervisor.abort();
                    kill_group(running.pid);
                    Completion::Stopped(running.buffers.snapshot().await)
                }
            };
        self.finish(completion);
    }

    /// The result of a process that terminated on its own or failed to launch.
    /// `None` while running, before `start` and after a forced stop.
    pub fn result(&self) -> Option<&ExecutionResult> {
        match &self.state {
            ExecutorState::Exited(result) => Some(result),
            _ => None,
        }
    }

    /// Output captured from a terminated process. After a forced stop this is
    /// whatever had been buffered when the process was killed.
    pub fn captured_output(&self) -> Option<&CapturedOutput> {
        match &self.state {
            ExecutorState::Exited(result) => result.output(),
            ExecutorState::Stopped(output) => Some(output),
            _ => None,
        }
    }

    fn finish(&mut self, completion: Completion) {
        self.state = match completion {
            Completion::Exited(result) => ExecutorState::Exited(result),
            Completion::Stopped(output) => ExecutorState::Stopped(output),
        };
    }
}

impl Drop for ProcessExecutor {
    fn drop(&mut self) {
        if let ExecutorState::Running(running) = &self.state {
            running.cancel.cancel();
            running.supervisor.abort();
            kill_group(running.pid);
        }
    }
}

fn lost_supervisor() -> Completion {
    Completion::Exited(ExecutionResult::LaunchFailure {
        cause: "process supervisor exited without reporting a result".to_string(),
    })
}

/// Expands and tokenizes a command line into a ready-to-spawn command.
fn build_command(command_line: &str) -> Result<Command> {
    let expanded = shellexpand::full(command_line)
        .with_context(|| format!("failed to expand command line '{command_line}'"))?;

    let parts = shlex::split(&expanded)
        .with_context(|| format!("failed to parse command line '{expanded}'"))?;

    let (program, args) = parts
        .split_first()
        .with_context(|| format!("empty command line '{command_line}'"))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own process group, so a forced stop reaches every descendant.
    #[cfg(unix)]
    cmd.process_group(0);
    Ok(cmd)
}

/// Spawns a task that copies a stream into `buffer` until EOF.
/// Raw bytes are kept so `\r\n` survives for the assertion parser.
fn spawn_reader<R>(stream: Option<R>, buffer: StreamBuffer) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut stream) = stream else {
            return;
        };
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => buffer.lock().await.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    debug!(error = %e, "stream read failed");
                    break;
                }
            }
        }
    })
}

/// The supervising task. Waits for the child or for a stop request,
/// whichever comes first, and reports exactly once.
async fn supervise(
    mut child: Child,
    pid: Option<u32>,
    readers: (JoinHandle<()>, JoinHandle<()>),
    buffers: CaptureBuffers,
    cancel: CancellationToken,
    done: oneshot::Sender<Completion>,
) {
    let (mut stdout_task, mut stderr_task) = readers;

    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        status = child.wait() => Some(status),
    };

    let completion = match status {
        None => {
            terminate(&mut child, pid).await;
            stdout_task.abort();
            stderr_task.abort();
            Completion::Stopped(buffers.snapshot().await)
        }
        Some(Err(e)) => {
            stdout_task.abort();
            stderr_task.abort();
            Completion::Exited(ExecutionResult::LaunchFailure {
                cause: format!("failed to wait for process: {e}"),
            })
        }
        Some(Ok(status)) => {
            trace!(?status, "process exited, draining output");
            // Pipes can stay open after exit if the child left descendants
            // holding them; a stop request still wins in that case.
            let drained = tokio::select! {
                biased;
                _ = cancel.cancelled() => false,
                _ = async {
                    let _ = (&mut stdout_task).await;
                    let _ = (&mut stderr_task).await;
                } => true,
            };
            if drained {
                Completion::Exited(ExecutionResult::NormalExit {
                    exit_code: exit_code(status),
                    output: buffers.snapshot().await,
                })
            } else {
                // The child is gone; its descendants still hold the pipes.
                kill_group(pid);
                stdout_task.abort();
                stderr_task.abort();
                Completion::Stopped(buffers.snapshot().await)
            }
        }
    };

    if done.send(completion).is_err() {
        trace!("executor dropped before completion was delivered");
    }
}

/// Terminates and reaps the child: SIGTERM to its process group first on
/// Unix, SIGKILL to the group after [`TERMINATE_GRACE`]. Elsewhere the child
/// is killed directly.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    {
        use nix::sys::signal::Signal;

        signal_group(pid, Signal::SIGTERM);
        let exited = match tokio::time::timeout(TERMINATE_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                trace!(?status, "process exited after SIGTERM");
                true
            }
            _ => {
                debug!("process ignored SIGTERM, killing its group");
                false
            }
        };
        // Descendants that ignored SIGTERM or were still exiting.
        signal_group(pid, Signal::SIGKILL);
        if exited {
            return;
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill process");
    }
}

/// Sends `signal` to the process group led by `pid`. Children are spawned as
/// group leaders, so this also reaches everything they forked.
#[cfg(unix)]
fn signal_group(pid: Option<u32>, signal: nix::sys::signal::Signal) {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let Some(pid) = pid else {
        return;
    };
    // ESRCH just means the whole group is already gone.
    if let Err(e) = killpg(Pid::from_raw(pid as i32), signal) {
        trace!(error = %e, ?signal, "signalling process group failed");
    }
}

/// Kills whatever is left of the child's process group without waiting.
fn kill_group(pid: Option<u32>) {
    #[cfg(unix)]
    signal_group(pid, nix::sys::signal::Signal::SIGKILL);
    #[cfg(not(unix))]
    let _ = pid;
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
