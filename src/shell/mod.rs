mod command;
mod render;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use command::{Command, USAGE};
use render::render;

use crate::controller::{ControllerError, TaskController};

const PROMPT: &[u8] = b"> ";
const LOADING: &str = "Loading...";

/// Interactive loop: read a command, run it, draw the screen again.
pub struct Shell<R, W> {
    controller: TaskController,
    input: R,
    output: W,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(controller: TaskController, input: R, output: W) -> Self {
        Self {
            controller,
            input,
            output,
        }
    }

    pub async fn run(&mut self) -> std::io::Result<()> {
        self.write_line(LOADING).await?;
        // a failed load is shown in the error banner
        let _ = self.controller.load().await;
        self.draw().await?;

        let mut line = String::new();
        loop {
            self.output.write_all(PROMPT).await?;
            self.output.flush().await?;

            line.clear();
            if self.input.read_line(&mut line).await? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => self.write_line(USAGE).await?,
                Ok(Command::DeleteList(id)) => {
                    if self.confirm_delete(&id).await? {
                        let _ = self.execute(Command::DeleteList(id)).await;
                    } else {
                        self.write_line("Nothing deleted.").await?;
                    }
                    self.draw().await?;
                }
                Ok(command) => {
                    if matches!(command, Command::Reload | Command::Mode(_)) {
                        self.write_line(LOADING).await?;
                    }
                    debug!(?command, "running command");
                    // failures are already recorded in the view
                    let _ = self.execute(command).await;
                    self.draw().await?;
                }
                Err(err) => self.write_line(&err.to_string()).await?,
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<(), ControllerError> {
        let ctl = &mut self.controller;
        match command {
            Command::Lists => {
                ctl.back();
                Ok(())
            }
            Command::Open(id) => ctl.open(&id),
            Command::Back => {
                ctl.back();
                Ok(())
            }
            Command::NewList { title, description } => ctl.create_list(title, description).await,
            Command::EditList {
                id,
                title,
                description,
            } => ctl.update_list(id, title, description).await,
            Command::DeleteList(id) => ctl.delete_list(&id).await,
            Command::Add(description) => ctl.add_task(description).await,
            Command::Edit {
                task_id,
                description,
            } => ctl.update_task(task_id, description).await,
            Command::Toggle(task_id) => ctl.toggle_task(&task_id).await,
            Command::Remove(task_id) => ctl.delete_task(&task_id).await,
            Command::Mode(mode) => ctl.switch_mode(mode).await,
            Command::Reload => ctl.load().await,
            Command::Help | Command::Quit => Ok(()),
        }
    }

    /// Asks before a list and all of its tasks go away. Anything but yes declines.
    async fn confirm_delete(&mut self, id: &str) -> std::io::Result<bool> {
        let title = match self.controller.view().list(id) {
            Some(list) => list.title.clone(),
            None => id.to_string(),
        };
        let question = format!(
            "Delete the list \"{}\" and all its tasks? This cannot be undone. [y/N] ",
            title
        );
        self.output.write_all(question.as_bytes()).await?;
        self.output.flush().await?;

        let mut answer = String::new();
        self.input.read_line(&mut answer).await?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    async fn draw(&mut self) -> std::io::Result<()> {
        let screen = render(self.controller.view(), self.controller.mode());
        self.output.write_all(screen.as_bytes()).await?;
        self.output.flush().await
    }

    async fn write_line(&mut self, text: &str) -> std::io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}
