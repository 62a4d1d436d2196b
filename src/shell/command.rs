use std::str::FromStr;

use thiserror::Error;

use crate::datastore::ServiceMode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for the list of commands")]
    Unknown(String),
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{0}")]
    InvalidMode(String),
}

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lists,
    Open(String),
    Back,
    NewList {
        title: String,
        description: String,
    },
    EditList {
        id: String,
        title: String,
        description: Option<String>,
    },
    DeleteList(String),
    Add(String),
    Edit {
        task_id: String,
        description: String,
    },
    Toggle(String),
    Remove(String),
    Mode(ServiceMode),
    Reload,
    Help,
    Quit,
}

pub const USAGE: &str = "\
commands:
  lists                                   show all task lists
  open <list-id>                          show one list and its tasks
  back                                    return to the overview
  new-list <title> [| <description>]      create a task list
  edit-list <id> <title> [| <description>] rename or describe a task list
  delete-list <id>                        delete a list and all its tasks
  add <description>                       add a task to the open list
  edit <task-id> <description>            change a task's description
  toggle <task-id>                        mark a task done or not done
  rm <task-id>                            delete a task from the open list
  mode local|api                          switch the data source
  reload                                  load everything again
  help                                    show this message
  quit                                    leave";

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn required<'a>(
    value: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    if value.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(value)
    }
}

/// `title | description` with the description part optional.
fn title_and_description(rest: &str) -> (String, Option<String>) {
    match rest.split_once('|') {
        Some((title, description)) => (title.trim().to_string(), Some(description.trim().to_string())),
        None => (rest.trim().to_string(), None),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = split_word(line);
        let command = match verb {
            "lists" | "ls" => Command::Lists,
            "open" => Command::Open(required(rest, "open", "a list id")?.to_string()),
            "back" => Command::Back,
            "new-list" => {
                let (title, description) = title_and_description(rest);
                Command::NewList {
                    title,
                    description: description.unwrap_or_default(),
                }
            }
            "edit-list" => {
                let (id, rest) = split_word(rest);
                let id = required(id, "edit-list", "a list id")?.to_string();
                let (title, description) = title_and_description(rest);
                Command::EditList {
                    id,
                    title,
                    description,
                }
            }
            "delete-list" => {
                Command::DeleteList(required(rest, "delete-list", "a list id")?.to_string())
            }
            "add" => Command::Add(rest.to_string()),
            "edit" => {
                let (task_id, description) = split_word(rest);
                Command::Edit {
                    task_id: required(task_id, "edit", "a task id")?.to_string(),
                    description: description.to_string(),
                }
            }
            "toggle" => Command::Toggle(required(rest, "toggle", "a task id")?.to_string()),
            "rm" => Command::Remove(required(rest, "rm", "a task id")?.to_string()),
            "mode" => Command::Mode(
                required(rest, "mode", "local or api")?
                    .parse()
                    .map_err(CommandError::InvalidMode)?,
            ),
            "reload" => Command::Reload,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
