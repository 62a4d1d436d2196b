use std::fmt::Write;

use crate::controller::ViewModel;
use crate::datastore::ServiceMode;
use crate::model::TaskList;

const BAR_WIDTH: usize = 20;

pub fn progress_bar(progress: f64) -> String {
    let progress = if progress.is_finite() {
        progress.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.round() as u32
    )
}

/// Text for the current screen: overview, or the open list's detail.
pub fn render(view: &ViewModel, mode: ServiceMode) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = write_screen(&mut out, view, mode);
    out
}

fn write_screen(out: &mut String, view: &ViewModel, mode: ServiceMode) -> std::fmt::Result {
    writeln!(out, "Data source: {}", mode)?;
    if let Some(error) = &view.error {
        writeln!(out, "Error: {}", error)?;
    }
    match view.selected_list() {
        Some(list) => write_detail(out, list),
        None => write_overview(out, &view.lists),
    }
}

fn write_overview(out: &mut String, lists: &[TaskList]) -> std::fmt::Result {
    writeln!(out, "== Task Lists ==")?;
    if lists.is_empty() {
        writeln!(out, "Your space is clear.")?;
        return writeln!(out, "Create your first task list with 'new-list <title>'.");
    }
    for list in lists {
        writeln!(
            out,
            "{}  {}  ({}/{} done)",
            list.id,
            list.title,
            list.completed_count(),
            list.tasks.len()
        )?;
        if !list.description.is_empty() {
            writeln!(out, "    {}", list.description)?;
        }
        writeln!(out, "    {}", progress_bar(list.progress()))?;
    }
    Ok(())
}

fn write_detail(out: &mut String, list: &TaskList) -> std::fmt::Result {
    writeln!(out, "== {} ==", list.title)?;
    if !list.description.is_empty() {
        writeln!(out, "{}", list.description)?;
    }
    writeln!(out, "{}", progress_bar(list.progress()))?;
    if list.tasks.is_empty() {
        return writeln!(out, "This list is empty. Add a task with 'add <description>'.");
    }
    for task in &list.tasks {
        let mark = if task.completed { 'x' } else { ' ' };
        writeln!(out, "  [{}] {}  {}", mark, task.id, task.description)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn groceries() -> TaskList {
        let mut list = TaskList::new("1".into(), "Groceries".into(), "saturday".into());
        let mut milk = Task::new("10".into(), "Milk".into());
        milk.completed = true;
        list.tasks.push(milk);
        list.tasks.push(Task::new("11".into(), "Eggs".into()));
        list
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0), "[--------------------]   0%");
        assert_eq!(progress_bar(50.0), "[##########----------]  50%");
        assert_eq!(progress_bar(100.0), "[####################] 100%");
        assert_eq!(progress_bar(140.0), progress_bar(100.0));
        assert_eq!(progress_bar(f64::NAN), progress_bar(0.0));
    }

    #[test]
    fn test_overview() {
        let view = ViewModel {
            lists: vec![groceries()],
            ..ViewModel::default()
        };

        let screen = render(&view, ServiceMode::Local);

        assert!(screen.starts_with("Data source: local\n"));
        assert!(screen.contains("1  Groceries  (1/2 done)"));
        assert!(screen.contains("    saturday\n"));
        assert!(screen.contains("[##########----------]  50%"));
    }

    #[test]
    fn test_detail_and_error() {
        let view = ViewModel {
            lists: vec![groceries()],
            selected: Some("1".into()),
            error: Some("API Error: 500 Internal Server Error - db down".into()),
        };

        let screen = render(&view, ServiceMode::Api);

        assert!(screen.contains("Error: API Error: 500 Internal Server Error - db down"));
        assert!(screen.contains("== Groceries =="));
        assert!(screen.contains("  [x] 10  Milk\n"));
        assert!(screen.contains("  [ ] 11  Eggs\n"));
    }

    #[test]
    fn test_empty_states() {
        let empty = render(&ViewModel::default(), ServiceMode::Local);
        assert!(empty.contains("Your space is clear."));

        let view = ViewModel {
            lists: vec![TaskList::new("1".into(), "Empty".into(), "".into())],
            selected: Some("1".into()),
            ..ViewModel::default()
        };
        assert!(render(&view, ServiceMode::Local).contains("This list is empty."));
    }
}
