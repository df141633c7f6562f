//! Interactive text menu.
//!
//! # Responsibility
//! - Translate numbered menu choices into core service calls.
//! - Render results and core error messages; no business rules live here.
//!
//! # Invariants
//! - The logged-in identity is a local of the task loop and is dropped on
//!   logout.
//! - End of input exits cleanly from any prompt.

use crate::render::{search_table, task_table};
use chrono::NaiveDateTime;
use mytasks_core::{AuthError, AuthService, Identity, TaskService, TaskStore};
use std::io::{self, BufRead, Write};

/// Wall-clock source for reminder checks.
pub type Clock = fn() -> NaiveDateTime;

pub struct Menu<'s, I, O> {
    auth: AuthService<&'s dyn TaskStore>,
    tasks: TaskService<&'s dyn TaskStore>,
    input: I,
    output: O,
    clock: Clock,
}

impl<'s, I: BufRead, O: Write> Menu<'s, I, O> {
    pub fn new(
        auth: AuthService<&'s dyn TaskStore>,
        tasks: TaskService<&'s dyn TaskStore>,
        input: I,
        output: O,
        clock: Clock,
    ) -> Self {
        Self {
            auth,
            tasks,
            input,
            output,
            clock,
        }
    }

    /// Runs the welcome loop until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\nWelcome to My Tasks App")?;
            writeln!(self.output, "1. Register")?;
            writeln!(self.output, "2. Login")?;
            writeln!(self.output, "3. Exit")?;
            let Some(choice) = self.prompt_choice("Choose an option (1/2/3): ")? else {
                return Ok(());
            };

            match choice.as_str() {
                "1" => self.register()?,
                "2" => {
                    if let Some(identity) = self.login()? {
                        if !self.task_loop(&identity)? {
                            return Ok(());
                        }
                    }
                }
                "3" => {
                    writeln!(self.output, "Exiting...")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid option. Please choose 1, 2, or 3.")?,
            }
        }
    }

    fn register(&mut self) -> io::Result<()> {
        let Some(username) = self.prompt("Enter a username: ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("Enter a passcode: ")? else {
            return Ok(());
        };

        match self.auth.register(&username, &password) {
            Ok(()) => writeln!(self.output, "Registration successful!"),
            Err(AuthError::AlreadyExists(_)) => writeln!(
                self.output,
                "Username already exists. Please choose another."
            ),
            Err(err) => writeln!(self.output, "Registration failed: {err}"),
        }
    }

    fn login(&mut self) -> io::Result<Option<Identity>> {
        let Some(username) = self.prompt("Enter your username: ")? else {
            return Ok(None);
        };
        let Some(password) = self.prompt("Enter your passcode: ")? else {
            return Ok(None);
        };

        match self.auth.login(&username, &password) {
            Ok(identity) => {
                writeln!(self.output, "Login successful!")?;
                Ok(Some(identity))
            }
            Err(AuthError::InvalidCredentials) => {
                writeln!(self.output, "Invalid username or passcode.")?;
                Ok(None)
            }
            Err(err) => {
                writeln!(self.output, "Login failed: {err}")?;
                Ok(None)
            }
        }
    }

    /// Returns `false` when input ended inside the loop.
    fn task_loop(&mut self, identity: &Identity) -> io::Result<bool> {
        loop {
            writeln!(self.output, "\nTask Management")?;
            writeln!(self.output, "1. Add Task")?;
            writeln!(self.output, "2. Show Tasks")?;
            writeln!(self.output, "3. Search Tasks")?;
            writeln!(self.output, "4. Check Reminders")?;
            writeln!(self.output, "5. Logout")?;
            let Some(choice) = self.prompt_choice("Choose an option (1/2/3/4/5): ")? else {
                return Ok(false);
            };

            let completed = match choice.as_str() {
                "1" => self.add_task(identity)?,
                "2" => self.show_tasks(identity)?,
                "3" => self.search_tasks(identity)?,
                "4" => {
                    self.check_reminders(identity)?;
                    true
                }
                "5" => {
                    writeln!(self.output, "Logging out...")?;
                    return Ok(true);
                }
                _ => {
                    writeln!(
                        self.output,
                        "Invalid option. Please choose 1, 2, 3, 4 or 5."
                    )?;
                    true
                }
            };
            if !completed {
                return Ok(false);
            }
        }
    }

    fn add_task(&mut self, identity: &Identity) -> io::Result<bool> {
        let Some(title) = self.prompt("Enter task title: ")? else {
            return Ok(false);
        };
        let Some(due_date) = self.prompt_choice("Enter due date (YYYY-MM-DD): ")? else {
            return Ok(false);
        };
        let Some(category) = self.prompt("Enter category: ")? else {
            return Ok(false);
        };

        match self.tasks.add(identity, &title, &due_date, Some(category.as_str())) {
            Ok(_) => writeln!(self.output, "Task added successfully!")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(true)
    }

    fn show_tasks(&mut self, identity: &Identity) -> io::Result<bool> {
        let Some(sort_by) = self.prompt_choice("Sort by (title/due_date/category): ")? else {
            return Ok(false);
        };

        let sorted = match self.tasks.list_sorted(identity, &sort_by) {
            Ok(sorted) => sorted,
            Err(err) => {
                writeln!(self.output, "{err}")?;
                return Ok(true);
            }
        };
        if sorted.tasks.is_empty() {
            writeln!(self.output, "No tasks for you. Please add one.")?;
            return Ok(true);
        }
        if sorted.fell_back() {
            writeln!(
                self.output,
                "Invalid sort key. Using default ('{}').",
                sorted.key
            )?;
        }

        writeln!(self.output, "Number of tasks: {}", sorted.tasks.len())?;
        write!(self.output, "{}", task_table(&sorted.tasks))?;
        Ok(true)
    }

    fn search_tasks(&mut self, identity: &Identity) -> io::Result<bool> {
        let Some(query) = self.prompt("Enter the title to search: ")? else {
            return Ok(false);
        };

        match self.tasks.search(identity, &query) {
            Ok(found) if found.is_empty() => {
                writeln!(self.output, "No tasks found matching the search criteria.")?;
            }
            Ok(found) => {
                writeln!(self.output, "Number of tasks found: {}", found.len())?;
                write!(self.output, "{}", search_table(&found))?;
            }
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(true)
    }

    fn check_reminders(&mut self, identity: &Identity) -> io::Result<()> {
        match self.tasks.due(identity, (self.clock)()) {
            Ok(due) if due.is_empty() => writeln!(self.output, "No tasks are due today."),
            Ok(due) => {
                writeln!(self.output, "\nUpcoming Tasks:")?;
                for task in &due {
                    writeln!(
                        self.output,
                        "- {} (Due: {})",
                        task.title,
                        task.due_date_text()
                    )?;
                }
                Ok(())
            }
            Err(err) => writeln!(self.output, "{err}"),
        }
    }

    /// Prints `label` and reads one line without its line ending; `None` at
    /// end of input. Inner and edge whitespace is kept, so passcodes and titles
    /// reach the core exactly as the subcommands pass them.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Like `prompt`, trimmed; for menu choices, sort keys and dates.
    fn prompt_choice(&mut self, label: &str) -> io::Result<Option<String>> {
        Ok(self.prompt(label)?.map(|answer| answer.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Menu;
    use chrono::{NaiveDate, NaiveDateTime};
    use mytasks_core::{AuthService, SqliteStore, TaskService, TaskStore};

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn run_script(store: &dyn TaskStore, script: &str) -> String {
        let auth = AuthService::with_cost(store, 256, 1, 1).unwrap();
        let tasks = TaskService::new(store);
        let mut output = Vec::new();
        Menu::new(auth, tasks, script.as_bytes(), &mut output, fixed_clock)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn register_login_add_show_and_remind() {
        let store = SqliteStore::open_in_memory().unwrap();
        let script = "\
1
alice
secret
2
alice
secret
1
Pay rent
2024-03-01
bills
1
Trip
2024-04-01

2
size
3
RENT
4
5
3
";
        let out = run_script(&store, script);

        assert!(out.contains("Registration successful!"));
        assert!(out.contains("Login successful!"));
        assert_eq!(out.matches("Task added successfully!").count(), 2);
        assert!(out.contains("Invalid sort key. Using default ('due_date')."));
        assert!(out.contains("Number of tasks: 2"));
        assert!(out.contains("| Pay rent | 2024-03-01 | bills    |"));
        assert!(out.contains("Number of tasks found: 1"));
        assert!(out.contains("- Pay rent (Due: 2024-03-01)"));
        assert!(!out.contains("- Trip"));
        assert!(out.contains("Logging out..."));
        assert!(out.ends_with("Exiting...\n"));
    }

    #[test]
    fn reports_duplicate_user_bad_login_and_bad_date() {
        let store = SqliteStore::open_in_memory().unwrap();
        let script = "\
1
bob
pw
1
bob
pw2
2
bob
nope
2
bob
pw
1
Dentist
tomorrow
x
2

";
        let out = run_script(&store, script);

        assert!(out.contains("Username already exists. Please choose another."));
        assert!(out.contains("Invalid username or passcode."));
        assert!(out.contains("Invalid due date format `tomorrow`, use YYYY-MM-DD"));
        assert!(out.contains("No tasks for you. Please add one."));
    }

    #[test]
    fn passcode_keeps_edge_spaces_across_adapters() {
        let store = SqliteStore::open_in_memory().unwrap();
        AuthService::with_cost(&store as &dyn TaskStore, 256, 1, 1)
            .unwrap()
            .register("dave", " pw ")
            .unwrap();

        let out = run_script(&store, "2\ndave\n pw \r\n 5 \n3\n");
        assert!(out.contains("Login successful!"));
        assert!(out.contains("Logging out..."));

        let out = run_script(&store, "2\ndave\npw\n3\n");
        assert!(out.contains("Invalid username or passcode."));
        assert!(!out.contains("Login successful!"));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let store = SqliteStore::open_in_memory().unwrap();
        let out = run_script(&store, "9\n");
        assert!(out.contains("Invalid option. Please choose 1, 2, or 3."));
    }
}
