use std::{
    io::{self, Read as _},
    sync::Arc,
    time::Duration,
};
use tokio::sync::Mutex;

use crossterm::tty::IsTty;
use indicatif::ProgressBar;

use crate::session::Session;

pub mod util {
    use dialoguer::{theme::ColorfulTheme, Confirm, Input};
    use std::{
        fmt::{Debug, Display},
        io,
        str::FromStr,
    };

    fn theme() -> ColorfulTheme {
        ColorfulTheme::default()
    }

    pub fn ask_text_with_default<T>(prompt: &str, default: T) -> io::Result<T>
    where
        T: Clone + Display + FromStr,
        T::Err: Debug + Display,
    {
        Input::with_theme(&theme())
            .with_prompt(prompt)
            .default(default)
            .interact_text()
    }

    pub fn ask_confirm(prompt: &str, default: bool) -> io::Result<bool> {
        Confirm::with_theme(&theme())
            .with_prompt(prompt)
            .default(default)
            .interact()
    }
}

/// Prompts for every session field, offering `defaults` as the initial answers.
pub fn ask_session(defaults: &Session) -> io::Result<Session> {
    use util::ask_text_with_default as ask;

    let contest = ask("Contest", defaults.contest.clone())?;
    let task = ask("Task", defaults.task.clone())?;
    let input = ask("Input file (* for stdin)", defaults.input.to_string())?;
    let output = ask("Output file (* for stdout)", defaults.output.to_string())?;
    let time_limit = ask("Time limit [ms]", defaults.time_limit)?;
    let mem_limit_mib = ask("Memory limit [MiB]", defaults.mem_limit >> 20)?;
    let checker = ask("Checker (* for built-in)", defaults.checker.to_string())?;

    Ok(Session {
        contest,
        task,
        input: input.into(),
        output: output.into(),
        time_limit,
        mem_limit: mem_limit_mib << 20,
        checker: checker.into(),
    })
}

/// Reads stdin until EOF. The prompt is shown only when stdin is a terminal.
pub fn read_stdin_to_end(prompt: &str) -> io::Result<Vec<u8>> {
    let mut stdin = io::stdin();
    if stdin.is_tty() {
        eprintln!("{} (finish with Ctrl-D)", prompt);
    }
    let mut buf = Vec::new();
    stdin.read_to_end(&mut buf)?;
    Ok(buf)
}

pub trait SpinnerExt {
    fn with_ticking(self) -> Arc<Mutex<Self>>;
}

impl SpinnerExt for ProgressBar {
    fn with_ticking(self) -> Arc<Mutex<Self>> {
        let mutex_spinner = Arc::new(Mutex::new(self));
        let spinner = mutex_spinner.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(30)).await;
                let spinner = spinner.lock().await;
                if spinner.is_finished() {
                    break;
                }
                spinner.tick();
            }
        });
        mutex_spinner
    }
}
