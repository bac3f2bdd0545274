use std::{collections::HashMap, path::Path};

use anyhow::Context as _;

use crate::config::Asset;
use crate::session::{IoTarget, Session};
use crate::str_interp::interp;

pub const EMBEDDED_TEMPLATE: &str = "template.go";

fn io_path(t: &IoTarget, std_path: &'static str) -> String {
    match t {
        IoTarget::Std => std_path.to_owned(),
        IoTarget::File(name) => name.to_owned(),
    }
}

/// Starter source for the work file.
///
/// Available variables: `#{contest}`, `#{task}`, `#{inputFile}` and `#{outputFile}`
/// (`/dev/stdin` and `/dev/stdout` when the task uses the standard streams).
pub fn render(session: &Session, custom_template: Option<&Path>) -> anyhow::Result<String> {
    let template = match custom_template {
        Some(path) => fsutil::read_to_string(path)
            .with_context(|| format!("Failed to read template {:?}", path))?,
        None => Asset::get_str(EMBEDDED_TEMPLATE)?,
    };

    let vars: HashMap<&str, String> = HashMap::from([
        ("contest", session.contest.to_owned()),
        ("task", session.task.to_owned()),
        ("inputFile", io_path(&session.input, "/dev/stdin")),
        ("outputFile", io_path(&session.output, "/dev/stdout")),
    ]);
    interp(&template, &vars).context("Invalid template")
}
