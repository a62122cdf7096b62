use std::io::{BufRead, Write};

use {
    anyhow::{Context, Result},
    log::{info, warn},
    minijinja::{context, Environment, Value},
};

use crate::{
    persona::Persona,
    responder::{Completion, ResponseService},
};

pub const EMPTY_QUERY_WARNING: &str = "Please enter a question.";
pub const UNREADABLE_INPUT_WARNING: &str = "Input was not valid UTF-8 and was ignored.";

const INTRO_TEMPLATE: &str = r#"Ask an expert
Choose the expert you want to consult, then type your question.
Finish a question with an empty line or a lone `.`.
The AI answers in that expert's role. End input (Ctrl-D) to quit.

{% for persona in personas %}  {{ loop.index }}. {{ persona }}
{% endfor %}"#;

const ANSWER_TEMPLATE: &str = r#"
Answer from {{ persona }}:
{{ text }}
"#;

const FAILURE_TEMPLATE: &str = r#"Error: {{ error }}
{{ hint }}"#;

const WARNING_TEMPLATE: &str = "Warning: {{ message }}";

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Warning(String),
    Answer { persona: Persona, text: String },
    Failure { error: String, hint: String },
}

impl Outcome {
    pub fn render(&self) -> Result<String> {
        match self {
            Outcome::Warning(message) => render(WARNING_TEMPLATE, context! { message }),
            Outcome::Answer { persona, text } => render(
                ANSWER_TEMPLATE,
                context! { persona => persona.label(), text },
            ),
            Outcome::Failure { error, hint } => {
                render(FAILURE_TEMPLATE, context! { error, hint })
            }
        }
    }
}

fn render(template: &str, ctx: Value) -> Result<String> {
    Environment::new()
        .render_str(template, ctx)
        .with_context(|| "unable to render console template")
}

/// Remediation shown with every failed request.
pub fn credential_hint(api_key_env: &str) -> String {
    format!("Check that {api_key_env} holds a valid API key for the completion service.")
}

enum Line {
    Text(String),
    Unreadable,
    End,
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Line> {
    let mut buf = vec![];
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(Line::End);
    }

    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }

    Ok(match String::from_utf8(buf) {
        Ok(text) => Line::Text(text),
        Err(_) => Line::Unreadable,
    })
}

fn prompt<R, W>(input: &mut R, output: &mut W, label: &str) -> Result<Line>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{label}")?;
    output.flush()?;
    read_line(input)
}

/// Collect lines up to an empty line, a lone `.`, or end of input.
/// An unreadable line spoils the whole question but the rest is still consumed.
fn read_question<R: BufRead>(input: &mut R) -> Result<Line> {
    let mut lines: Vec<String> = vec![];
    let mut unreadable = false;

    loop {
        match read_line(input)? {
            Line::Text(line) if line.is_empty() || line == "." => break,
            Line::Text(line) => lines.push(line),
            Line::Unreadable => unreadable = true,
            Line::End if lines.is_empty() && !unreadable => return Ok(Line::End),
            Line::End => break,
        }
    }

    if unreadable {
        return Ok(Line::Unreadable);
    }
    Ok(Line::Text(lines.join("\n")))
}

pub struct Console<'a, C> {
    service: &'a ResponseService<C>,
    hint: String,
}

impl<'a, C: Completion> Console<'a, C> {
    pub fn new(service: &'a ResponseService<C>, api_key_env: &str) -> Self {
        Self {
            service,
            hint: credential_hint(api_key_env),
        }
    }

    /// Guard against empty input, ask once, and fold the result into something displayable.
    pub fn submit(&self, persona: Persona, query: &str) -> Outcome {
        if query.is_empty() {
            return Outcome::Warning(String::from(EMPTY_QUERY_WARNING));
        }

        match self.service.get_response(query, persona) {
            Ok(text) => Outcome::Answer { persona, text },
            Err(e) => Outcome::Failure {
                error: e.to_string(),
                hint: self.hint.clone(),
            },
        }
    }

    /// Interactive session: pick an expert, ask, show the answer, repeat until input ends.
    pub fn run<R, W>(&self, mut input: R, mut output: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let personas: Vec<&str> = Persona::ALL.iter().map(|p| p.label()).collect();
        writeln!(output, "{}", render(INTRO_TEMPLATE, context! { personas })?)?;

        let persona_label = format!("\nExpert [1-{}]: ", Persona::ALL.len());
        let unreadable = Outcome::Warning(String::from(UNREADABLE_INPUT_WARNING)).render()?;

        loop {
            let selection = match prompt(&mut input, &mut output, &persona_label)? {
                Line::Text(selection) => selection,
                Line::Unreadable => {
                    warn!("Discarded a non UTF-8 persona selection");
                    writeln!(output, "{unreadable}")?;
                    continue;
                }
                Line::End => break,
            };

            let persona = match Persona::from_selection(&selection) {
                Ok(persona) => persona,
                Err(e) => {
                    writeln!(output, "{e}")?;
                    continue;
                }
            };

            write!(output, "Question: ")?;
            output.flush()?;
            let query = match read_question(&mut input)? {
                Line::Text(query) => query,
                Line::Unreadable => {
                    warn!("Discarded a non UTF-8 question");
                    writeln!(output, "{unreadable}")?;
                    continue;
                }
                Line::End => break,
            };

            if !query.is_empty() {
                writeln!(output, "Generating answer...")?;
                output.flush()?;
            }

            let outcome = self.submit(persona, &query);
            writeln!(output, "{}", outcome.render()?)?;
        }

        writeln!(output)?;
        info!("Session ended");
        Ok(())
    }
}
