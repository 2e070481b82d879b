use crate::assessment::{Question, QuestionKind};
use crate::core::AssessmentResult;
use crate::core::wizard::{Session, WizardError};
use anyhow::{Result, bail};
use std::io::{BufRead, Write};

#[derive(Debug)]
pub enum Outcome {
    Submitted(AssessmentResult),
    Quit,
}

enum Step {
    Advance,
    Back,
    Restart,
    Stay,
    Quit,
}

/// Walks `session` question by question, reading answers line by line.
///
/// Single-choice questions accept the option number or its value. Group
/// items accept y/n. `b` goes back one question, `r` discards every answer
/// and starts over, `q` quits without scoring.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    input: &mut R,
    out: &mut W,
) -> Result<Outcome> {
    let total = session.assessment().questions.len();
    writeln!(out, "{}", session.assessment().title)?;
    writeln!(
        out,
        "answer with a number or value, `b` to go back, `r` to restart, `q` to quit"
    )?;

    loop {
        let Some(question) = session.current() else {
            bail!("assessment has no questions");
        };

        writeln!(out)?;
        writeln!(
            out,
            "[{}/{}] {}",
            session.position() + 1,
            total,
            section_label(question)
        )?;
        writeln!(out, "{}", question.prompt)?;

        let step = match &question.kind {
            QuestionKind::SingleChoice { .. } => ask_choice(session, question, input, out)?,
            QuestionKind::YesNoGroup { .. } => ask_group(session, question, input, out)?,
        };

        match step {
            Step::Quit => return Ok(Outcome::Quit),
            Step::Stay => {}
            Step::Restart => {
                session.retake();
                writeln!(out, "answers cleared, starting over")?;
            }
            Step::Back => {
                if !session.back() {
                    writeln!(out, "already at the first question")?;
                }
            }
            Step::Advance if session.is_last() => match session.submit() {
                Ok(result) => return Ok(Outcome::Submitted(result)),
                Err(WizardError::Incomplete(missing)) => {
                    writeln!(out, "still unanswered: {}", missing.join(", "))?;
                    session.go_to_first_unanswered();
                }
                Err(err) => return Err(err.into()),
            },
            Step::Advance => {
                session.next();
            }
        }
    }
}

fn section_label(question: &Question) -> String {
    match &question.subsection {
        Some(subsection) => format!("{} / {}", question.section, subsection),
        None => question.section.clone(),
    }
}

fn ask_choice<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    question: &Question,
    input: &mut R,
    out: &mut W,
) -> Result<Step> {
    let QuestionKind::SingleChoice { options } = &question.kind else {
        return Ok(Step::Stay);
    };

    let selected = session
        .answers()
        .get(&question.id)
        .map(|answer| answer.value.clone());
    for (idx, option) in options.iter().enumerate() {
        let marker = if selected.as_deref() == Some(option.value.as_str()) {
            "*"
        } else {
            " "
        };
        writeln!(out, " {marker}{}) {}", idx + 1, option.label)?;
    }

    let Some(line) = read_line(input, out, "> ")? else {
        return Ok(Step::Quit);
    };

    let value = match line.as_str() {
        "q" | "quit" => return Ok(Step::Quit),
        "b" | "back" => return Ok(Step::Back),
        "r" | "restart" => return Ok(Step::Restart),
        "" if selected.is_some() => return Ok(Step::Advance),
        "" => {
            writeln!(out, "choose one of the options")?;
            return Ok(Step::Stay);
        }
        // an option value wins over an option number
        raw if options.iter().any(|option| option.value.eq_ignore_ascii_case(raw)) => raw,
        raw => match raw.parse::<usize>() {
            Ok(number) if (1..=options.len()).contains(&number) => {
                options[number - 1].value.as_str()
            }
            _ => raw,
        },
    };

    match session.answer(&question.id, value) {
        Ok(()) => Ok(Step::Advance),
        Err(err) => {
            writeln!(out, "{err}")?;
            Ok(Step::Stay)
        }
    }
}

fn ask_group<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    question: &Question,
    input: &mut R,
    out: &mut W,
) -> Result<Step> {
    let QuestionKind::YesNoGroup { items, .. } = &question.kind else {
        return Ok(Step::Stay);
    };

    for item in items {
        loop {
            let prompt = format!("  {} [y/n] ", item.prompt);
            let Some(line) = read_line(input, out, &prompt)? else {
                return Ok(Step::Quit);
            };

            match line.as_str() {
                "q" | "quit" => return Ok(Step::Quit),
                "b" | "back" => return Ok(Step::Back),
                "r" | "restart" => return Ok(Step::Restart),
                "" if session.answers().contains_key(&item.id) => break,
                value => match session.answer(&item.id, value) {
                    Ok(()) => break,
                    Err(err) => writeln!(out, "  {err}")?,
                },
            }
        }
    }

    Ok(Step::Advance)
}

fn read_line<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::Assessment;
    use crate::assessment::tests::{group_assessment, two_question_assessment};
    use crate::core::score::HealthStatus;
    use std::io::Cursor;

    fn drive(session: &mut Session<'_>, script: &str) -> (Outcome, String) {
        let mut input = Cursor::new(script.to_string());
        let mut out = Vec::new();
        let outcome = run(session, &mut input, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn answers_by_number_and_value() {
        let assessment = two_question_assessment();
        let mut session = Session::new(&assessment);

        let (outcome, transcript) = drive(&mut session, "2\nsome\n");
        let Outcome::Submitted(result) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(result.total, 10);
        assert_eq!(result.health_status, HealthStatus::Struggling);
        assert!(transcript.contains("[2/2] B"));
    }

    #[test]
    fn back_keeps_previous_answer_selected() {
        let assessment = two_question_assessment();
        let mut session = Session::new(&assessment);

        let (outcome, transcript) = drive(&mut session, "3\nb\n\n1\n");
        let Outcome::Submitted(result) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(result.total, 10);
        assert!(transcript.contains(" *3) High"));
    }

    #[test]
    fn invalid_input_repeats_the_question() {
        let assessment = two_question_assessment();
        let mut session = Session::new(&assessment);

        let (outcome, transcript) = drive(&mut session, "9\nq\n");
        assert!(matches!(outcome, Outcome::Quit));
        assert!(transcript.contains("invalid answer \"9\" for q1"));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn group_items_are_asked_one_by_one() {
        let assessment = group_assessment();
        let mut session = Session::new(&assessment);

        let (outcome, _) = drive(&mut session, "y\nn\nmaybe\ny\ny\n");
        let Outcome::Submitted(result) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(result.total, 9);
    }

    #[test]
    fn restart_discards_answers() {
        let assessment = two_question_assessment();
        let mut session = Session::new(&assessment);

        let (outcome, transcript) = drive(&mut session, "3\nr\n1\n1\n");
        let Outcome::Submitted(result) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(result.total, 0);
        assert!(transcript.contains("answers cleared"));
    }

    #[test]
    fn numeric_option_values_take_precedence_over_positions() {
        let assessment = Assessment::from_toml_str(
            r#"
id = "numeric"
title = "Numeric values"
max_possible_total = 10

[[sections]]
name = "A"
max = 10

[[questions]]
id = "rating"
prompt = "Rate it"
section = "A"
kind = "single-choice"
options = [
    { value = "10", label = "Ten", points = 10 },
    { value = "5", label = "Five", points = 5 },
    { value = "0", label = "Zero", points = 0 },
]
"#,
        )
        .unwrap();

        let mut session = Session::new(&assessment);
        let (outcome, _) = drive(&mut session, "5\n");
        let Outcome::Submitted(result) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(result.total, 5);

        let mut session = Session::new(&assessment);
        let (outcome, _) = drive(&mut session, "3\n");
        let Outcome::Submitted(result) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(result.total, 0);
    }

    #[test]
    fn end_of_input_quits() {
        let assessment = group_assessment();
        let mut session = Session::new(&assessment);

        let (outcome, _) = drive(&mut session, "y\n");
        assert!(matches!(outcome, Outcome::Quit));
        assert_eq!(session.answers().len(), 1);
    }
}
