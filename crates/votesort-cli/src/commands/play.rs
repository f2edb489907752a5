//! The `votesort play` command: a line-oriented game loop.
//!
//! Every number typed by the player is a 1-based position in the table that
//! was last printed. The loop translates those positions into engine intents.

use std::io::{BufRead, Write};

use anyhow::Result;
use comfy_table::{Cell, Table};

use votesort_core::model::{AnswerId, PuzzleInstance};
use votesort_core::scorer::{ScoreResult, Verdict};
use votesort_core::state::PuzzleState;
use votesort_core::{EngineError, GameEngine, Intent, MoveOutcome, Session};

use crate::GameArgs;

pub async fn execute(args: GameArgs) -> Result<()> {
    let mut engine = super::load_engine(&args).await?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run(&mut engine, stdin.lock(), stdout.lock())
}

/// Drive `engine` from `input` until it is exhausted or the player quits.
pub fn run<R: BufRead, W: Write>(engine: &mut GameEngine, input: R, mut out: W) -> Result<()> {
    writeln!(out, "{}", render_session(engine.session()))?;
    writeln!(out, "Type `help` for commands.")?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(line, engine.session()) {
            Ok(command) => command,
            Err(msg) => {
                writeln!(out, "{msg}")?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => writeln!(out, "{}", help_text(engine.session()))?,
            Command::Show => writeln!(out, "{}", render_session(engine.session()))?,
            Command::Score => writeln!(out, "{}", render_score(&engine.score()?))?,
            Command::Play(intent) => match engine.handle(intent) {
                Ok(outcome) => {
                    writeln!(out, "{}", describe_outcome(&outcome))?;
                    if engine.session().is_finished() {
                        writeln!(out, "{}", render_score(&engine.score()?))?;
                        writeln!(out, "Type `new` for another game or `quit` to leave.")?;
                    } else {
                        writeln!(out, "{}", render_session(engine.session()))?;
                    }
                }
                Err(e) if e.is_recoverable() => writeln!(out, "Rejected: {}", describe_error(&e))?,
                Err(e) => return Err(e.into()),
            },
        }
    }

    writeln!(out, "Games played: {}", engine.games_started())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One parsed line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(Intent),
    Show,
    Score,
    Help,
    Quit,
}

/// Parse `line` against the puzzle on the table.
pub fn parse_command(line: &str, session: &Session) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_lowercase();
    let numbers = words
        .map(|w| {
            w.parse::<usize>()
                .ok()
                .filter(|&n| n >= 1)
                .ok_or_else(|| format!("expected a position number, got '{w}'"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let instance = session.instance();
    let command = match (verb.as_str(), numbers.as_slice()) {
        ("quit" | "exit", []) => Command::Quit,
        ("help" | "?", []) => Command::Help,
        ("show" | "ls", []) => Command::Show,
        ("score", []) => Command::Score,
        ("submit" | "done", []) => Command::Play(Intent::Submit),
        ("new", []) => Command::Play(Intent::NewGame),

        ("pick", [n]) => match instance {
            PuzzleInstance::Match(p) => {
                let choice = nth(&p.choices, *n, "question")?;
                Command::Play(Intent::SelectQuestion {
                    id: choice.id.clone(),
                })
            }
            _ => return Err(wrong_variant(&verb, session)),
        },

        ("q", [n]) => match instance {
            PuzzleInstance::Pair(p) => {
                let question = nth(&p.questions, *n, "question")?;
                Command::Play(Intent::SelectQuestion {
                    id: question.id.clone(),
                })
            }
            _ => return Err(wrong_variant(&verb, session)),
        },

        ("a", [n]) => match instance {
            PuzzleInstance::Pair(p) => {
                let answer = nth(&p.answers, *n, "answer")?;
                Command::Play(Intent::SelectAnswer { id: answer.id })
            }
            _ => return Err(wrong_variant(&verb, session)),
        },

        ("move" | "mv", [from, to]) => match instance {
            PuzzleInstance::Rank(_) => Command::Play(Intent::Move {
                from: from - 1,
                to: to - 1,
            }),
            _ => return Err(wrong_variant(&verb, session)),
        },

        ("order", positions) if !positions.is_empty() => match session.state() {
            PuzzleState::Rank(s) => {
                let current = s.current_order();
                let order = positions
                    .iter()
                    .map(|&n| nth(current, n, "slot").copied())
                    .collect::<Result<Vec<AnswerId>, _>>()?;
                Command::Play(Intent::Reorder { order })
            }
            _ => return Err(wrong_variant(&verb, session)),
        },

        _ => return Err(format!("unrecognized command '{line}', type `help`")),
    };
    Ok(command)
}

fn nth<'a, T>(items: &'a [T], n: usize, what: &str) -> Result<&'a T, String> {
    items
        .get(n - 1)
        .ok_or_else(|| format!("no {what} {n}, pick 1-{}", items.len()))
}

fn wrong_variant(verb: &str, session: &Session) -> String {
    format!(
        "`{verb}` does not apply to a {} puzzle, type `help`",
        session.instance().variant()
    )
}

fn help_text(session: &Session) -> String {
    let specific = match session.instance() {
        PuzzleInstance::Match(_) => "  pick N        choose question N\n",
        PuzzleInstance::Pair(_) => "  q N           focus question N\n  a N           pair answer N with the focused question\n",
        PuzzleInstance::Rank(_) => "  move A B      move the answer in slot A to slot B\n  order A B ..  list every slot in your preferred order\n",
    };
    format!(
        "Commands:\n{specific}  submit        lock in your answer\n  show          print the puzzle again\n  score         print the current score\n  new           deal a new game\n  quit          leave"
    )
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn render_session(session: &Session) -> String {
    match (session.instance(), session.state()) {
        (PuzzleInstance::Match(p), PuzzleState::Match(s)) => {
            let mut answers = Table::new();
            answers.set_header(vec!["Top answers"]);
            for answer in &p.answers {
                answers.add_row(vec![Cell::new(&answer.text)]);
            }

            let mut choices = Table::new();
            choices.set_header(vec!["#", "Question", ""]);
            for (i, question) in p.choices.iter().enumerate() {
                let marker = if s.selection() == Some(question.id.as_str()) {
                    "<-"
                } else {
                    ""
                };
                choices.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(&question.text),
                    Cell::new(marker),
                ]);
            }
            format!("Which question got these answers?\n{answers}\n{choices}")
        }
        (PuzzleInstance::Pair(p), PuzzleState::Pair(s)) => {
            let mut questions = Table::new();
            questions.set_header(vec!["#", "Question", "Paired with"]);
            for (i, question) in p.questions.iter().enumerate() {
                let focus = if s.focus() == Some(question.id.as_str()) {
                    "*"
                } else {
                    ""
                };
                let paired = s
                    .assigned_answer(&question.id)
                    .and_then(|id| p.answers.iter().position(|a| a.id == id))
                    .map(|pos| format!("answer {}", pos + 1))
                    .unwrap_or_default();
                questions.add_row(vec![
                    Cell::new(format!("{focus}{}", i + 1)),
                    Cell::new(&question.text),
                    Cell::new(paired),
                ]);
            }

            let mut answers = Table::new();
            answers.set_header(vec!["#", "Answer"]);
            for (i, answer) in p.answers.iter().enumerate() {
                answers.add_row(vec![Cell::new(i + 1), Cell::new(&answer.text)]);
            }
            format!("Pair each question with its top answer.\n{questions}\n{answers}")
        }
        (PuzzleInstance::Rank(p), PuzzleState::Rank(s)) => {
            let mut table = Table::new();
            table.set_header(vec!["Slot", "Answer", "Locked"]);
            for (slot, id) in s.current_order().iter().enumerate() {
                let text = p.answer(*id).map(|a| a.text.as_str()).unwrap_or_default();
                let locked = if s.locked().contains(id) { "yes" } else { "" };
                table.add_row(vec![Cell::new(slot + 1), Cell::new(text), Cell::new(locked)]);
            }
            format!(
                "Order the answers by votes, most voted first.\nQ: {}\n{table}\nAttempts: {}",
                p.question.text,
                s.attempts()
            )
        }
        _ => String::from("(session state does not match its puzzle)"),
    }
}

fn describe_outcome(outcome: &MoveOutcome) -> String {
    match outcome {
        MoveOutcome::Selected { .. } => "Selected. Type `submit` to lock it in.".to_string(),
        MoveOutcome::Focused { .. } => "Question focused, now pick an answer with `a N`.".to_string(),
        MoveOutcome::Assigned { displaced, .. } => match displaced {
            Some(_) => "Paired. That answer was taken from another question.".to_string(),
            None => "Paired.".to_string(),
        },
        MoveOutcome::Reordered { .. } => "Reordered.".to_string(),
        MoveOutcome::Submitted => "Submitted.".to_string(),
        MoveOutcome::Ranked(feedback) => format!(
            "Attempt {}: {}/{} in place, {} newly locked ({}/{} locked)",
            feedback.attempt,
            feedback.correct_positions,
            feedback.total,
            feedback.newly_locked,
            feedback.locked_total,
            feedback.total
        ),
        MoveOutcome::NewGame => "New game.".to_string(),
    }
}

fn describe_error(error: &EngineError) -> String {
    match error {
        EngineError::LockedPositionViolation { position } => {
            format!("slot {} is locked", position + 1)
        }
        other => other.to_string(),
    }
}

fn render_score(score: &ScoreResult) -> String {
    let mut table = Table::new();
    match score {
        ScoreResult::Match(s) => {
            table.set_header(vec!["Result", "Your pick", "Correct question"]);
            table.add_row(vec![
                Cell::new(if s.correct { "Correct!" } else { "Wrong" }),
                Cell::new(s.selected_text.as_deref().unwrap_or("-")),
                Cell::new(&s.correct_text),
            ]);
        }
        ScoreResult::Pair(s) => {
            table.set_header(vec!["Question", "Your answer", "Top answer", ""]);
            for line in &s.per_question {
                table.add_row(vec![
                    Cell::new(&line.question),
                    Cell::new(line.user_answer.as_deref().unwrap_or("-")),
                    Cell::new(&line.correct_answer),
                    Cell::new(if line.correct { "ok" } else { "x" }),
                ]);
            }
            table.add_row(vec![
                Cell::new("Score"),
                Cell::new(format!("{}/{}", s.correct_count, s.total)),
                Cell::new(""),
                Cell::new(""),
            ]);
        }
        ScoreResult::Rank(s) => {
            table.set_header(vec!["Score", "Attempts", "Verdict"]);
            let verdict = match s.verdict {
                Some(Verdict::Perfect) => "Perfect",
                Some(Verdict::Excellent) => "Excellent",
                Some(Verdict::Persistent) => "Persistent",
                None if s.perfect => "Perfect",
                None => "-",
            };
            table.add_row(vec![
                Cell::new(format!(
                    "{}/{} ({:.0}%)",
                    s.correct_positions, s.total, s.percentage
                )),
                Cell::new(s.attempts),
                Cell::new(verdict),
            ]);
        }
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use votesort_core::dataset::{CompactRecord, RawId, RawRecord};
    use votesort_core::model::Variant;
    use votesort_core::EngineConfig;

    fn records() -> Vec<RawRecord> {
        (0..6)
            .map(|i| {
                RawRecord::Compact(CompactRecord(
                    RawId::Number(i),
                    format!("Question number {i}?"),
                    100,
                    None,
                    None,
                    vec![
                        (format!("The top answer for {i}"), 50),
                        (format!("Runner-up for {i}"), 30),
                        (format!("Third place for {i}"), 10),
                        (format!("Fourth place for {i}"), 5),
                    ],
                ))
            })
            .collect()
    }

    fn engine(variant: Variant) -> GameEngine {
        let config = EngineConfig {
            variant,
            seed: Some(11),
            ..Default::default()
        };
        GameEngine::new(records(), &config).unwrap()
    }

    fn play(engine: &mut GameEngine, script: &str) -> String {
        let mut out = Vec::new();
        run(engine, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// The `order` line that solves the active ranking puzzle.
    fn solving_order(session: &Session) -> String {
        let (PuzzleInstance::Rank(p), PuzzleState::Rank(s)) = (session.instance(), session.state())
        else {
            panic!("not a ranking session");
        };
        let slots: Vec<String> = p
            .ground_truth()
            .iter()
            .map(|id| {
                let slot = s.current_order().iter().position(|c| c == id).unwrap();
                (slot + 1).to_string()
            })
            .collect();
        format!("order {}", slots.join(" "))
    }

    #[test]
    fn parse_rejects_zero_and_words() {
        let engine = engine(Variant::Rank);
        assert!(parse_command("move 0 2", engine.session()).is_err());
        assert!(parse_command("move two 2", engine.session()).is_err());
        assert!(parse_command("dance", engine.session()).is_err());
    }

    #[test]
    fn parse_maps_slots_to_answer_ids() {
        let engine = engine(Variant::Rank);
        let PuzzleState::Rank(s) = engine.session().state() else {
            panic!("not a ranking session");
        };
        let current = s.current_order().to_vec();

        let cmd = parse_command("order 2 1 3 4", engine.session()).unwrap();
        assert_eq!(
            cmd,
            Command::Play(Intent::Reorder {
                order: vec![current[1], current[0], current[2], current[3]]
            })
        );
        assert_eq!(
            parse_command("move 1 3", engine.session()).unwrap(),
            Command::Play(Intent::Move { from: 0, to: 2 })
        );
    }

    #[test]
    fn parse_rejects_commands_of_other_variants() {
        let engine = engine(Variant::Match);
        let err = parse_command("move 1 2", engine.session()).unwrap_err();
        assert!(err.contains("match"));
        assert!(parse_command("pick 9", engine.session()).is_err());
        assert!(matches!(
            parse_command("pick 1", engine.session()),
            Ok(Command::Play(Intent::SelectQuestion { .. }))
        ));
    }

    #[test]
    fn solving_a_ranking_prints_perfect() {
        let mut engine = engine(Variant::Rank);
        let order = solving_order(engine.session());
        let output = play(&mut engine, &format!("{order}\nsubmit\nquit\n"));

        assert!(output.contains("Attempt 1: 4/4 in place"));
        assert!(output.contains("Perfect"));
        assert!(output.contains("Games played: 1"));
    }

    #[test]
    fn rejected_moves_keep_the_loop_running() {
        let mut engine = engine(Variant::Pair);
        let output = play(&mut engine, "a 1\nsubmit\nfly\n");

        assert!(output.contains("Rejected: no question is focused"));
        assert!(output.contains("Rejected: illegal transition: 0 of 5 questions paired"));
        assert!(output.contains("unrecognized command 'fly'"));
    }

    #[test]
    fn new_game_deals_again() {
        let mut engine = engine(Variant::Match);
        let output = play(&mut engine, "pick 1\nsubmit\nnew\n");

        assert!(output.contains("Type `new` for another game"));
        assert!(output.contains("New game."));
        assert!(output.contains("Games played: 2"));
    }
}
