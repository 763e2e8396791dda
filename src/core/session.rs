/// Interactive play: read selections, advance the story, render pages.
use std::io::{BufRead, Write};
use tracing::debug;

use crate::core::config::PlayConfig;
use crate::core::error::{ChoiceError, StoryError};
use crate::schema::page::{PageKind, PageNumber};
use crate::schema::story::Story;

/// How a finished playthrough ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub ending: PageKind,
    /// Every page landed on, starting with page 0.
    pub visited: Vec<PageNumber>,
}

/// Parse a raw selection token as a 1-based choice index.
pub fn parse_choice(token: &str) -> Result<usize, ChoiceError> {
    match token.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ChoiceError::Invalid(token.trim().to_string())),
    }
}

/// Play `story` from page 0 until a Win or Lose page.
///
/// Each non-blank input line is one selection. Rejected selections print
/// the configured message and re-prompt without changing state. Running
/// out of input before the story ends is `StoryError::InputClosed`.
pub fn play<R: BufRead, W: Write>(
    story: &mut Story,
    config: &PlayConfig,
    mut input: R,
    mut output: W,
) -> Result<PlayOutcome, StoryError> {
    let mut current = story.begin();
    let mut visited = vec![current];
    let Some(start) = story.page(current) else {
        return Err(StoryError::MissingPage(current));
    };
    write!(output, "{}", start.render(story.memory()))?;
    output.flush()?;
    if start.is_terminal() {
        return Ok(PlayOutcome {
            ending: start.kind,
            visited,
        });
    }

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(StoryError::InputClosed);
        }
        if line.trim().is_empty() {
            continue;
        }

        let result = parse_choice(&line).and_then(|choice| story.advance(current, choice));
        let transition = match result {
            Ok(t) => t,
            Err(ChoiceError::Invalid(token)) => {
                debug!(page = %current, %token, "invalid choice");
                writeln!(output, "{}", config.invalid_choice)?;
                continue;
            }
            Err(ChoiceError::Unavailable(choice)) => {
                debug!(page = %current, choice, "unavailable choice");
                writeln!(output, "{}", config.unavailable_choice)?;
                continue;
            }
        };

        current = transition.page;
        visited.push(current);
        let Some(page) = story.page(current) else {
            return Err(StoryError::MissingPage(current));
        };
        write!(output, "{}", page.render(story.memory()))?;
        output.flush()?;

        if transition.terminal {
            return Ok(PlayOutcome {
                ending: page.kind,
                visited,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::MemorySource;

    fn story() -> Story {
        let src = MemorySource::new()
            .with_file("yard.txt", "You are in a yard.")
            .with_file("shed.txt", "A dusty shed.")
            .with_file("cave.txt", "Gold everywhere.")
            .with_file("pit.txt", "You fall.");
        Story::builder(&src)
            .with_lines([
                "0@N:yard.txt",
                "0:1:Search the shed",
                "0:2[torch=1]:Enter the cave",
                "0:3:Jump in the pit",
                "1@N:shed.txt",
                "1$torch=1",
                "1:0:Go back",
                "2@W:cave.txt",
                "3@L:pit.txt",
            ])
            .build()
            .unwrap()
    }

    fn run(input: &str) -> (Result<PlayOutcome, StoryError>, String) {
        let mut story = story();
        let mut out = Vec::new();
        let result = play(&mut story, &PlayConfig::default(), input.as_bytes(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parse_choice_rejects_zero_and_garbage() {
        assert_eq!(parse_choice("2\n"), Ok(2));
        assert!(matches!(parse_choice("0"), Err(ChoiceError::Invalid(_))));
        assert!(matches!(parse_choice("-1"), Err(ChoiceError::Invalid(_))));
        assert!(matches!(parse_choice("two"), Err(ChoiceError::Invalid(_))));
    }

    #[test]
    fn winning_playthrough() {
        let (result, out) = run("1\n1\n2\n");
        let outcome = result.unwrap();
        assert_eq!(outcome.ending, PageKind::Win);
        assert_eq!(
            outcome.visited,
            vec![PageNumber(0), PageNumber(1), PageNumber(0), PageNumber(2)]
        );
        assert!(out.starts_with("You are in a yard.\n\nWhat would you like to do?\n\n 1. Search the shed\n 2. <UNAVAILABLE>\n"));
        assert!(out.contains(" 2. Enter the cave\n"));
        assert!(out.ends_with("Gold everywhere.\n\nCongratulations! You have won. Hooray!\n"));
    }

    #[test]
    fn gated_choice_reprompts_with_distinct_message() {
        let (result, out) = run("2\n9\n3\n");
        assert_eq!(result.unwrap().ending, PageKind::Lose);
        assert!(out.contains("That choice is not available at this time, please try again\n"));
        assert!(out.contains("That is not a valid choice, please try again\n"));
        assert!(out.ends_with("Sorry, you have lost. Better luck next time!\n"));
    }

    #[test]
    fn blank_input_lines_are_skipped() {
        let (result, out) = run("\n   \n3\n");
        assert_eq!(result.unwrap().visited, vec![PageNumber(0), PageNumber(3)]);
        assert!(!out.contains("not a valid choice"));
    }

    #[test]
    fn exhausted_input_is_an_error() {
        let (result, _) = run("1\n");
        assert!(matches!(result, Err(StoryError::InputClosed)));
    }
}
