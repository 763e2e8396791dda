/// Whole-file validation: ordering, duplicates, and graph integrity.
///
/// Validation is all-or-nothing. The first violation aborts the load.
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use tracing::debug;

use crate::core::declaration::{ChoiceDeclaration, Declaration, PageDeclaration};
use crate::core::error::StoryError;
use crate::schema::page::{PageKind, PageNumber};
use crate::schema::story::VariableDeclaration;

/// Validated story-file lines split by form, each in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub pages: Vec<PageDeclaration>,
    pub choices: Vec<ChoiceDeclaration>,
    pub variables: Vec<VariableDeclaration>,
}

impl Partition {
    /// Choices belonging to `page`, in file order.
    pub fn choices_for(&self, page: PageNumber) -> impl Iterator<Item = &ChoiceDeclaration> {
        self.choices.iter().filter(move |c| c.page == page)
    }

    fn kind_of(&self, page: PageNumber) -> Option<PageKind> {
        self.pages.iter().find(|p| p.number == page).map(|p| p.kind)
    }
}

/// Raw lines of each form, kept for duplicate and terminal-page checks.
#[derive(Default)]
struct RawLines<'a> {
    pages: Vec<&'a str>,
    choices: Vec<(&'a str, PageNumber)>,
    variables: Vec<(&'a str, PageNumber)>,
}

/// Validate trimmed, non-blank story-file lines and partition them.
pub fn validate<S: AsRef<str>>(lines: &[S]) -> Result<Partition, StoryError> {
    let mut partition = Partition::default();
    let mut raw = RawLines::default();
    let mut declared: BTreeSet<PageNumber> = BTreeSet::new();

    for line in lines {
        let line: &str = line.as_ref();
        let declaration = Declaration::parse(line)?;
        check_order(line, &declaration, &declared)?;

        match declaration {
            Declaration::Page(page) => {
                declared.insert(page.number);
                raw.pages.push(line);
                partition.pages.push(page);
            }
            Declaration::Choice(choice) => {
                raw.choices.push((line, choice.page));
                partition.choices.push(choice);
            }
            Declaration::Variable(var) => {
                raw.variables.push((line, var.page));
                partition.variables.push(var);
            }
        }
    }

    check_duplicates(raw.pages.iter().copied())?;
    check_duplicates(raw.variables.iter().map(|(l, _)| *l))?;
    check_duplicates(raw.choices.iter().map(|(l, _)| *l))?;
    check_terminal_pages(&partition, &raw)?;
    check_page_sequence(&partition, &raw)?;
    check_references(&partition)?;
    check_end_pages(&partition)?;

    debug!(
        pages = partition.pages.len(),
        choices = partition.choices.len(),
        variables = partition.variables.len(),
        "story file validated"
    );
    Ok(partition)
}

/// Pages must not appear after a higher-numbered page; everything else
/// must follow its own page's declaration.
fn check_order(
    line: &str,
    declaration: &Declaration,
    declared: &BTreeSet<PageNumber>,
) -> Result<(), StoryError> {
    let number = declaration.page();
    match declaration {
        Declaration::Page(_) => {
            if !declared.contains(&number) && declared.range(number..).next().is_some() {
                return Err(StoryError::OutOfOrder(line.to_string()));
            }
        }
        _ => {
            if !declared.contains(&number) {
                return Err(StoryError::BeforePageDeclaration(line.to_string()));
            }
        }
    }
    Ok(())
}

fn check_duplicates<'a>(lines: impl Iterator<Item = &'a str>) -> Result<(), StoryError> {
    let mut seen = FxHashSet::default();
    for line in lines {
        if !seen.insert(line) {
            return Err(StoryError::Duplicate(line.to_string()));
        }
    }
    Ok(())
}

fn check_terminal_pages(partition: &Partition, raw: &RawLines<'_>) -> Result<(), StoryError> {
    for (line, page) in raw.choices.iter().chain(&raw.variables) {
        if partition.kind_of(*page) != Some(PageKind::Normal) {
            return Err(StoryError::ChoiceOnTerminalPage(line.to_string()));
        }
    }
    Ok(())
}

/// Page declarations must run 0, 1, 2, ... with no gaps.
fn check_page_sequence(partition: &Partition, raw: &RawLines<'_>) -> Result<(), StoryError> {
    let mut expected = PageNumber::START;
    for (page, line) in partition.pages.iter().zip(&raw.pages) {
        if page.number < expected {
            return Err(StoryError::OutOfOrder(line.to_string()));
        }
        if page.number > expected {
            return Err(StoryError::MissingPage(expected));
        }
        expected = PageNumber(expected.0 + 1);
    }
    if partition.pages.is_empty() {
        return Err(StoryError::MissingPage(PageNumber::START));
    }
    Ok(())
}

/// Every destination must exist and every page but the start must be
/// some choice's destination.
fn check_references(partition: &Partition) -> Result<(), StoryError> {
    let page_count = partition.pages.len();
    let destinations: BTreeSet<PageNumber> =
        partition.choices.iter().map(|c| c.destination).collect();

    if let Some(dangling) = destinations
        .iter()
        .find(|d| d.0 >= page_count && **d != PageNumber::START)
    {
        return Err(StoryError::InvalidReference(*dangling));
    }

    if let Some(orphan) = partition
        .pages
        .iter()
        .map(|p| p.number)
        .find(|n| *n != PageNumber::START && !destinations.contains(n))
    {
        return Err(StoryError::MissingReference(orphan));
    }
    Ok(())
}

fn check_end_pages(partition: &Partition) -> Result<(), StoryError> {
    let has = |kind: PageKind| partition.pages.iter().any(|p| p.kind == kind);
    if !has(PageKind::Win) || !has(PageKind::Lose) {
        return Err(StoryError::MissingEndPages);
    }
    Ok(())
}
