/// The story graph: page arena, variable declarations, and live memory.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::page::{Page, PageKind, PageNumber};
use crate::core::error::ChoiceError;

/// Current value of every declared variable.
pub type Memory = FxHashMap<String, i64>;

/// "When the traversal lands on `page`, set `variable` to `value`."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub page: PageNumber,
    pub variable: String,
    pub value: i64,
}

/// Result of following a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub page: PageNumber,
    pub terminal: bool,
}

/// A fully built story. Structure is fixed after construction; only
/// memory changes, once per page transition.
#[derive(Debug, Clone)]
pub struct Story {
    /// Indexed by page number; numbers are contiguous from 0.
    pages: Vec<Page>,
    variables: Vec<VariableDeclaration>,
    memory: Memory,
}

impl Story {
    /// Build a story from pages in page-number order. Every declared
    /// variable starts at 0.
    ///
    /// `pages[i].number` must equal `i`; the builder guarantees this after
    /// validation, so construction from outside the crate goes through it.
    pub(crate) fn new(pages: Vec<Page>, variables: Vec<VariableDeclaration>) -> Self {
        debug_assert!(pages.iter().enumerate().all(|(i, p)| p.number.0 == i));
        let mut story = Self {
            pages,
            variables,
            memory: Memory::default(),
        };
        story.reset_memory();
        story
    }

    pub fn page(&self, number: PageNumber) -> Option<&Page> {
        self.pages.get(number.0)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Numbers of all pages of `kind`, ascending.
    pub fn pages_of_kind(&self, kind: PageKind) -> Vec<PageNumber> {
        self.pages
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.number)
            .collect()
    }

    pub fn variables(&self) -> &[VariableDeclaration] {
        &self.variables
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Set every declared variable back to 0.
    pub fn reset_memory(&mut self) {
        self.memory.clear();
        for decl in &self.variables {
            self.memory.insert(decl.variable.clone(), 0);
        }
    }

    /// Apply the assignments attached to `page`, in declaration order.
    pub fn update_memory(&mut self, page: PageNumber) {
        for decl in self.variables.iter().filter(|d| d.page == page) {
            self.memory.insert(decl.variable.clone(), decl.value);
        }
    }

    /// Every page in order, each under a `Page <n>` header with its
    /// choices listed regardless of gates.
    pub fn render_all(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            out.push_str(&format!("Page {}\n==========\n", page.number));
            out.push_str(&page.render_plain());
        }
        out
    }

    /// One-line summary of page and variable counts.
    pub fn summary(&self) -> String {
        format!(
            "Story OK: {} pages, {} win, {} lose, {} variables",
            self.len(),
            self.pages_of_kind(PageKind::Win).len(),
            self.pages_of_kind(PageKind::Lose).len(),
            self.memory.len()
        )
    }

    /// Start a fresh traversal: zero memory, then land on the start page.
    pub fn begin(&mut self) -> PageNumber {
        self.reset_memory();
        self.update_memory(PageNumber::START);
        PageNumber::START
    }

    /// Follow the 1-based `choice` from page `from`.
    ///
    /// Nothing is mutated when the choice is rejected.
    pub fn advance(&mut self, from: PageNumber, choice: usize) -> Result<Transition, ChoiceError> {
        let page = self
            .page(from)
            .ok_or_else(|| ChoiceError::Invalid(choice.to_string()))?;
        let to = page
            .destination(choice)
            .ok_or_else(|| ChoiceError::Invalid(choice.to_string()))?;
        if page.invalid_choices(&self.memory).contains(&choice) {
            return Err(ChoiceError::Unavailable(choice));
        }

        self.update_memory(to);
        let terminal = self.page(to).map_or(true, Page::is_terminal);
        Ok(Transition { page: to, terminal })
    }
}
