/// Story pages and their choice-availability rules.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::story::Memory;

/// Label shown in place of a choice whose gate is closed.
pub const UNAVAILABLE: &str = "<UNAVAILABLE>";

/// Newtype wrapper for page numbers. Page 0 is always the start page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageNumber(pub usize);

impl PageNumber {
    pub const START: PageNumber = PageNumber(0);
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a page continues the story or ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    Normal,
    Win,
    Lose,
}

impl PageKind {
    /// Parse the single-letter kind marker used in page declarations.
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'N' => Some(Self::Normal),
            'W' => Some(Self::Win),
            'L' => Some(Self::Lose),
            _ => None,
        }
    }

    /// Trailer displayed after the page body.
    pub fn closing(&self) -> &'static str {
        match self {
            Self::Normal => "What would you like to do?",
            Self::Win => "Congratulations! You have won. Hooray!",
            Self::Lose => "Sorry, you have lost. Better luck next time!",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// A condition on a choice: `variable` must currently equal `value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gate {
    pub variable: String,
    pub value: i64,
}

impl Gate {
    pub fn new(variable: impl Into<String>, value: i64) -> Self {
        Self {
            variable: variable.into(),
            value,
        }
    }

    /// An unset variable never matches.
    pub fn is_open(&self, memory: &Memory) -> bool {
        memory.get(&self.variable) == Some(&self.value)
    }
}

/// One choice as it should be displayed under the current memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub label: String,
    pub available: bool,
}

impl ChoiceView {
    /// The label, or the unavailable marker if gated off.
    pub fn display_label(&self) -> &str {
        if self.available {
            &self.label
        } else {
            UNAVAILABLE
        }
    }
}

/// A node in the story graph.
///
/// `choices[i]` leads to `destinations[i]` and is selected as choice `i + 1`.
/// `gates` is keyed by that 1-based choice index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub number: PageNumber,
    pub kind: PageKind,
    pub file: String,
    pub body: Vec<String>,
    pub choices: Vec<String>,
    pub destinations: Vec<PageNumber>,
    pub gates: BTreeMap<usize, Gate>,
}

impl Page {
    pub fn new(number: PageNumber, kind: PageKind, file: impl Into<String>, body: Vec<String>) -> Self {
        Self {
            number,
            kind,
            file: file.into(),
            body,
            choices: Vec::new(),
            destinations: Vec::new(),
            gates: BTreeMap::new(),
        }
    }

    /// Append a choice; `gate` applies to the new choice's 1-based index.
    pub fn push_choice(&mut self, label: impl Into<String>, destination: PageNumber, gate: Option<Gate>) {
        self.choices.push(label.into());
        self.destinations.push(destination);
        if let Some(gate) = gate {
            self.gates.insert(self.choices.len(), gate);
        }
    }

    pub fn closing(&self) -> &'static str {
        self.kind.closing()
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    /// Destination of the 1-based choice `index`, if it exists.
    pub fn destination(&self, index: usize) -> Option<PageNumber> {
        index
            .checked_sub(1)
            .and_then(|i| self.destinations.get(i))
            .copied()
    }

    /// Every choice with its availability under `memory`, in order.
    pub fn availability(&self, memory: &Memory) -> Vec<ChoiceView> {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, label)| ChoiceView {
                label: label.clone(),
                available: self.gates.get(&(i + 1)).map_or(true, |gate| gate.is_open(memory)),
            })
            .collect()
    }

    /// 1-based indices of the choices currently gated off.
    pub fn invalid_choices(&self, memory: &Memory) -> FxHashSet<usize> {
        self.gates
            .iter()
            .filter(|(index, gate)| **index <= self.choices.len() && !gate.is_open(memory))
            .map(|(index, _)| *index)
            .collect()
    }

    /// 1-based index of the first choice leading to `destination`.
    pub fn choice_to(&self, destination: PageNumber) -> Option<usize> {
        self.destinations
            .iter()
            .position(|d| *d == destination)
            .map(|i| i + 1)
    }

    /// Display text with gated choices replaced by the unavailable marker.
    pub fn render(&self, memory: &Memory) -> String {
        let views = self.availability(memory);
        self.render_with(views.iter().map(ChoiceView::display_label))
    }

    /// Display text listing every choice label, ignoring gates.
    pub fn render_plain(&self) -> String {
        self.render_with(self.choices.iter().map(String::as_str))
    }

    fn render_with<'a>(&self, labels: impl Iterator<Item = &'a str>) -> String {
        let mut out = String::new();
        for line in &self.body {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(self.closing());
        out.push('\n');
        if self.kind == PageKind::Normal {
            out.push('\n');
            for (i, label) in labels.enumerate() {
                out.push_str(&format!(" {}. {}\n", i + 1, label));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_c() -> Page {
        let mut page = Page::new(
            PageNumber(3),
            PageKind::Normal,
            "roomC.txt",
            vec!["A dark room.".to_string()],
        );
        page.push_choice("go-north.txt", PageNumber(4), None);
        page.push_choice("go-south.txt", PageNumber(5), Some(Gate::new("torch", 1)));
        page
    }

    fn memory(pairs: &[(&str, i64)]) -> Memory {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn gated_choice_unavailable_until_match() {
        let page = room_c();
        let dark = memory(&[("torch", 0)]);
        let lit = memory(&[("torch", 1)]);

        assert_eq!(page.invalid_choices(&dark), [2].into_iter().collect());
        assert!(page.invalid_choices(&lit).is_empty());
    }

    #[test]
    fn unset_variable_never_matches() {
        let page = room_c();
        let views = page.availability(&Memory::default());
        assert!(views[0].available);
        assert!(!views[1].available);
    }

    #[test]
    fn availability_is_idempotent() {
        let page = room_c();
        let mem = memory(&[("torch", 0)]);
        assert_eq!(page.availability(&mem), page.availability(&mem));
    }

    #[test]
    fn render_substitutes_marker_without_touching_destinations() {
        let page = room_c();
        let text = page.render(&memory(&[("torch", 0)]));
        assert!(text.contains(" 1. go-north.txt\n"));
        assert!(text.contains(" 2. <UNAVAILABLE>\n"));
        assert_eq!(page.destinations, vec![PageNumber(4), PageNumber(5)]);
    }

    #[test]
    fn render_layout() {
        let page = room_c();
        assert_eq!(
            page.render_plain(),
            "A dark room.\n\nWhat would you like to do?\n\n 1. go-north.txt\n 2. go-south.txt\n"
        );
    }

    #[test]
    fn terminal_page_has_no_choice_list() {
        let page = Page::new(PageNumber(7), PageKind::Win, "end.txt", vec!["Done.".into()]);
        assert_eq!(
            page.render(&Memory::default()),
            "Done.\n\nCongratulations! You have won. Hooray!\n"
        );
    }

    #[test]
    fn choice_lookup_is_one_based() {
        let page = room_c();
        assert_eq!(page.destination(0), None);
        assert_eq!(page.destination(1), Some(PageNumber(4)));
        assert_eq!(page.destination(3), None);
        assert_eq!(page.choice_to(PageNumber(5)), Some(2));
        assert_eq!(page.choice_to(PageNumber(9)), None);
    }
}
