/// Story construction from validated declarations and page text resources.
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::error::StoryError;
use crate::core::validate::{validate, Partition};
use crate::schema::page::Page;
use crate::schema::story::Story;

/// Default name of the story description inside a story directory.
pub const STORY_FILE: &str = "story.txt";

/// Supplies the lines of a named text resource.
pub trait LineSource {
    /// Every line of `resource`, in order, without line terminators.
    fn load_lines(&self, resource: &str) -> Result<Vec<String>, StoryError>;
}

/// Resources are files inside a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LineSource for DirSource {
    fn load_lines(&self, resource: &str) -> Result<Vec<String>, StoryError> {
        let path = self.root.join(resource);
        let contents = std::fs::read_to_string(&path).map_err(|source| StoryError::Resource {
            resource: resource.to_string(),
            source,
        })?;
        Ok(contents.lines().map(str::to_string).collect())
    }
}

/// Resources held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: FxHashMap<String, Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a resource with the given text.
    pub fn with_file(mut self, name: &str, text: &str) -> Self {
        self.files
            .insert(name.to_string(), text.lines().map(str::to_string).collect());
        self
    }
}

impl LineSource for MemorySource {
    fn load_lines(&self, resource: &str) -> Result<Vec<String>, StoryError> {
        self.files
            .get(resource)
            .cloned()
            .ok_or_else(|| StoryError::Resource {
                resource: resource.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such resource"),
            })
    }
}

/// Trim surrounding whitespace and drop blank lines.
pub fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Builder for loading a `Story`. Created via `Story::builder()`.
pub struct StoryBuilder<'a, S: LineSource> {
    source: &'a S,
    story_file: String,
    /// Directly provided story lines (skips reading the story file).
    lines: Option<Vec<String>>,
}

impl Story {
    pub fn builder<S: LineSource>(source: &S) -> StoryBuilder<'_, S> {
        StoryBuilder {
            source,
            story_file: STORY_FILE.to_string(),
            lines: None,
        }
    }
}

impl<'a, S: LineSource> StoryBuilder<'a, S> {
    /// Name of the story description resource.
    pub fn story_file(mut self, name: &str) -> Self {
        self.story_file = name.to_string();
        self
    }

    /// Provide the story description lines directly.
    pub fn with_lines<L: Into<String>>(mut self, lines: impl IntoIterator<Item = L>) -> Self {
        self.lines = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Read, validate, and build. Any failure aborts with no partial story.
    pub fn build(self) -> Result<Story, StoryError> {
        let raw = match self.lines {
            Some(lines) => lines,
            None => self.source.load_lines(&self.story_file)?,
        };
        let partition = validate(&clean_lines(raw))?;
        build_story(&partition, self.source)
    }
}

/// Convenience: load `story.txt` from a story directory.
pub fn load_story(dir: impl Into<PathBuf>) -> Result<Story, StoryError> {
    Story::builder(&DirSource::new(dir)).build()
}

/// Turn a validated partition into the page graph, loading each page body.
pub fn build_story(partition: &Partition, source: &impl LineSource) -> Result<Story, StoryError> {
    let mut pages = Vec::with_capacity(partition.pages.len());

    for decl in &partition.pages {
        let body = source.load_lines(&decl.file)?;
        let mut page = Page::new(decl.number, decl.kind, decl.file.clone(), body);
        for choice in partition.choices_for(decl.number) {
            page.push_choice(choice.label.clone(), choice.destination, choice.gate.clone());
        }
        debug!(
            page = %page.number,
            kind = ?page.kind,
            choices = page.choices.len(),
            gates = page.gates.len(),
            "built page"
        );
        pages.push(page);
    }

    let story = Story::new(pages, partition.variables.clone());
    info!(
        pages = story.len(),
        variables = story.memory().len(),
        "story loaded"
    );
    Ok(story)
}
