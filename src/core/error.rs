/// Load-time and run-time error types.

use thiserror::Error;

use crate::schema::page::PageNumber;

/// Broad category of a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A declaration line does not match its grammar.
    Format,
    /// A declaration appears before its prerequisite or out of sequence.
    Order,
    /// A line or page number appears more than once.
    Duplicate,
    /// The page graph is structurally unsound.
    Graph,
    /// A backing file could not be read.
    Resource,
    /// The play configuration could not be loaded.
    Config,
}

/// Every way loading (or playing) a story can fail fatally.
///
/// All variants abort the load; there is no partial story.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
    #[error("Invalid Page Number: {0}")]
    InvalidPageNumber(String),
    #[error("Invalid Variable Value: {0}")]
    InvalidVariableValue(String),
    #[error("{0} must appear in order")]
    OutOfOrder(String),
    #[error("{0} cannot appear before its page declaration")]
    BeforePageDeclaration(String),
    #[error("{0} can only appear once")]
    Duplicate(String),
    #[error("Missing Page: {0}")]
    MissingPage(PageNumber),
    #[error("Win/Lose pages cannot have choices: {0}")]
    ChoiceOnTerminalPage(String),
    #[error("Invalid Page Reference: {0}")]
    InvalidReference(PageNumber),
    #[error("Missing Reference: page {0} does not have a reference")]
    MissingReference(PageNumber),
    #[error("There must be at least one Win and one Lose page")]
    MissingEndPages,
    #[error("Failed to open {resource}: {source}")]
    Resource {
        resource: String,
        #[source]
        source: std::io::Error,
    },
    #[error("input closed before the story ended")]
    InputClosed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

impl StoryError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_)
            | Self::InvalidPageNumber(_)
            | Self::InvalidVariableValue(_) => ErrorKind::Format,
            Self::OutOfOrder(_) | Self::BeforePageDeclaration(_) | Self::MissingPage(_) => {
                ErrorKind::Order
            }
            Self::Duplicate(_) => ErrorKind::Duplicate,
            Self::ChoiceOnTerminalPage(_)
            | Self::InvalidReference(_)
            | Self::MissingReference(_)
            | Self::MissingEndPages => ErrorKind::Graph,
            Self::Resource { .. } | Self::InputClosed | Self::Io(_) => ErrorKind::Resource,
            Self::Ron(_) => ErrorKind::Config,
        }
    }
}

/// A rejected selection during play. Recoverable: the caller re-prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceError {
    /// Not a number, zero, or past the last choice.
    #[error("choice {0:?} is out of range")]
    Invalid(String),
    /// In range but gated off by the current memory.
    #[error("choice {0} is not available")]
    Unavailable(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(StoryError::InvalidInput("x".into()).kind(), ErrorKind::Format);
        assert_eq!(StoryError::MissingPage(PageNumber(2)).kind(), ErrorKind::Order);
        assert_eq!(StoryError::Duplicate("1:2:x".into()).kind(), ErrorKind::Duplicate);
        assert_eq!(StoryError::MissingEndPages.kind(), ErrorKind::Graph);
    }

    #[test]
    fn messages_name_the_offender() {
        assert_eq!(StoryError::MissingPage(PageNumber(2)).to_string(), "Missing Page: 2");
        assert_eq!(
            StoryError::Duplicate("1:2:x.txt".into()).to_string(),
            "1:2:x.txt can only appear once"
        );
        assert_eq!(
            StoryError::MissingReference(PageNumber(4)).to_string(),
            "Missing Reference: page 4 does not have a reference"
        );
    }
}
