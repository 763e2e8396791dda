/// Story-file line grammar: classifying and parsing single declaration lines.
///
/// Four line forms are recognised:
/// - `<page>@<N|W|L>:<file>` => page declaration
/// - `<page>:<dest>:<label>` => choice
/// - `<page>:<dest>[<var>=<value>]:<label>` => conditional choice
/// - `<page>$<var>=<value>` => variable assignment on arrival
use crate::core::error::StoryError;
use crate::schema::page::{Gate, PageKind, PageNumber};
use crate::schema::story::VariableDeclaration;

/// `<page>@<kind>:<file>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDeclaration {
    pub number: PageNumber,
    pub kind: PageKind,
    pub file: String,
}

/// A plain or conditional choice line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceDeclaration {
    pub page: PageNumber,
    pub destination: PageNumber,
    pub gate: Option<Gate>,
    pub label: String,
}

/// One classified, well-formed story-file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Page(PageDeclaration),
    Choice(ChoiceDeclaration),
    Variable(VariableDeclaration),
}

impl Declaration {
    /// Classify and parse a trimmed, non-blank line.
    ///
    /// `@` marks a page, `$` a variable, `[` a conditional choice; anything
    /// else must be a plain choice.
    pub fn parse(line: &str) -> Result<Declaration, StoryError> {
        if line.contains('@') {
            parse_page(line).map(Declaration::Page)
        } else if line.contains('$') {
            parse_variable(line).map(Declaration::Variable)
        } else if line.contains('[') {
            parse_conditional_choice(line).map(Declaration::Choice)
        } else {
            parse_choice(line).map(Declaration::Choice)
        }
    }

    /// The page this line declares or belongs to.
    pub fn page(&self) -> PageNumber {
        match self {
            Self::Page(p) => p.number,
            Self::Choice(c) => c.page,
            Self::Variable(v) => v.page,
        }
    }
}

fn invalid(line: &str) -> StoryError {
    StoryError::InvalidInput(line.to_string())
}

/// An unsigned page number spanning the whole field.
pub fn parse_page_number(field: &str) -> Result<PageNumber, StoryError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoryError::InvalidPageNumber(field.to_string()));
    }
    field
        .parse()
        .map(PageNumber)
        .map_err(|_| StoryError::InvalidPageNumber(field.to_string()))
}

/// A signed variable value spanning the whole field.
pub fn parse_value(field: &str) -> Result<i64, StoryError> {
    field
        .parse()
        .map_err(|_| StoryError::InvalidVariableValue(field.to_string()))
}

fn count(line: &str, c: char) -> usize {
    line.matches(c).count()
}

fn parse_page(line: &str) -> Result<PageDeclaration, StoryError> {
    let (number, rest) = line.split_once('@').ok_or_else(|| invalid(line))?;
    let number = parse_page_number(number)?;
    if count(line, '@') != 1 || count(line, ':') != 1 {
        return Err(invalid(line));
    }

    let mut chars = rest.chars();
    let kind = chars
        .next()
        .and_then(PageKind::from_marker)
        .ok_or_else(|| invalid(line))?;
    let file = chars.as_str().strip_prefix(':').ok_or_else(|| invalid(line))?;
    if file.is_empty() {
        return Err(invalid(line));
    }

    Ok(PageDeclaration {
        number,
        kind,
        file: file.to_string(),
    })
}

fn parse_choice(line: &str) -> Result<ChoiceDeclaration, StoryError> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 3 {
        return Err(invalid(line));
    }
    Ok(ChoiceDeclaration {
        page: parse_page_number(fields[0])?,
        destination: parse_page_number(fields[1])?,
        gate: None,
        label: fields[2].to_string(),
    })
}

fn parse_conditional_choice(line: &str) -> Result<ChoiceDeclaration, StoryError> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 3 || count(line, '[') != 1 || count(line, ']') != 1 {
        return Err(invalid(line));
    }
    let page = parse_page_number(fields[0])?;

    // The bracket must close the destination field: `<dest>[<var>=<value>]`.
    let (destination, condition) = fields[1].split_once('[').ok_or_else(|| invalid(line))?;
    let condition = condition.strip_suffix(']').ok_or_else(|| invalid(line))?;
    let destination = parse_page_number(destination)?;

    let (variable, value) = condition.split_once('=').ok_or_else(|| invalid(line))?;
    if variable.is_empty() {
        return Err(invalid(line));
    }
    let value = parse_value(value)?;

    Ok(ChoiceDeclaration {
        page,
        destination,
        gate: Some(Gate::new(variable, value)),
        label: fields[2].to_string(),
    })
}

fn parse_variable(line: &str) -> Result<VariableDeclaration, StoryError> {
    let (page, rest) = line.split_once('$').ok_or_else(|| invalid(line))?;
    let page = parse_page_number(page)?;
    if count(line, '$') != 1 || count(line, '=') != 1 {
        return Err(invalid(line));
    }

    let (variable, value) = rest.split_once('=').ok_or_else(|| invalid(line))?;
    if variable.is_empty() {
        return Err(invalid(line));
    }

    Ok(VariableDeclaration {
        page,
        variable: variable.to_string(),
        value: parse_value(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_declaration() {
        let d = Declaration::parse("3@N:roomC.txt").unwrap();
        assert_eq!(
            d,
            Declaration::Page(PageDeclaration {
                number: PageNumber(3),
                kind: PageKind::Normal,
                file: "roomC.txt".to_string(),
            })
        );
        assert!(matches!(
            Declaration::parse("12@W:win.txt").unwrap(),
            Declaration::Page(PageDeclaration { kind: PageKind::Win, .. })
        ));
    }

    #[test]
    fn page_declaration_rejects_bad_kind_and_shape() {
        assert!(matches!(Declaration::parse("1@X:a.txt"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("1@N a.txt"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("1@N:"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("1@N:a:b.txt"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("x@N:a.txt"), Err(StoryError::InvalidPageNumber(_))));
        assert!(matches!(Declaration::parse("@N:a.txt"), Err(StoryError::InvalidPageNumber(_))));
    }

    #[test]
    fn plain_choice() {
        let d = Declaration::parse("3:4:go-north.txt").unwrap();
        assert_eq!(
            d,
            Declaration::Choice(ChoiceDeclaration {
                page: PageNumber(3),
                destination: PageNumber(4),
                gate: None,
                label: "go-north.txt".to_string(),
            })
        );
    }

    #[test]
    fn choice_label_may_contain_spaces() {
        let d = Declaration::parse("0:1:Open the door, carefully").unwrap();
        assert!(matches!(d, Declaration::Choice(c) if c.label == "Open the door, carefully"));
    }

    #[test]
    fn choice_requires_two_colons_and_numbers() {
        assert!(matches!(Declaration::parse("3:4"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("3:4:a:b"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("3:x:a"), Err(StoryError::InvalidPageNumber(_))));
        assert!(matches!(Declaration::parse("-3:4:a"), Err(StoryError::InvalidPageNumber(_))));
        assert!(matches!(Declaration::parse("no colons"), Err(StoryError::InvalidInput(_))));
    }

    #[test]
    fn conditional_choice() {
        let d = Declaration::parse("3:5[torch=1]:go-south.txt").unwrap();
        assert_eq!(
            d,
            Declaration::Choice(ChoiceDeclaration {
                page: PageNumber(3),
                destination: PageNumber(5),
                gate: Some(Gate::new("torch", 1)),
                label: "go-south.txt".to_string(),
            })
        );
        let d = Declaration::parse("0:1[mood=-2]:sulk").unwrap();
        assert!(matches!(d, Declaration::Choice(c) if c.gate == Some(Gate::new("mood", -2))));
    }

    #[test]
    fn conditional_choice_rejects_malformed_brackets() {
        assert!(matches!(Declaration::parse("3:5]torch=1[:a"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("3:5[[torch=1]:a"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("3:5[torch]:a"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("3:5[=1]:a"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("3:5:a[torch=1]"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(
            Declaration::parse("3:5[torch=lit]:a"),
            Err(StoryError::InvalidVariableValue(_))
        ));
    }

    #[test]
    fn variable_declaration() {
        let d = Declaration::parse("2$torch=1").unwrap();
        assert_eq!(
            d,
            Declaration::Variable(VariableDeclaration {
                page: PageNumber(2),
                variable: "torch".to_string(),
                value: 1,
            })
        );
        assert_eq!(d.page(), PageNumber(2));
        assert!(matches!(
            Declaration::parse("0$debt=-40").unwrap(),
            Declaration::Variable(v) if v.value == -40
        ));
    }

    #[test]
    fn variable_declaration_rejects_malformed() {
        assert!(matches!(Declaration::parse("2$torch"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("2$$torch=1"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("2$torch=1=2"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("2$=1"), Err(StoryError::InvalidInput(_))));
        assert!(matches!(Declaration::parse("2$torch=one"), Err(StoryError::InvalidVariableValue(_))));
        assert!(matches!(Declaration::parse("a$torch=1"), Err(StoryError::InvalidPageNumber(_))));
    }

    #[test]
    fn page_number_overflow_is_rejected() {
        assert!(matches!(
            parse_page_number("999999999999999999999999"),
            Err(StoryError::InvalidPageNumber(_))
        ));
    }
}
