/// Winnability analysis: enumerate paths from the start page to every win page.
///
/// The search walks the unconditional choice graph; gates are ignored.
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::schema::page::{PageKind, PageNumber};
use crate::schema::story::Story;

/// A page may appear at most this many times in one path before the
/// branch stops expanding.
pub const MAX_VISITS: usize = 2;

/// Win page number → paths that reach it, in discovery order.
pub type WinningPaths = BTreeMap<PageNumber, Vec<Vec<PageNumber>>>;

fn visits(path: &[PageNumber], page: PageNumber) -> usize {
    path.iter().filter(|p| **p == page).count()
}

/// All paths from `from` to `to`, found by iterative depth-first search
/// over an explicit stack of partial paths.
pub fn find_paths(story: &Story, from: PageNumber, to: PageNumber) -> Vec<Vec<PageNumber>> {
    let mut found = Vec::new();
    let mut todo: Vec<Vec<PageNumber>> = vec![vec![from]];

    while let Some(path) = todo.pop() {
        let Some(&current) = path.last() else {
            continue;
        };
        if current == to {
            found.push(path.clone());
        }

        let Some(page) = story.page(current) else {
            continue;
        };
        if page.destinations.is_empty() || visits(&path, current) >= MAX_VISITS {
            continue;
        }
        for &next in &page.destinations {
            let mut extended = path.clone();
            extended.push(next);
            todo.push(extended);
        }
    }

    found
}

/// Paths from page 0 to each win page, keyed by win page in ascending order.
pub fn all_winning_paths(story: &Story) -> WinningPaths {
    let paths: WinningPaths = story
        .pages_of_kind(PageKind::Win)
        .into_iter()
        .map(|win| {
            let found = find_paths(story, PageNumber::START, win);
            debug!(win = %win, paths = found.len(), "path search finished");
            (win, found)
        })
        .collect();

    if !is_winnable(&paths) {
        warn!("no path reaches a win page");
    }
    paths
}

/// True if at least one win page has at least one path.
pub fn is_winnable(paths: &WinningPaths) -> bool {
    paths.values().any(|found| !found.is_empty())
}

/// Render a path as `0(1),3(2),7(win)`: each page followed by the choice
/// taken there, the final page marked `win`.
pub fn format_path(story: &Story, path: &[PageNumber]) -> String {
    let Some((last, steps)) = path.split_last() else {
        return String::new();
    };

    let mut parts: Vec<String> = steps
        .iter()
        .zip(&path[1..])
        .map(|(page, next)| {
            let choice = story
                .page(*page)
                .and_then(|p| p.choice_to(*next))
                .map_or_else(|| "?".to_string(), |c| c.to_string());
            format!("{}({})", page, choice)
        })
        .collect();
    parts.push(format!("{}(win)", last));
    parts.join(",")
}

/// One line per path for every win page, or `unwinnable` if there are none.
pub fn format_report(story: &Story, paths: &WinningPaths, unwinnable: &str) -> String {
    if !is_winnable(paths) {
        return format!("{}\n", unwinnable);
    }
    let mut out = String::new();
    for path in paths.values().flatten() {
        out.push_str(&format_path(story, path));
        out.push('\n');
    }
    out
}
